//! Upstream fetch error types.

/// Errors from the outbound fare request.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed (connection, TLS, redirect loop, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request did not complete within the configured timeout
    #[error("upstream timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Upstream returned a non-success status
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },
}

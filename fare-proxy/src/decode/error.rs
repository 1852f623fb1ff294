//! Decode error types.

/// A candidate decoder could not produce text at all.
///
/// Malformed input is not an error here: invalid sequences are dropped.
/// This only covers decoders that cannot make progress.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{encoding} decoder failed: {message}")]
pub struct DecodeError {
    pub encoding: String,
    pub message: String,
}

impl DecodeError {
    pub fn new(encoding: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            encoding: encoding.into(),
            message: message.into(),
        }
    }
}

/// Why a single candidate attempt was rejected.
#[derive(Debug, thiserror::Error)]
pub enum AttemptFailure {
    /// The bytes could not be decoded with this encoding
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The decoded text is not valid JSON
    #[error("{encoding}: {source}")]
    Parse {
        encoding: String,
        source: serde_json::Error,
    },
}

impl AttemptFailure {
    /// Short machine-readable kind, surfaced to API callers.
    pub fn kind(&self) -> &'static str {
        match self {
            AttemptFailure::Decode(_) => "decode",
            AttemptFailure::Parse { .. } => "parse",
        }
    }

    /// Encoding the failed attempt used.
    pub fn encoding(&self) -> &str {
        match self {
            AttemptFailure::Decode(e) => &e.encoding,
            AttemptFailure::Parse { encoding, .. } => encoding,
        }
    }
}

/// Every candidate encoding was tried and none produced valid JSON.
#[derive(Debug, thiserror::Error)]
#[error("no candidate encoding produced valid JSON (tried {}): {last}", .attempted.join(", "))]
pub struct DecodeExhausted {
    /// Encodings attempted, in the order they were tried
    pub attempted: Vec<String>,

    /// Failure from the final attempt
    pub last: AttemptFailure,
}

//! Canned upstream for tests and offline development.

use std::sync::Mutex;

use axum::body::Bytes;
use futures::future::BoxFuture;

use super::client::FareFetcher;
use super::error::FetchError;

/// What the mock answers with.
#[derive(Debug, Clone)]
enum Canned {
    Body(Bytes),
    Status { status: u16, body: String },
}

/// Fetcher that serves a fixed response and records requested URLs.
#[derive(Debug)]
pub struct StaticFetcher {
    canned: Canned,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    /// Answer every request with `body`.
    pub fn with_body(body: impl Into<Bytes>) -> Self {
        Self::new(Canned::Body(body.into()))
    }

    /// Fail every request as if the upstream returned `status`.
    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self::new(Canned::Status {
            status,
            body: body.into(),
        })
    }

    fn new(canned: Canned) -> Self {
        Self {
            canned,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// URLs requested so far, oldest first.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
}

impl FareFetcher for StaticFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Bytes, FetchError>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }

        let result = match &self.canned {
            Canned::Body(body) => Ok(body.clone()),
            Canned::Status { status, body } => Err(FetchError::Status {
                status: *status,
                body: body.clone(),
            }),
        };

        Box::pin(async move { result })
    }
}

//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

/// Query parameters of `GET /fare`.
#[derive(Debug, Deserialize)]
pub struct FareRequest {
    /// Origin station name
    pub station: Option<String>,

    /// Destination station name
    pub to: Option<String>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable summary
    pub error: String,

    /// Failure detail for diagnosis
    pub details: String,

    /// Encodings tried, when no candidate produced valid JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempted_encodings: Option<Vec<String>>,

    /// Kind of the final failed attempt (`decode` or `parse`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
            attempted_encodings: None,
            error_type: None,
        }
    }
}

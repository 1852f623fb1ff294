//! HTTP route handlers.

use std::any::Any;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::Value;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::decode::{DecodeExhausted, decode_and_parse};
use crate::upstream::{FareQuery, FetchError, MissingStations};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    with_layers(
        Router::new()
            .route("/fare", get(get_fare))
            .route("/health", get(health)),
    )
    .with_state(state)
}

/// Request tracing and panic-to-500 conversion around `router`.
fn with_layers(router: Router<AppState>) -> Router<AppState> {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Look up the fare between two stations.
///
/// Makes exactly one upstream request, then decodes the response through
/// the candidate encodings and returns it as UTF-8 JSON.
async fn get_fare(
    State(state): State<AppState>,
    query: Result<Query<FareRequest>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(req) = query.map_err(|e| AppError::InvalidQuery {
        details: e.body_text(),
    })?;

    let fare_query = FareQuery::new(req.station, req.to)?;
    let url = fare_query.upstream_url(&state.config);
    info!(
        station = %fare_query.start_station,
        to = %fare_query.end_station,
        url = %url,
        "fetching fare"
    );

    let bytes = state.fetcher.fetch(&url).await?;
    let body = decode_and_parse(&bytes, &state.candidates)?;

    Ok(Json(body.value))
}

/// Turn a handler panic into a JSON 500.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::Internal { details }.into_response()
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Caller omitted a station; no upstream call was made
    BadRequest { details: String },
    /// Query string could not be read (e.g. a repeated parameter)
    InvalidQuery { details: String },
    /// Upstream fetch did not complete successfully
    UpstreamUnavailable { details: String },
    /// Upstream answered but no candidate encoding yielded JSON
    DecodeExhausted(DecodeExhausted),
    /// Anything else
    Internal { details: String },
}

impl From<MissingStations> for AppError {
    fn from(e: MissingStations) -> Self {
        AppError::BadRequest {
            details: e.to_string(),
        }
    }
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        AppError::UpstreamUnavailable {
            details: e.to_string(),
        }
    }
}

impl From<DecodeExhausted> for AppError {
    fn from(e: DecodeExhausted) -> Self {
        AppError::DecodeExhausted(e)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } | AppError::InvalidQuery { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DecodeExhausted(_) | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            AppError::BadRequest { details } => {
                ErrorResponse::new("乗車駅(station)と降車駅(to)を指定してください", details)
            }
            AppError::InvalidQuery { details } => {
                ErrorResponse::new("クエリパラメータが不正です", details)
            }
            AppError::UpstreamUnavailable { details } => {
                ErrorResponse::new("運賃検索サービスに接続できませんでした", details)
            }
            AppError::DecodeExhausted(e) => ErrorResponse {
                attempted_encodings: Some(e.attempted.clone()),
                error_type: Some(e.last.kind().to_string()),
                ..ErrorResponse::new("運賃検索の応答を解析できませんでした", e.last.to_string())
            },
            AppError::Internal { details } => {
                ErrorResponse::new("処理中にエラーが発生しました", details)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.body();

        if status.is_server_error() {
            error!(%status, error = %body.error, details = %body.details, "request failed");
        } else {
            warn!(%status, error = %body.error, details = %body.details, "request rejected");
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;

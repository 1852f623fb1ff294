//! Web layer for the fare proxy.
//!
//! Exposes `GET /fare` plus a health check.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router, panic_response};
pub use state::AppState;

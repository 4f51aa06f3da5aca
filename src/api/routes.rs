//! API route configuration.

use crate::api::handlers::shorten_handler;
use crate::state::AppState;
use axum::{Router, routing::post};

/// Versioned API routes, nested under `/api`.
///
/// # Endpoints
///
/// - `POST /v1` - Shorten a URL (rate limited per client address)
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/v1", post(shorten_handler))
}

//! Handler for link shortening endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::debug;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_addr::ClientAddr;

/// Creates a short link for one URL.
///
/// # Endpoint
///
/// `POST /api/v1`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/a/b",
///   "short": "mylink",  // optional
///   "expiry": 48        // optional, hours
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "url": "https://example.com/a/b",
///   "short": "localhost:3000/mylink",
///   "expiry": 48,
///   "rate_limit": 9,
///   "rate_limit_reset": 30
/// }
/// ```
///
/// # Errors
///
/// - 400 for unparsable bodies, invalid URLs, invalid identifiers or
///   self-referencing targets
/// - 403 if the custom identifier is taken
/// - 429 with `rate_limit_reset` (minutes) when the client's quota is spent
/// - 500 if the link cannot be stored
pub async fn shorten_handler(
    State(state): State<AppState>,
    client: ClientAddr,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<ShortenResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!(client = client.as_str(), reason = %rejection.body_text(), "Rejected request body");
        AppError::MalformedBody
    })?;

    let outcome = state
        .shorten_service
        .shorten(client.as_str(), request.into())
        .await?;

    Ok(Json(outcome.into()))
}

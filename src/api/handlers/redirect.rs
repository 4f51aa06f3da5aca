//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short identifier to its target URL.
///
/// # Endpoint
///
/// `GET /{id}`
///
/// Responds with `301 Moved Permanently` and a `Location` header. Every
/// successful redirect increments the global redirect counter.
///
/// # Errors
///
/// Returns 404 Not Found if the identifier is unknown or expired.
/// Returns 500 if the store cannot be read.
pub async fn redirect_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let target = state.resolve_service.resolve(&id).await?;

    // axum's Redirect::permanent answers 308; clients expect 301 here.
    Ok((StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, target)]).into_response())
}

//! HTTP request/response tracing middleware.

use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Span-per-request tracing for every route.
///
/// The span carries method, URI and version; the response event adds
/// status and latency in milliseconds. 5xx responses are classified as
/// failures and logged at `ERROR` by the default failure handler.
///
/// # Example Logs
///
/// ```text
/// INFO request{method=POST uri=/api/v1 version=HTTP/1.1}: finished processing request latency=3 ms status=200
/// INFO request{method=GET uri=/Ab3dE9 version=HTTP/1.1}: finished processing request latency=1 ms status=301
/// ```
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
}

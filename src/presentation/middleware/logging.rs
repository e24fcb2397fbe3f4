//! Request Tracing and Metrics Middleware

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

use crate::infrastructure::metrics;

/// Label for requests that did not match a route
const UNMATCHED_PATH: &str = "unmatched";

/// HTTP trace layer: one span per request, response logged with latency.
pub fn create_trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
}

/// Records request count and latency labelled by route template.
///
/// Labels use the matched route (`/api/v1/rooms/{room_id}/heartbeat`) so
/// room and user ids never become label values.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_PATH.to_owned());
    let method = request.method().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status();
    metrics::record_http_request(method.as_str(), &path, status.as_u16(), elapsed.as_secs_f64());

    tracing::debug!(
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = %elapsed.as_millis(),
        "HTTP request"
    );

    response
}

//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    extract::DefaultBodyLimit,
    http::header,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{create_cors_layer, create_trace_layer, track_metrics};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Room for multipart boundaries and headers on top of the image itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the main API router with its middleware stack
pub fn create_router(state: AppState) -> Router {
    let avatar_body_limit = state.settings.avatars.max_bytes + MULTIPART_OVERHEAD_BYTES;
    let cors = create_cors_layer(&state.settings.cors);

    Router::new()
        .nest("/api/v1", api_routes(avatar_body_limit))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Live room page for manual inspection
        .route("/debug/{room_id}", get(handlers::debug::room_page))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(track_metrics))
        // Outermost first: trace, then CORS, then compression
        .layer(
            ServiceBuilder::new()
                .layer(create_trace_layer())
                .layer(cors)
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> Result<impl IntoResponse, AppError> {
    let body = metrics::gather_metrics()?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    ))
}

/// API v1 routes
fn api_routes(avatar_body_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/auth", auth_routes())
        .nest("/users", user_routes(avatar_body_limit))
        .nest("/rooms", room_routes())
}

/// Identity provider sign-in
fn auth_routes() -> Router<AppState> {
    Router::new().route("/google", post(handlers::auth::google_sign_in))
}

/// Device registration, accounts and avatars
fn user_routes(avatar_body_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::user::register))
        .route(
            "/{user_id}",
            get(handlers::user::get_user).delete(handlers::user::delete_user),
        )
        .route(
            "/{user_id}/avatar",
            post(handlers::user::upload_avatar)
                .get(handlers::user::get_avatar)
                .layer(DefaultBodyLimit::max(avatar_body_limit)),
        )
}

/// Rooms, membership, heartbeats and statistics
fn room_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(handlers::room::create_room))
        .route("/{room_id}", get(handlers::room::get_room))
        .route("/{room_id}/join", post(handlers::room::join_room))
        .route("/{room_id}/leave", post(handlers::room::leave_room))
        .route("/{room_id}/heartbeat", post(handlers::presence::heartbeat))
        .route("/{room_id}/stats", get(handlers::stats::room_stats))
}

//! Heartbeat Handler

use axum::{
    extract::{Path, State},
    Json,
};

use crate::application::dto::request::HeartbeatRequest;
use crate::application::dto::response::HeartbeatResponse;
use crate::application::services::{
    HeartbeatCommand, PresenceError, PresenceService, PresenceServiceImpl,
};
use crate::infrastructure::metrics;
use crate::presentation::http::extractors::ValidatedJson;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Record a member's heartbeat and return the room's presence view
pub async fn heartbeat(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    ValidatedJson(body): ValidatedJson<HeartbeatRequest>,
) -> Result<Json<HeartbeatResponse>, AppError> {
    let presence_service =
        PresenceServiceImpl::new(state.repositories.members.clone(), state.clock.clone());

    let command = HeartbeatCommand {
        room_id,
        user_id: body.user_id,
        active_app: body.active_app,
        focus_mode: body.focus_mode.unwrap_or(false),
    };

    match presence_service.heartbeat(command).await {
        Ok(outcome) => {
            metrics::record_heartbeat(metrics::HEARTBEAT_ACCEPTED, outcome.logged);
            Ok(Json(outcome.into()))
        }
        Err(e) => {
            let label = match &e {
                PresenceError::NotMember => metrics::HEARTBEAT_NOT_MEMBER,
                PresenceError::AppNameTooLong => metrics::HEARTBEAT_INVALID,
                PresenceError::Store(_) => metrics::HEARTBEAT_ERROR,
            };
            metrics::record_heartbeat(label, false);
            Err(e.into())
        }
    }
}

//! Room Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{CreateRoomRequest, JoinRoomRequest, LeaveRoomRequest};
use crate::application::dto::response::{MessageResponse, RoomCreatedResponse, RoomResponse};
use crate::application::services::{RoomService, RoomServiceImpl};
use crate::domain::{MemberRepository, RoomRepository, UserRepository};
use crate::presentation::http::extractors::ValidatedJson;
use crate::shared::error::AppError;
use crate::startup::AppState;

pub(super) fn room_service(
    state: &AppState,
) -> RoomServiceImpl<dyn RoomRepository, dyn UserRepository, dyn MemberRepository> {
    RoomServiceImpl::new(
        state.repositories.rooms.clone(),
        state.repositories.users.clone(),
        state.repositories.members.clone(),
        state.clock.clone(),
    )
}

/// Create a room owned by the requesting user
pub async fn create_room(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomCreatedResponse>), AppError> {
    let room = room_service(&state)
        .create_room(&body.user_id, body.password.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RoomCreatedResponse {
            has_password: room.is_protected(),
            room_id: room.id,
        }),
    ))
}

/// Join a room, checking its password when set
pub async fn join_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    ValidatedJson(body): ValidatedJson<JoinRoomRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let outcome = room_service(&state)
        .join_room(&room_id, &body.user_id, body.password.as_deref())
        .await?;

    Ok(Json(MessageResponse {
        message: outcome.message(),
    }))
}

/// Leave a room
pub async fn leave_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    ValidatedJson(body): ValidatedJson<LeaveRoomRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    room_service(&state)
        .leave_room(&room_id, &body.user_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "Left room successfully",
    }))
}

/// Room metadata and the presence view of its members
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomResponse>, AppError> {
    let details = room_service(&state).get_room(&room_id).await?;
    Ok(Json(details.into()))
}

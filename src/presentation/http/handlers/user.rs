//! User Handlers

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::application::dto::request::RegisterUserRequest;
use crate::application::dto::response::{AvatarResponse, UserResponse};
use crate::application::services::{UserService, UserServiceImpl};
use crate::domain::UserRepository;
use crate::presentation::http::extractors::ValidatedJson;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Multipart field carrying the image
const AVATAR_FIELD: &str = "avatar";

fn user_service(
    state: &AppState,
) -> UserServiceImpl<dyn UserRepository> {
    UserServiceImpl::new(
        state.repositories.users.clone(),
        state.avatars.clone(),
        state.clock.clone(),
        state.settings.avatars.max_bytes,
    )
}

/// Register a device, returning the existing user when already known
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let (user, is_new) = user_service(&state).register(&body.device_id).await?;

    let status = if is_new {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(UserResponse::registered(user, is_new))))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service(&state).get_user(&user_id).await?;
    Ok(Json(UserResponse::from_user(user)))
}

/// Delete an account
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    user_service(&state).delete_user(&user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// Upload an avatar image from the `avatar` multipart field
pub async fn upload_avatar(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<AvatarResponse>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if file_name.is_empty() {
            return Err(AppError::Validation("No file selected".into()));
        }

        let data = field.bytes().await.map_err(multipart_error)?;
        let user = user_service(&state)
            .upload_avatar(&user_id, &file_name, data.to_vec())
            .await?;

        return Ok(Json(AvatarResponse {
            avatar_path: user.avatar_path,
        }));
    }

    Err(AppError::Validation("No avatar file provided".into()))
}

/// Serve a stored avatar image
pub async fn get_avatar(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let avatar = user_service(&state).get_avatar(&user_id).await?;
    Ok(([(header::CONTENT_TYPE, avatar.content_type)], avatar.data))
}

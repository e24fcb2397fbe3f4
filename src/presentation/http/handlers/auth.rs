//! Authentication Handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::application::dto::request::GoogleAuthRequest;
use crate::application::dto::response::UserResponse;
use crate::application::services::{AuthService, AuthServiceImpl};
use crate::presentation::http::extractors::ValidatedJson;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Sign in with a Google ID token or authorization code
pub async fn google_sign_in(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<GoogleAuthRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let credential = body
        .credential()
        .ok_or_else(|| AppError::Validation("idToken or code required".into()))?;

    let auth_service = AuthServiceImpl::new(
        state.repositories.users.clone(),
        state.identity.clone(),
        state.clock.clone(),
        state.settings.identity.default_redirect_uri.clone(),
    );
    let (user, is_new) = auth_service.sign_in_with_google(credential).await?;

    tracing::info!(user_id = %user.id, is_new, "Google sign-in");

    let status = if is_new {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(UserResponse::registered(user, is_new))))
}

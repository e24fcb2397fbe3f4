//! Request DTOs
//!
//! Data structures for API request bodies and query strings.

use serde::Deserialize;
use validator::Validate;

use crate::application::services::GoogleCredential;

/// Device registration request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, max = 255, message = "deviceId must be 1-255 characters"))]
    pub device_id: String,
}

/// Google sign-in request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthRequest {
    #[validate(length(min = 1, message = "idToken must not be empty"))]
    pub id_token: Option<String>,

    #[validate(length(min = 1, message = "code must not be empty"))]
    pub code: Option<String>,

    pub redirect_uri: Option<String>,
}

impl GoogleAuthRequest {
    /// The credential to verify; an ID token wins over a code.
    pub fn credential(self) -> Option<GoogleCredential> {
        match (self.id_token, self.code) {
            (Some(token), _) => Some(GoogleCredential::IdToken(token)),
            (None, Some(code)) => Some(GoogleCredential::Code {
                code,
                redirect_uri: self.redirect_uri,
            }),
            (None, None) => None,
        }
    }
}

/// Create room request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,

    #[validate(length(max = 128, message = "Password must be at most 128 characters"))]
    pub password: Option<String>,
}

/// Join room request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,

    #[validate(length(max = 128, message = "Password must be at most 128 characters"))]
    pub password: Option<String>,
}

/// Leave room request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRoomRequest {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
}

/// Heartbeat request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatRequest {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,

    /// Trimmed and length-checked by the presence service
    pub active_app: Option<String>,

    /// Missing and `null` both mean not focused
    #[serde(default)]
    pub focus_mode: Option<bool>,
}

/// Stats query string
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    #[validate(length(min = 1, message = "userId must not be empty"))]
    pub user_id: Option<String>,

    /// `today` (default), `week` or `all`
    pub period: Option<String>,
}

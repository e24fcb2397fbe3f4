//! Response DTOs
//!
//! Data structures for API response bodies. Field names are camelCase.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::services::{HeartbeatOutcome, MemberStats, RoomDetails, RoomStats};
use crate::domain::services::{AppTotal, MemberPresence};
use crate::domain::User;

/// User response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub device_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar_path: Option<String>,
    pub created_at: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_new: Option<bool>,
}

impl UserResponse {
    pub fn from_user(user: User) -> Self {
        Self {
            id: user.id,
            device_id: user.device_id,
            email: user.email,
            name: user.name,
            avatar_path: user.avatar_path,
            created_at: user.created_at.to_rfc3339(),
            is_new: None,
        }
    }

    /// Response of a find-or-create operation.
    pub fn registered(user: User, is_new: bool) -> Self {
        Self {
            is_new: Some(is_new),
            ..Self::from_user(user)
        }
    }
}

/// Avatar upload response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarResponse {
    pub avatar_path: Option<String>,
}

/// Plain acknowledgement
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Room creation response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCreatedResponse {
    pub room_id: String,
    pub has_password: bool,
}

/// A member as shown in heartbeat responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPresenceResponse {
    pub user_id: String,
    pub avatar_path: Option<String>,
    pub name: Option<String>,
    pub active_app: Option<String>,
    pub is_online: bool,
    pub focus_mode: bool,
}

impl From<MemberPresence> for MemberPresenceResponse {
    fn from(presence: MemberPresence) -> Self {
        Self {
            user_id: presence.user_id,
            avatar_path: presence.avatar_path,
            name: presence.name,
            active_app: presence.active_app,
            is_online: presence.is_online,
            focus_mode: presence.focus_mode,
        }
    }
}

/// Heartbeat response
#[derive(Debug, Serialize)]
pub struct HeartbeatResponse {
    pub members: Vec<MemberPresenceResponse>,
}

impl From<HeartbeatOutcome> for HeartbeatResponse {
    fn from(outcome: HeartbeatOutcome) -> Self {
        Self {
            members: outcome.members.into_iter().map(Into::into).collect(),
        }
    }
}

/// A member as shown in room details, with the raw heartbeat time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMemberResponse {
    #[serde(flatten)]
    pub presence: MemberPresenceResponse,
    pub last_seen: Option<DateTime<Utc>>,
}

/// Room details response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub room_id: String,
    pub created_by: String,
    pub created_at: String,
    pub has_password: bool,
    pub members: Vec<RoomMemberResponse>,
}

impl From<RoomDetails> for RoomResponse {
    fn from(details: RoomDetails) -> Self {
        Self {
            has_password: details.room.is_protected(),
            room_id: details.room.id,
            created_by: details.room.created_by,
            created_at: details.room.created_at.to_rfc3339(),
            members: details
                .members
                .into_iter()
                .map(|presence| RoomMemberResponse {
                    last_seen: presence.last_seen,
                    presence: presence.into(),
                })
                .collect(),
        }
    }
}

/// Seconds in one app
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppTotalResponse {
    pub app_name: String,
    pub total_seconds: i64,
}

impl From<AppTotal> for AppTotalResponse {
    fn from(app: AppTotal) -> Self {
        Self {
            app_name: app.app_name,
            total_seconds: app.total_seconds,
        }
    }
}

/// Per-member statistics
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStatsResponse {
    pub user_id: String,
    pub avatar_path: Option<String>,
    pub name: Option<String>,
    pub is_online: bool,
    pub current_app: Option<String>,
    pub total_seconds: i64,
    pub apps: Vec<AppTotalResponse>,
    pub hourly_activity: BTreeMap<String, i64>,
}

impl From<MemberStats> for MemberStatsResponse {
    fn from(stats: MemberStats) -> Self {
        let MemberStats { presence, activity } = stats;
        Self {
            user_id: activity.user_id,
            avatar_path: presence.avatar_path,
            name: presence.name,
            is_online: presence.is_online,
            current_app: presence.active_app,
            total_seconds: activity.total_seconds,
            apps: activity.apps.into_iter().map(Into::into).collect(),
            hourly_activity: activity.hourly_activity,
        }
    }
}

/// Room statistics response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub room_id: String,
    pub period: &'static str,
    pub members: Vec<MemberStatsResponse>,
    pub top_apps: Vec<AppTotalResponse>,
    pub generated_at: String,
}

impl From<RoomStats> for StatsResponse {
    fn from(stats: RoomStats) -> Self {
        Self {
            room_id: stats.room_id,
            period: stats.period.as_str(),
            members: stats.members.into_iter().map(Into::into).collect(),
            top_apps: stats.top_apps.into_iter().map(Into::into).collect(),
            generated_at: stats.generated_at.to_rfc3339(),
        }
    }
}

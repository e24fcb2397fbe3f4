//! Activity log entries and repository trait.
//!
//! Maps to the append-only `activity_log` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::TimeWindow;
use crate::shared::error::AppError;

/// Seconds credited to the active app for each accepted heartbeat.
///
/// This is the client's expected heartbeat interval, not a measured
/// duration. Totals drift whenever the real cadence differs from it.
pub const HEARTBEAT_QUANTUM_SECS: i32 = 5;

/// Prefix of the token that replaces a deleted user's id in the log.
pub const ANONYMOUS_PREFIX: &str = "anonymous-";

/// One heartbeat's worth of app usage, before it is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySample {
    pub app_name: String,
    pub duration_secs: i32,
}

impl ActivitySample {
    /// Sample to log for a heartbeat, if any.
    ///
    /// Only a visible, non-idle heartbeat is logged: an app must be
    /// reported and focus mode must be off.
    pub fn from_heartbeat(active_app: Option<&str>, focus_mode: bool) -> Option<Self> {
        match active_app {
            Some(app) if !focus_mode => Some(Self {
                app_name: app.to_string(),
                duration_secs: HEARTBEAT_QUANTUM_SECS,
            }),
            _ => None,
        }
    }
}

/// A persisted activity log row.
///
/// Maps to the `activity_log` table:
/// - id: BIGSERIAL PRIMARY KEY
/// - room_id: VARCHAR(7) NOT NULL REFERENCES rooms(id)
/// - user_id: TEXT NOT NULL (user id, or anonymous token after deletion)
/// - app_name: TEXT NOT NULL
/// - duration_secs: INTEGER NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: i64,
    pub room_id: String,
    pub user_id: String,
    pub app_name: String,
    pub duration_secs: i32,
    pub created_at: DateTime<Utc>,
}

/// Seconds logged by one user on one app, grouped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppUsage {
    pub user_id: String,
    pub app_name: String,
    pub total_seconds: i64,
}

/// Seconds logged by one user within one UTC hour of day, grouped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourlyUsage {
    pub user_id: String,
    pub hour: u32,
    pub total_seconds: i64,
}

/// Generate a fresh anonymous token for a deleted account.
pub fn anonymous_token() -> String {
    format!("{}{}", ANONYMOUS_PREFIX, uuid::Uuid::new_v4())
}

/// Read and anonymization access to the activity log.
///
/// Appends happen inside [`super::MemberRepository::apply_heartbeat`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    /// Totals per (user, app) for a room within the window.
    ///
    /// Groups are returned in the order of their earliest log entry.
    async fn app_usage(&self, room_id: &str, window: TimeWindow) -> Result<Vec<AppUsage>, AppError>;

    /// Totals per (user, UTC hour of day) for a room within the window.
    async fn hourly_usage(
        &self,
        room_id: &str,
        window: TimeWindow,
    ) -> Result<Vec<HourlyUsage>, AppError>;
}

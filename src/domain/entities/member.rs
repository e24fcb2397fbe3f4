//! Room member liveness record and repository trait.
//!
//! Maps to the `room_members` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::activity::ActivitySample;
use crate::shared::error::AppError;

/// A user's liveness record in a room.
///
/// Maps to the `room_members` table joined with `users`:
/// - room_id: VARCHAR(7) NOT NULL REFERENCES rooms(id) (composite PK)
/// - user_id: TEXT NOT NULL REFERENCES users(id) (composite PK)
/// - active_app: TEXT NULL
/// - last_seen: TIMESTAMPTZ NULL (NULL until the first heartbeat)
/// - focus_mode: BOOLEAN NOT NULL DEFAULT FALSE
/// - joined_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
///
/// `avatar_path` and `name` are read from `users` alongside the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMember {
    pub room_id: String,
    pub user_id: String,
    pub avatar_path: Option<String>,
    pub name: Option<String>,

    /// Last reported application, as stored. Not necessarily visible.
    pub active_app: Option<String>,

    /// Time of the last accepted heartbeat
    pub last_seen: Option<DateTime<Utc>>,

    pub focus_mode: bool,
    pub joined_at: DateTime<Utc>,
}

impl RoomMember {
    /// Fresh membership with no heartbeat yet.
    pub fn joined(room_id: impl Into<String>, user_id: impl Into<String>, joined_at: DateTime<Utc>) -> Self {
        Self {
            room_id: room_id.into(),
            user_id: user_id.into(),
            avatar_path: None,
            name: None,
            active_app: None,
            last_seen: None,
            focus_mode: false,
            joined_at,
        }
    }

    /// Overwrite the liveness fields unless the record already holds a newer
    /// heartbeat. Returns whether the update was taken.
    pub fn apply(&mut self, update: &HeartbeatUpdate) -> bool {
        if self.last_seen.is_some_and(|seen| seen > update.seen_at) {
            return false;
        }
        self.active_app = update.active_app.clone();
        self.focus_mode = update.focus_mode;
        self.last_seen = Some(update.seen_at);
        true
    }
}

/// A validated heartbeat ready to be applied to a liveness record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatUpdate {
    pub room_id: String,
    pub user_id: String,
    pub active_app: Option<String>,
    pub focus_mode: bool,
    pub seen_at: DateTime<Utc>,

    /// Activity-log entry to append together with the liveness update
    pub sample: Option<ActivitySample>,
}

impl HeartbeatUpdate {
    pub fn new(
        room_id: impl Into<String>,
        user_id: impl Into<String>,
        active_app: Option<String>,
        focus_mode: bool,
        seen_at: DateTime<Utc>,
    ) -> Self {
        let sample = ActivitySample::from_heartbeat(active_app.as_deref(), focus_mode);
        Self {
            room_id: room_id.into(),
            user_id: user_id.into(),
            active_app,
            focus_mode,
            seen_at,
            sample,
        }
    }
}

/// Repository trait for member liveness records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// All liveness records of a room, in join order.
    async fn find_by_room(&self, room_id: &str) -> Result<Vec<RoomMember>, AppError>;

    /// Check whether a user is a member of a room.
    async fn is_member(&self, room_id: &str, user_id: &str) -> Result<bool, AppError>;

    /// Create a liveness record. Returns false if it already existed.
    async fn add(&self, member: &RoomMember) -> Result<bool, AppError>;

    /// Delete a liveness record. Returns false if there was none.
    async fn remove(&self, room_id: &str, user_id: &str) -> Result<bool, AppError>;

    /// Apply a heartbeat atomically.
    ///
    /// Within one transaction: overwrite the (room, user) record, append
    /// `update.sample` to the activity log when present, and re-read the
    /// room. Returns `None` without writing anything when the record does
    /// not exist.
    async fn apply_heartbeat(
        &self,
        update: &HeartbeatUpdate,
    ) -> Result<Option<Vec<RoomMember>>, AppError>;
}

//! Presence Service
//!
//! Heartbeat ingest: validates a member's heartbeat, applies it to the
//! liveness record (logging activity when visible) and returns the room's
//! presence view.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::services::{room_presence, MemberPresence};
use crate::domain::{HeartbeatUpdate, MemberRepository};
use crate::shared::clock::Clock;
use crate::shared::error::AppError;

/// Longest accepted application name, in characters.
pub const MAX_APP_NAME_CHARS: usize = 255;

/// A heartbeat as received from a client.
#[derive(Debug, Clone, Default)]
pub struct HeartbeatCommand {
    pub room_id: String,
    pub user_id: String,
    pub active_app: Option<String>,
    pub focus_mode: bool,
}

/// Result of an accepted heartbeat.
#[derive(Debug, Clone)]
pub struct HeartbeatOutcome {
    /// Presence view of the whole room after the update
    pub members: Vec<MemberPresence>,

    /// Whether an activity-log entry was appended
    pub logged: bool,
}

/// Presence service errors
#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    #[error("Not a member of this room")]
    NotMember,

    #[error("activeApp must be at most {MAX_APP_NAME_CHARS} characters")]
    AppNameTooLong,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<PresenceError> for AppError {
    fn from(err: PresenceError) -> Self {
        match err {
            PresenceError::NotMember => AppError::NotMember(err.to_string()),
            PresenceError::AppNameTooLong => AppError::Validation(err.to_string()),
            PresenceError::Store(e) => e,
        }
    }
}

/// Trim a reported app name; blank names count as no app.
pub fn normalize_app_name(active_app: Option<String>) -> Result<Option<String>, PresenceError> {
    let Some(app) = active_app else {
        return Ok(None);
    };
    let trimmed = app.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_APP_NAME_CHARS {
        return Err(PresenceError::AppNameTooLong);
    }
    Ok(Some(trimmed.to_string()))
}

/// Presence service trait
#[async_trait]
pub trait PresenceService: Send + Sync {
    /// Record a heartbeat and return the room's presence view.
    async fn heartbeat(&self, command: HeartbeatCommand) -> Result<HeartbeatOutcome, PresenceError>;
}

/// PresenceService implementation
pub struct PresenceServiceImpl<M>
where
    M: MemberRepository + ?Sized,
{
    member_repo: Arc<M>,
    clock: Arc<dyn Clock>,
}

impl<M> PresenceServiceImpl<M>
where
    M: MemberRepository + ?Sized,
{
    pub fn new(member_repo: Arc<M>, clock: Arc<dyn Clock>) -> Self {
        Self { member_repo, clock }
    }
}

#[async_trait]
impl<M> PresenceService for PresenceServiceImpl<M>
where
    M: MemberRepository + ?Sized + 'static,
{
    #[tracing::instrument(skip(self, command), fields(room_id = %command.room_id, user_id = %command.user_id))]
    async fn heartbeat(&self, command: HeartbeatCommand) -> Result<HeartbeatOutcome, PresenceError> {
        let active_app = normalize_app_name(command.active_app)?;
        let now = self.clock.now();

        let update = HeartbeatUpdate::new(
            command.room_id,
            command.user_id,
            active_app,
            command.focus_mode,
            now,
        );
        let logged = update.sample.is_some();

        let members = self
            .member_repo
            .apply_heartbeat(&update)
            .await?
            .ok_or(PresenceError::NotMember)?;

        tracing::debug!(logged, members = members.len(), "Heartbeat applied");

        Ok(HeartbeatOutcome {
            members: room_presence(&members, now),
            logged,
        })
    }
}

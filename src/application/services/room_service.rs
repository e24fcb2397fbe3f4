//! Room Service
//!
//! Room creation, membership changes and room lookup.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::services::{room_presence, MemberPresence};
use crate::domain::{
    generate_room_code, MemberRepository, Room, RoomMember, RoomRepository, UserRepository,
};
use crate::shared::clock::Clock;
use crate::shared::error::AppError;
use crate::shared::password::{hash_password, verify_password};

/// Attempts at drawing an unused room code before giving up.
pub const MAX_CODE_ATTEMPTS: usize = 10;

/// Result of a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyMember,
}

impl JoinOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Joined => "Joined room successfully",
            Self::AlreadyMember => "Already a member",
        }
    }
}

/// A room with its current presence view.
#[derive(Debug, Clone)]
pub struct RoomDetails {
    pub room: Room,
    pub members: Vec<MemberPresence>,
}

/// Room service errors
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("User not found")]
    UserNotFound,

    #[error("Room not found")]
    RoomNotFound,

    #[error("Invalid room password")]
    InvalidPassword,

    #[error("Failed to generate unique room ID")]
    CodeSpaceExhausted,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<RoomError> for AppError {
    fn from(err: RoomError) -> Self {
        match err {
            RoomError::UserNotFound | RoomError::RoomNotFound => AppError::NotFound(err.to_string()),
            RoomError::InvalidPassword => AppError::Forbidden(err.to_string()),
            RoomError::CodeSpaceExhausted => AppError::Internal(err.to_string()),
            RoomError::Store(e) => e,
        }
    }
}

/// Room service trait
#[async_trait]
pub trait RoomService: Send + Sync {
    /// Create a room owned by `user_id`, who becomes its first member.
    ///
    /// A blank password leaves the room unprotected.
    async fn create_room(&self, user_id: &str, password: Option<&str>) -> Result<Room, RoomError>;

    /// Add a user to a room.
    async fn join_room(
        &self,
        room_id: &str,
        user_id: &str,
        password: Option<&str>,
    ) -> Result<JoinOutcome, RoomError>;

    /// Remove a user from a room. Leaving a room one is not in succeeds.
    async fn leave_room(&self, room_id: &str, user_id: &str) -> Result<(), RoomError>;

    /// Get a room and its presence view.
    async fn get_room(&self, room_id: &str) -> Result<RoomDetails, RoomError>;
}

/// RoomService implementation
pub struct RoomServiceImpl<R, U, M>
where
    R: RoomRepository + ?Sized,
    U: UserRepository + ?Sized,
    M: MemberRepository + ?Sized,
{
    room_repo: Arc<R>,
    user_repo: Arc<U>,
    member_repo: Arc<M>,
    clock: Arc<dyn Clock>,
}

impl<R, U, M> RoomServiceImpl<R, U, M>
where
    R: RoomRepository + ?Sized,
    U: UserRepository + ?Sized,
    M: MemberRepository + ?Sized,
{
    pub fn new(
        room_repo: Arc<R>,
        user_repo: Arc<U>,
        member_repo: Arc<M>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            room_repo,
            user_repo,
            member_repo,
            clock,
        }
    }

    async fn require_user(&self, user_id: &str) -> Result<(), RoomError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .map(|_| ())
            .ok_or(RoomError::UserNotFound)
    }
}

#[async_trait]
impl<R, U, M> RoomService for RoomServiceImpl<R, U, M>
where
    R: RoomRepository + ?Sized + 'static,
    U: UserRepository + ?Sized + 'static,
    M: MemberRepository + ?Sized + 'static,
{
    #[tracing::instrument(skip(self, password))]
    async fn create_room(&self, user_id: &str, password: Option<&str>) -> Result<Room, RoomError> {
        self.require_user(user_id).await?;

        let password_hash = match password.filter(|p| !p.is_empty()) {
            Some(p) => Some(hash_password(p)?),
            None => None,
        };

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate_room_code(&mut rand::rng());
            if self.room_repo.exists(&code).await? {
                tracing::debug!(attempt, "Room code collision");
                continue;
            }

            let room = Room {
                id: code,
                created_by: user_id.to_string(),
                password_hash: password_hash.clone(),
                created_at: self.clock.now(),
            };

            match self.room_repo.create(&room).await {
                Ok(room) => {
                    tracing::info!(room_id = %room.id, protected = room.is_protected(), "Room created");
                    return Ok(room);
                }
                // Taken between the check and the insert
                Err(AppError::Conflict(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(RoomError::CodeSpaceExhausted)
    }

    #[tracing::instrument(skip(self, password))]
    async fn join_room(
        &self,
        room_id: &str,
        user_id: &str,
        password: Option<&str>,
    ) -> Result<JoinOutcome, RoomError> {
        let room = self
            .room_repo
            .find_by_id(room_id)
            .await?
            .ok_or(RoomError::RoomNotFound)?;
        self.require_user(user_id).await?;

        if self.member_repo.is_member(room_id, user_id).await? {
            return Ok(JoinOutcome::AlreadyMember);
        }

        if let Some(hash) = room.password_hash.as_deref() {
            if !verify_password(password.unwrap_or_default(), hash)? {
                return Err(RoomError::InvalidPassword);
            }
        }

        let member = RoomMember::joined(room_id, user_id, self.clock.now());
        let outcome = if self.member_repo.add(&member).await? {
            JoinOutcome::Joined
        } else {
            JoinOutcome::AlreadyMember
        };

        tracing::info!(?outcome, "Join processed");
        Ok(outcome)
    }

    #[tracing::instrument(skip(self))]
    async fn leave_room(&self, room_id: &str, user_id: &str) -> Result<(), RoomError> {
        let removed = self.member_repo.remove(room_id, user_id).await?;
        tracing::debug!(removed, "Leave processed");
        Ok(())
    }

    async fn get_room(&self, room_id: &str) -> Result<RoomDetails, RoomError> {
        let room = self
            .room_repo
            .find_by_id(room_id)
            .await?
            .ok_or(RoomError::RoomNotFound)?;
        let members = self.member_repo.find_by_room(room_id).await?;

        Ok(RoomDetails {
            room,
            members: room_presence(&members, self.clock.now()),
        })
    }
}

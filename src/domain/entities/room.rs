//! Room entity and repository trait.
//!
//! Maps to the `rooms` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// A co-working room.
///
/// Maps to the `rooms` table:
/// - id: VARCHAR(7) PRIMARY KEY (room code)
/// - created_by: TEXT NOT NULL
/// - password_hash: TEXT NULL (Argon2 PHC string)
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Room code (primary key)
    pub id: String,

    /// User who created the room
    pub created_by: String,

    /// Argon2 hash of the join password, if the room is protected
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Room {
    /// Whether joining requires a password.
    pub fn is_protected(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Repository trait for Room data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Find a room by its code.
    async fn find_by_id(&self, id: &str) -> Result<Option<Room>, AppError>;

    /// Check whether a room code is taken.
    async fn exists(&self, id: &str) -> Result<bool, AppError>;

    /// Insert a room and enroll its creator as the first member, atomically.
    ///
    /// Fails with `AppError::Conflict` if the code is already taken.
    async fn create(&self, room: &Room) -> Result<Room, AppError>;
}

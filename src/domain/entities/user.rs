//! User entity and repository trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Prefix of the synthetic device id given to users created through Google sign-in.
pub const GOOGLE_DEVICE_PREFIX: &str = "google:";

/// Represents a registered user.
///
/// Maps to the `users` table:
/// - id: TEXT PRIMARY KEY (UUID v4)
/// - device_id: TEXT NOT NULL UNIQUE
/// - email: TEXT NULL UNIQUE
/// - name: TEXT NULL
/// - avatar_path: TEXT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// UUID v4 string (primary key)
    pub id: String,

    /// Stable identifier of the installing device
    pub device_id: String,

    /// Email address, set for identity-provider users
    pub email: Option<String>,

    /// Display name
    pub name: Option<String>,

    /// Stored avatar file name, or an absolute URL supplied by the identity provider
    pub avatar_path: Option<String>,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a device-registered user with a fresh id.
    pub fn new(device_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            device_id: device_id.into(),
            email: None,
            name: None,
            avatar_path: None,
            created_at,
        }
    }

    /// Whether the avatar points at a remote picture rather than an uploaded file.
    pub fn has_remote_avatar(&self) -> bool {
        self.avatar_path
            .as_deref()
            .is_some_and(|path| path.starts_with("http"))
    }

    /// Whether the user uploaded their own avatar file.
    pub fn has_uploaded_avatar(&self) -> bool {
        self.avatar_path.is_some() && !self.has_remote_avatar()
    }
}

/// Rows touched when an account is erased.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountErasure {
    pub memberships: u64,
    pub anonymized: u64,
}

/// Repository trait for User data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;

    /// Find a user by device id.
    async fn find_by_device_id(&self, device_id: &str) -> Result<Option<User>, AppError>;

    /// Find a user by email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Insert a new user.
    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// Persist name and avatar changes.
    async fn update(&self, user: &User) -> Result<User, AppError>;

    /// Atomically drop a user's memberships, move their activity log rows to
    /// `anonymous_id` and delete the user. Returns None when no user matched.
    ///
    /// Memberships go first: a heartbeat racing the erasure either commits
    /// before it and gets anonymized, or finds no membership and is refused.
    async fn erase(
        &self,
        id: &str,
        anonymous_id: &str,
    ) -> Result<Option<AccountErasure>, AppError>;
}

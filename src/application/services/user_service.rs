//! User Service
//!
//! Handles device registration, avatars and account deletion.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{anonymous_token, AvatarFormat, AvatarStore, User, UserRepository};
use crate::shared::clock::Clock;
use crate::shared::error::AppError;

/// An avatar image ready to be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarFile {
    pub content_type: &'static str,
    pub data: Vec<u8>,
}

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("No avatar set")]
    NoAvatar,

    #[error("Avatar file not found")]
    AvatarFileMissing,

    #[error("Invalid file type. Allowed: png, jpg, jpeg, gif")]
    InvalidFileType,

    #[error("File too large (max {max_bytes} bytes)")]
    FileTooLarge { max_bytes: usize },

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound | UserError::NoAvatar | UserError::AvatarFileMissing => {
                AppError::NotFound(err.to_string())
            }
            UserError::InvalidFileType => AppError::Validation(err.to_string()),
            UserError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            UserError::Store(e) => e,
        }
    }
}

/// User service trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// Find or create the user of a device. The flag is true when created.
    async fn register(&self, device_id: &str) -> Result<(User, bool), UserError>;

    /// Get user by ID
    async fn get_user(&self, user_id: &str) -> Result<User, UserError>;

    /// Store a new avatar image, replacing any previous upload.
    async fn upload_avatar(
        &self,
        user_id: &str,
        file_name: &str,
        data: Vec<u8>,
    ) -> Result<User, UserError>;

    /// Load a user's uploaded avatar.
    async fn get_avatar(&self, user_id: &str) -> Result<AvatarFile, UserError>;

    /// Delete an account, keeping its activity under an anonymous id.
    async fn delete_user(&self, user_id: &str) -> Result<(), UserError>;
}

/// UserService implementation
pub struct UserServiceImpl<U: UserRepository + ?Sized> {
    user_repo: Arc<U>,
    avatars: Arc<dyn AvatarStore>,
    clock: Arc<dyn Clock>,
    max_avatar_bytes: usize,
}

impl<U: UserRepository + ?Sized> UserServiceImpl<U> {
    pub fn new(
        user_repo: Arc<U>,
        avatars: Arc<dyn AvatarStore>,
        clock: Arc<dyn Clock>,
        max_avatar_bytes: usize,
    ) -> Self {
        Self {
            user_repo,
            avatars,
            clock,
            max_avatar_bytes,
        }
    }

    async fn find_user(&self, user_id: &str) -> Result<User, UserError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn discard_avatar(&self, name: &str) {
        if let Err(e) = self.avatars.delete(name).await {
            tracing::warn!(avatar = %name, error = %e, "Failed to delete avatar file");
        }
    }
}

#[async_trait]
impl<U: UserRepository + ?Sized + 'static> UserService for UserServiceImpl<U> {
    async fn register(&self, device_id: &str) -> Result<(User, bool), UserError> {
        if let Some(user) = self.user_repo.find_by_device_id(device_id).await? {
            return Ok((user, false));
        }

        match self
            .user_repo
            .create(&User::new(device_id, self.clock.now()))
            .await
        {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "User registered");
                Ok((user, true))
            }
            // Registered concurrently by the same device
            Err(AppError::Conflict(_)) => self
                .user_repo
                .find_by_device_id(device_id)
                .await?
                .map(|user| (user, false))
                .ok_or_else(|| AppError::Internal("Device registration raced".into()).into()),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_user(&self, user_id: &str) -> Result<User, UserError> {
        self.find_user(user_id).await
    }

    #[tracing::instrument(skip(self, data), fields(size = data.len()))]
    async fn upload_avatar(
        &self,
        user_id: &str,
        file_name: &str,
        data: Vec<u8>,
    ) -> Result<User, UserError> {
        let mut user = self.find_user(user_id).await?;

        let format = AvatarFormat::from_file_name(file_name).ok_or(UserError::InvalidFileType)?;
        if data.len() > self.max_avatar_bytes {
            return Err(UserError::FileTooLarge {
                max_bytes: self.max_avatar_bytes,
            });
        }

        let stored_name = format.stored_name(&user.id);
        if user.has_uploaded_avatar() {
            if let Some(old) = user.avatar_path.as_deref().filter(|old| *old != stored_name) {
                self.discard_avatar(old).await;
            }
        }

        self.avatars.save(&stored_name, data).await?;
        user.avatar_path = Some(stored_name);

        Ok(self.user_repo.update(&user).await?)
    }

    async fn get_avatar(&self, user_id: &str) -> Result<AvatarFile, UserError> {
        let user = self.find_user(user_id).await?;

        let path = match user.avatar_path.as_deref() {
            None => return Err(UserError::NoAvatar),
            // Remote pictures are fetched by clients directly
            Some(_) if user.has_remote_avatar() => return Err(UserError::AvatarFileMissing),
            Some(path) => path,
        };

        let data = self
            .avatars
            .load(path)
            .await?
            .ok_or(UserError::AvatarFileMissing)?;
        let content_type = AvatarFormat::from_file_name(path)
            .map(|format| format.content_type())
            .unwrap_or("application/octet-stream");

        Ok(AvatarFile { content_type, data })
    }

    #[tracing::instrument(skip(self))]
    async fn delete_user(&self, user_id: &str) -> Result<(), UserError> {
        let user = self.find_user(user_id).await?;

        let erased = self
            .user_repo
            .erase(&user.id, &anonymous_token())
            .await?
            .ok_or(UserError::NotFound)?;

        if user.has_uploaded_avatar() {
            if let Some(path) = user.avatar_path.as_deref() {
                self.discard_avatar(path).await;
            }
        }

        tracing::info!(
            anonymized = erased.anonymized,
            memberships = erased.memberships,
            "User deleted"
        );
        Ok(())
    }
}

//! Avatar blob storage contract.

use async_trait::async_trait;

use crate::shared::error::AppError;

/// Largest accepted avatar upload, in bytes (1 MiB).
pub const MAX_AVATAR_BYTES: usize = 1024 * 1024;

/// Image formats accepted for avatars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarFormat {
    Png,
    Jpeg,
    Gif,
}

impl AvatarFormat {
    /// Detect the format from an uploaded file name's extension.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Canonical extension used for the stored file.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
        }
    }

    /// Stored file name for a user's avatar.
    pub fn stored_name(&self, user_id: &str) -> String {
        format!("{}.{}", user_id, self.extension())
    }
}

/// Blob store for avatar images, keyed by stored file name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvatarStore: Send + Sync {
    /// Write (or replace) a file.
    async fn save(&self, name: &str, data: Vec<u8>) -> Result<(), AppError>;

    /// Read a file, `None` if it does not exist.
    async fn load(&self, name: &str) -> Result<Option<Vec<u8>>, AppError>;

    /// Remove a file. Removing a missing file is not an error.
    async fn delete(&self, name: &str) -> Result<(), AppError>;

    /// Whether the backing storage is reachable.
    async fn is_available(&self) -> bool;
}

//! Local filesystem avatar store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::domain::AvatarStore;
use crate::shared::error::AppError;

/// Avatar files in a single flat directory.
#[derive(Debug, Clone)]
pub struct LocalAvatarStore {
    root: PathBuf,
}

impl LocalAvatarStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self, AppError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a stored name, refusing anything that is not a plain file name.
    fn resolve(&self, name: &str) -> Result<PathBuf, AppError> {
        let plain = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\'])
            && !name.contains('\0');
        if !plain {
            return Err(AppError::BadRequest(format!("Invalid avatar name: {name}")));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl AvatarStore for LocalAvatarStore {
    async fn save(&self, name: &str, data: Vec<u8>) -> Result<(), AppError> {
        let path = self.resolve(name)?;
        let size = data.len();
        fs::write(&path, data).await?;
        debug!(avatar = name, bytes = size, "Wrote avatar");
        Ok(())
    }

    async fn load(&self, name: &str) -> Result<Option<Vec<u8>>, AppError> {
        let path = self.resolve(name)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, name: &str) -> Result<(), AppError> {
        let path = self.resolve(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn is_available(&self) -> bool {
        fs::metadata(&self.root)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }
}

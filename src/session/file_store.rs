/*!
 * JSON-file checkpoint backend.
 *
 * The checkpoint lives next to the output as `<stem>.json`. A save writes a
 * side file, moves the current checkpoint to `<stem>.json.old`, then renames
 * the side file into place.
 */

use async_trait::async_trait;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use tokio::fs;

use super::checkpoint::{Checkpoint, CheckpointStore};
use crate::errors::TranslationError;

/// Checkpoint stored as a JSON file
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    path: PathBuf,
    old_path: PathBuf,
    side_path: PathBuf,
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn checkpoint_error(action: &str, path: &Path, error: impl std::fmt::Display) -> TranslationError {
    TranslationError::Checkpoint(format!("Failed to {} {:?}: {}", action, path, error))
}

impl FileCheckpointStore {
    /// Store at `path`, with `path.old` as the superseded copy
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            old_path: with_suffix(&path, ".old"),
            side_path: with_suffix(&path, ".tmp"),
            path,
        }
    }

    /// Path of the current checkpoint
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the superseded checkpoint
    pub fn old_path(&self) -> &Path {
        &self.old_path
    }

    async fn read(path: &Path) -> Result<Option<Checkpoint>, TranslationError> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(checkpoint_error("read", path, e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| checkpoint_error("parse", path, e))
    }

    async fn remove(path: &Path) -> Result<(), TranslationError> {
        match fs::remove_file(path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(checkpoint_error("remove", path, e)),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn load(&self) -> Result<Option<Checkpoint>, TranslationError> {
        match Self::read(&self.path).await {
            Err(e) => {
                warn!("{}; falling back to the previous checkpoint", e);
                Self::read(&self.old_path).await
            }
            // Interrupted between the two renames of a save
            Ok(None) => {
                let previous = Self::read(&self.old_path).await?;
                if previous.is_some() {
                    warn!("{:?} is missing; using the previous checkpoint", self.path);
                }
                Ok(previous)
            }
            found => found,
        }
    }

    async fn save(&self, checkpoint: &Checkpoint) -> Result<(), TranslationError> {
        let json = serde_json::to_string(checkpoint)
            .map_err(|e| checkpoint_error("serialize", &self.path, e))?;

        fs::write(&self.side_path, json)
            .await
            .map_err(|e| checkpoint_error("write", &self.side_path, e))?;
        if fs::try_exists(&self.path).await.unwrap_or(false) {
            fs::rename(&self.path, &self.old_path)
                .await
                .map_err(|e| checkpoint_error("rename", &self.path, e))?;
        }
        fs::rename(&self.side_path, &self.path)
            .await
            .map_err(|e| checkpoint_error("rename", &self.side_path, e))?;

        debug!(
            "Checkpoint saved: position {} chunk end {}",
            checkpoint.current_position, checkpoint.chunk_end_position
        );
        Ok(())
    }

    async fn clear(&self) -> Result<(), TranslationError> {
        Self::remove(&self.path).await?;
        Self::remove(&self.old_path).await?;
        Self::remove(&self.side_path).await
    }

    async fn exists(&self) -> bool {
        fs::try_exists(&self.path).await.unwrap_or(false)
            || fs::try_exists(&self.old_path).await.unwrap_or(false)
    }
}

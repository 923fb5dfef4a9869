/*!
 * SQLite checkpoint backend.
 *
 * Each (document, language) pair owns one row keyed by its output path. A
 * save moves the current payload to the previous slot, so the superseded
 * checkpoint survives until the next save.
 */

use async_trait::async_trait;
use log::{debug, warn};

use super::checkpoint::{Checkpoint, CheckpointStore};
use crate::database::{CheckpointDatabase, PayloadSlot};
use crate::errors::TranslationError;

/// Checkpoint stored in the `checkpoints` table
#[derive(Debug, Clone)]
pub struct SqliteCheckpointStore {
    db: CheckpointDatabase,
    key: String,
}

fn checkpoint_error(error: anyhow::Error) -> TranslationError {
    TranslationError::Checkpoint(format!("{:#}", error))
}

impl SqliteCheckpointStore {
    pub fn new(db: CheckpointDatabase, key: impl Into<String>) -> Self {
        Self { db, key: key.into() }
    }

    /// Key of the stored row
    pub fn key(&self) -> &str {
        &self.key
    }

    async fn read(&self, slot: PayloadSlot) -> Result<Option<String>, TranslationError> {
        self.db.payload(&self.key, slot).await.map_err(checkpoint_error)
    }

    /// The superseded checkpoint, if any
    pub async fn load_previous(&self) -> Result<Option<Checkpoint>, TranslationError> {
        match self.read(PayloadSlot::Previous).await? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| TranslationError::Checkpoint(e.to_string())),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CheckpointStore for SqliteCheckpointStore {
    async fn load(&self) -> Result<Option<Checkpoint>, TranslationError> {
        match self.read(PayloadSlot::Current).await? {
            Some(json) => match serde_json::from_str(&json) {
                Ok(checkpoint) => Ok(Some(checkpoint)),
                Err(e) => {
                    warn!("Unreadable checkpoint for {}: {}; using the previous one", self.key, e);
                    self.load_previous().await
                }
            },
            None => Ok(None),
        }
    }

    async fn save(&self, checkpoint: &Checkpoint) -> Result<(), TranslationError> {
        let json = serde_json::to_string(checkpoint)
            .map_err(|e| TranslationError::Checkpoint(e.to_string()))?;
        self.db.replace(&self.key, json).await.map_err(checkpoint_error)?;

        debug!("Checkpoint saved for {} at position {}", self.key, checkpoint.current_position);
        Ok(())
    }

    async fn clear(&self) -> Result<(), TranslationError> {
        self.db.remove(&self.key).await.map_err(checkpoint_error)
    }

    async fn exists(&self) -> bool {
        self.db.contains(&self.key).await.unwrap_or(false)
    }
}

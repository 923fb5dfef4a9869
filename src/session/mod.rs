/*!
 * Session state of one (document, language) translation.
 *
 * This module provides:
 * - The side files that live next to an output document
 * - The checkpoint model and its persistence interface
 * - JSON-file and SQLite checkpoint backends
 */

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::CheckpointBackend;
use crate::database::CheckpointDatabase;
use crate::errors::TranslationError;

pub mod checkpoint;
pub mod file_store;
pub mod sqlite_store;

// Re-export main types
pub use checkpoint::{Checkpoint, CheckpointStore};
pub use file_store::FileCheckpointStore;
pub use sqlite_store::SqliteCheckpointStore;

/// Files belonging to one output document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPaths {
    /// Translated document
    pub output: PathBuf,
    /// `<stem>.json` checkpoint
    pub checkpoint: PathBuf,
    /// `<stem>.json.old` superseded checkpoint
    pub checkpoint_old: PathBuf,
    /// `<stem>.partial.html` raw accepted increments
    pub partial: PathBuf,
    /// `<stem>.txt` request/response log
    pub exchange_log: PathBuf,
}

impl DocumentPaths {
    /// Side files of an output document, named after its stem
    pub fn for_output(output: impl AsRef<Path>) -> Self {
        let output = output.as_ref().to_path_buf();
        let stem = output.with_extension("");
        let sibling = |suffix: &str| {
            let mut name = stem.as_os_str().to_os_string();
            name.push(suffix);
            PathBuf::from(name)
        };

        Self {
            checkpoint: sibling(".json"),
            checkpoint_old: sibling(".json.old"),
            partial: sibling(".partial.html"),
            exchange_log: sibling(".txt"),
            output,
        }
    }

    /// Name of the document without directory and extension
    pub fn name(&self) -> String {
        self.output
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Key identifying the document in a shared store
    pub fn key(&self) -> String {
        self.output.to_string_lossy().to_string()
    }

    /// Side files removed once the document is complete
    pub fn cleanup_files(&self) -> [&Path; 3] {
        [&self.checkpoint, &self.checkpoint_old, &self.partial]
    }
}

/// Hex SHA-256 of a document body
pub fn source_hash(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Open the checkpoint store of a document for the configured backend
pub fn open_checkpoint_store(
    backend: CheckpointBackend,
    paths: &DocumentPaths,
    db: Option<&CheckpointDatabase>,
) -> Result<Arc<dyn CheckpointStore>, TranslationError> {
    match (backend, db) {
        (CheckpointBackend::File, _) => Ok(Arc::new(FileCheckpointStore::new(&paths.checkpoint))),
        (CheckpointBackend::Sqlite, Some(db)) => {
            Ok(Arc::new(SqliteCheckpointStore::new(db.clone(), paths.key())))
        }
        (CheckpointBackend::Sqlite, None) => Err(TranslationError::Checkpoint(
            "SQLite backend selected but no database is open".to_string(),
        )),
    }
}

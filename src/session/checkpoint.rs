/*!
 * Checkpoint model and persistence interface.
 *
 * A checkpoint records how far the translation of one document into one
 * language has progressed: the skeleton cursor, the unconfirmed leftover,
 * the target end of the chunk in progress and every chunk translation so far.
 * It is written after each accepted increment.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::errors::TranslationError;
use crate::translation::chunking::Chunk;

/// Persisted translation progress of one (document, language) pair
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Checkpoint {
    /// SHA-256 of the translatable body the checkpoint belongs to
    #[serde(default)]
    pub source_hash: String,
    /// Skeleton position reached
    pub current_position: usize,
    /// Unconfirmed fragment of the last increment
    pub leftover: String,
    /// Target skeleton position of the chunk in progress
    pub chunk_end_position: usize,
    /// Chunks started so far, in order
    pub completed_chunks: Vec<Chunk>,
    /// Translation of each started chunk
    pub translations: BTreeMap<usize, String>,
    /// Whether the last chunk in `completed_chunks` was finished
    #[serde(default)]
    pub last_chunk_complete: bool,
}

impl Checkpoint {
    /// Empty checkpoint for a body
    pub fn new(source_hash: impl Into<String>) -> Self {
        Self {
            source_hash: source_hash.into(),
            ..Default::default()
        }
    }

    /// Whether the chunk was started in this checkpoint
    pub fn contains(&self, chunk: &Chunk) -> bool {
        self.completed_chunks.contains(chunk)
    }

    /// Whether the chunk is the one whose translation was interrupted
    pub fn is_in_progress(&self, chunk: &Chunk) -> bool {
        !self.last_chunk_complete && self.completed_chunks.last() == Some(chunk)
    }

    /// Saved translation of a chunk
    pub fn translation(&self, chunk: &Chunk) -> Option<&str> {
        self.translations.get(&chunk.index).map(String::as_str)
    }

    /// Record an accepted increment of `chunk`
    pub fn record_increment(
        &mut self,
        chunk: &Chunk,
        position: usize,
        leftover: &str,
        chunk_end_position: usize,
        chunk_translation: &str,
    ) {
        self.current_position = position;
        self.leftover = leftover.to_string();
        self.chunk_end_position = chunk_end_position;
        if !self.contains(chunk) {
            self.completed_chunks.push(chunk.clone());
            self.last_chunk_complete = false;
        }
        self.translations.insert(chunk.index, chunk_translation.to_string());
    }

    /// Mark the last recorded chunk as finished
    pub fn mark_chunk_complete(&mut self) {
        self.last_chunk_complete = true;
    }
}

/// Persistence of the checkpoint of one (document, language) pair.
///
/// `save` must replace the previous checkpoint atomically and keep the
/// superseded version until the next successful write.
#[async_trait]
pub trait CheckpointStore: Send + Sync + Debug {
    /// Load the current checkpoint, if any
    async fn load(&self) -> Result<Option<Checkpoint>, TranslationError>;

    /// Replace the current checkpoint
    async fn save(&self, checkpoint: &Checkpoint) -> Result<(), TranslationError>;

    /// Remove the checkpoint and its superseded copy
    async fn clear(&self) -> Result<(), TranslationError>;

    /// Whether a checkpoint exists
    async fn exists(&self) -> bool;
}

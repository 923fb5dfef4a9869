/*!
 * Document orchestration.
 *
 * `DocumentPipeline` translates one document into one language:
 * - Splits the header from the translatable body at the boundary markers
 * - Builds the skeleton and the flattened, chunked source
 * - Translates the chunks strictly in order, resuming from the checkpoint
 * - Restores the original tags and reassembles the document
 * - Retitles the page after its translated headline
 */

use log::{debug, error, info, warn};
use std::sync::Arc;

use crate::app_config::{DocumentConfig, LanguageProfile};
use crate::errors::TranslationError;
use crate::file_utils::FileManager;
use crate::run_context::RunContext;
use crate::session::{Checkpoint, CheckpointStore, DocumentPaths, source_hash};
use crate::structure::text::tail;
use crate::structure::{Skeleton, normalize_whitespace, reconstruct, simplify_tags};

use super::chunking::split_into_chunks;
use super::finishing::finish_document;
use super::machine::{ChunkTranslator, DocumentState};

/// Opening tag prepended to the body so the skeleton has a root
const BODY_TAG: &str = "<body>";

/// A document split at its boundary markers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentParts {
    /// Everything before the body-start marker, kept verbatim
    pub header: String,
    /// `<body>` followed by the content up to the last end marker
    pub body: String,
}

/// A translated document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedDocument {
    /// Reassembled document
    pub content: String,
    /// False when the document ends with a degraded fragment
    pub complete: bool,
}

/// Split a document into header and translatable body
pub fn split_document(content: &str, markers: &DocumentConfig) -> Result<DocumentParts, TranslationError> {
    let start = content
        .find(&markers.body_start_marker)
        .ok_or_else(|| TranslationError::MissingBoundary(markers.body_start_marker.clone()))?;
    let end = content
        .rfind(&markers.end_marker)
        .filter(|&end| end >= start)
        .ok_or_else(|| TranslationError::MissingBoundary(markers.end_marker.clone()))?;

    Ok(DocumentParts {
        header: content[..start].to_string(),
        body: format!("{}{}", BODY_TAG, &content[start..end]),
    })
}

/// Translates one document into one language
#[derive(Debug)]
pub struct DocumentPipeline {
    ctx: RunContext,
    profile: LanguageProfile,
    paths: DocumentPaths,
    store: Arc<dyn CheckpointStore>,
}

impl DocumentPipeline {
    pub fn new(
        ctx: RunContext,
        profile: LanguageProfile,
        paths: DocumentPaths,
        store: Arc<dyn CheckpointStore>,
    ) -> Self {
        Self { ctx, profile, paths, store }
    }

    /// Output and side files of the document
    pub fn paths(&self) -> &DocumentPaths {
        &self.paths
    }

    /// Checkpoint of the body, discarding one written for another source
    async fn load_checkpoint(&self, hash: &str) -> Result<Checkpoint, TranslationError> {
        match self.store.load().await? {
            Some(checkpoint) if checkpoint.source_hash == hash => {
                info!(
                    "Resuming {} from checkpoint at position {}",
                    self.paths.name(),
                    checkpoint.current_position
                );
                Ok(checkpoint)
            }
            Some(_) => {
                warn!("Source of {} changed since its checkpoint, starting over", self.paths.name());
                self.store.clear().await?;
                Ok(Checkpoint::new(hash))
            }
            None => Ok(Checkpoint::new(hash)),
        }
    }

    /// Translate a whole document.
    ///
    /// # Arguments
    /// * `content` - The source document
    ///
    /// # Returns
    /// * The reassembled document and whether every chunk was completed
    pub async fn translate(&self, content: &str) -> Result<TranslatedDocument, TranslationError> {
        self.ctx.check_cancelled()?;

        let config = &self.ctx.config;
        let markers = &config.document;
        let overlap = config.chunking.chunk_overlap;
        let multiplier = if self.profile.multiplier > 0.0 { self.profile.multiplier } else { 1.0 };

        let parts = split_document(content, markers)?;
        let skeleton = Skeleton::from_markup(&parts.body);
        let flattened = normalize_whitespace(&simplify_tags(&parts.body));
        let chunks = split_into_chunks(
            &flattened,
            config.chunking.chunk_max_size,
            &config.chunking.separators,
        );
        info!(
            "Translating {} into {}: {} chunks, {} skeleton tokens",
            self.paths.name(),
            self.profile.code,
            chunks.len(),
            skeleton.len()
        );

        let hash = source_hash(&parts.body);
        let problematic = FileManager::file_exists(&self.paths.exchange_log);
        if problematic {
            debug!("{} was worked on before, treating it as problematic", self.paths.name());
        }
        let checkpoint = self.load_checkpoint(&hash).await?;
        let mut state = DocumentState::new(skeleton, checkpoint, problematic);

        let translator = ChunkTranslator::new(&self.ctx, &self.profile, &self.paths, self.store.as_ref());
        let mut translated = String::new();
        let mut source_context = String::new();
        let mut complete = true;

        for chunk in &chunks {
            if chunk.text.trim().is_empty() {
                continue;
            }

            let previous_context = tail(&translated, overlap).to_string();
            let mut outcome = translator
                .translate(&mut state, chunk, &previous_context, &source_context)
                .await?;
            if outcome.translation.is_empty() {
                warn!("Chunk {} of {} came back empty, retrying", chunk.index, self.paths.name());
                outcome = translator
                    .translate(&mut state, chunk, &previous_context, &source_context)
                    .await?;
                if outcome.translation.is_empty() {
                    error!("Chunk {} of {} is empty after retry", chunk.index, self.paths.name());
                    return Err(TranslationError::EmptyChunk { chunk: chunk.index });
                }
            }

            translated.push_str(&outcome.translation);
            state.problematic = outcome.problematic;
            source_context = format!(
                "...{}",
                tail(&chunk.text, (overlap as f64 / multiplier) as usize)
            );

            if outcome.degraded || translated.contains(&markers.incomplete_marker) {
                warn!(
                    "{} stops after chunk {} of {} with an incomplete translation",
                    self.paths.name(),
                    chunk.index + 1,
                    chunks.len()
                );
                complete = false;
                break;
            }
        }

        let rebuilt = reconstruct(
            &state.skeleton,
            &format!("{}{}", translated, markers.end_marker),
            &markers.incomplete_marker,
        )?;
        let body = rebuilt.replacen(BODY_TAG, "", 1);

        Ok(TranslatedDocument {
            content: finish_document(&format!("{}{}", parts.header, body), &self.profile.title),
            complete,
        })
    }
}

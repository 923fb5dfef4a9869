/*!
 * Chunk translation state machine.
 *
 * A chunk is translated in one or more parts. Each part sends requests until
 * an answer passes every check, and every accepted increment advances the
 * skeleton position and is checkpointed before the next request.
 *
 * Rejected answers are retried with a warning naming the problem. When the
 * attempts of a part run out, or the same request would be sent twice in a
 * row, the chunk either closes the document with a degraded fragment or
 * fails. Fatal generator errors cancel the whole run.
 */

use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

use crate::app_config::LanguageProfile;
use crate::errors::{AttemptError, TranslationError};
use crate::file_utils::FileManager;
use crate::providers::{Generation, GenerationRequest, StopReason, Turn};
use crate::run_context::RunContext;
use crate::session::{Checkpoint, CheckpointStore, DocumentPaths};
use crate::structure::text::{char_len, tail, truncate_middle};
use crate::structure::{Skeleton, normalize_whitespace, simplify_tags, tokenize};
use crate::validation::{Alignment, AnswerContext, ValidationService};

use super::chunking::Chunk;
use super::prompts::PromptBuilder;
use super::recovery::degraded_fragment;

/// Regex for bracketed comments at the very end of an answer
static TRAILING_COMMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*(?:\[[^\]]+\]\s*)+$").expect("Invalid trailing comment regex")
});

/// Temperature added per failed attempt
const TEMPERATURE_STEP: f32 = 0.3;

/// Characters shown on each side of an answer in log lines
const LOG_PREVIEW_CHARS: usize = 60;

/// Translation progress of one document, shared by its chunks in order
#[derive(Debug, Clone)]
pub struct DocumentState {
    /// Skeleton of the whole body
    pub skeleton: Skeleton,
    /// Checkpoint written after each increment
    pub checkpoint: Checkpoint,
    /// Skeleton position reached
    pub position: usize,
    /// Unconfirmed fragment of the last increment
    pub leftover: String,
    /// A previous run already struggled with this document
    pub problematic: bool,
}

impl DocumentState {
    /// State seeded from a (possibly empty) checkpoint
    pub fn new(skeleton: Skeleton, checkpoint: Checkpoint, problematic: bool) -> Self {
        Self {
            position: checkpoint.current_position,
            leftover: checkpoint.leftover.clone(),
            skeleton,
            checkpoint,
            problematic,
        }
    }
}

/// Result of translating one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkOutcome {
    /// Whitespace-normalized translation, or a degraded fragment
    pub translation: String,
    /// Whether the next chunk should be treated as problematic
    pub problematic: bool,
    /// The translation ends the document with the incomplete marker
    pub degraded: bool,
}

/// An answer that passed every check
#[derive(Debug)]
struct Increment {
    answer: String,
    alignment: Alignment,
}

/// Sampling temperature of an attempt.
///
/// Problematic documents start deterministic and jump to the maximum on
/// retries; others raise the base temperature on each failed attempt.
pub fn attempt_temperature(base: f32, attempt: u32, problematic: bool) -> f32 {
    if problematic {
        if attempt == 0 { 0.0 } else { 1.0 }
    } else {
        (base + TEMPERATURE_STEP * attempt as f32).min(1.0)
    }
}

/// Strip surrounding whitespace and trailing bracketed comments from an answer
pub fn clean_answer(raw: &str) -> String {
    let trimmed = raw.trim_end().trim_start_matches('\n');
    match TRAILING_COMMENT_REGEX.find(trimmed) {
        Some(comment) => {
            let kept = &trimmed[..comment.start()];
            error!(
                "Removed trailing comment after \"...{}\": {}",
                tail(kept, 50),
                comment.as_str().trim()
            );
            kept.to_string()
        }
        None => trimmed.to_string(),
    }
}

fn file_error(error: anyhow::Error) -> TranslationError {
    TranslationError::File(format!("{:#}", error))
}

/// Translates the chunks of one (document, language) pair
#[derive(Debug)]
pub struct ChunkTranslator<'a> {
    ctx: &'a RunContext,
    profile: &'a LanguageProfile,
    paths: &'a DocumentPaths,
    store: &'a dyn CheckpointStore,
    prompts: PromptBuilder,
    validator: ValidationService,
}

impl<'a> ChunkTranslator<'a> {
    pub fn new(
        ctx: &'a RunContext,
        profile: &'a LanguageProfile,
        paths: &'a DocumentPaths,
        store: &'a dyn CheckpointStore,
    ) -> Self {
        Self {
            prompts: PromptBuilder::new(&ctx.config, profile),
            validator: ValidationService::new(&ctx.config.validation),
            ctx,
            profile,
            paths,
            store,
        }
    }

    /// Translate one chunk.
    ///
    /// # Arguments
    /// * `state` - Document progress, advanced by every accepted increment
    /// * `chunk` - The chunk to translate
    /// * `previous_context` - Tail of the document translation so far
    /// * `source_context` - Tail of the previous chunk's source
    pub async fn translate(
        &self,
        state: &mut DocumentState,
        chunk: &Chunk,
        previous_context: &str,
        source_context: &str,
    ) -> Result<ChunkOutcome, TranslationError> {
        self.ctx.check_cancelled()?;

        let config = &self.ctx.config;
        let common = &config.translation.common;
        let overlap = config.chunking.chunk_overlap;

        let mut chunk_translation = String::new();
        let mut previous_context = previous_context.to_string();
        let chunk_end = if state.checkpoint.contains(chunk) {
            let saved = state.checkpoint.translation(chunk).unwrap_or_default().to_string();
            if !state.checkpoint.is_in_progress(chunk) {
                info!("Chunk {} already translated, reusing checkpoint", chunk.index);
                return Ok(ChunkOutcome {
                    translation: saved,
                    problematic: state.problematic,
                    degraded: false,
                });
            }
            info!(
                "Resuming chunk {} at position {}/{}",
                chunk.index, state.position, state.checkpoint.chunk_end_position
            );
            previous_context = tail(&format!("{}{}", previous_context, saved), overlap).to_string();
            chunk_translation = saved;
            state.checkpoint.chunk_end_position
        } else {
            tokenize(&chunk.text).len() + state.position
        };

        let system = self.prompts.system_instructions(source_context, &chunk.text);
        let expected_last = chunk_end
            .checked_sub(1)
            .and_then(|i| state.skeleton.get(i))
            .filter(|token| token.is_tag)
            .map(|token| simplify_tags(&token.text));

        let mut budget = common.max_tokens;
        let mut use_cache = state.problematic;
        let mut warning = String::new();
        let mut last_request: Option<(String, String)> = None;
        let mut part = 0u32;

        loop {
            part += 1;
            budget = (common.max_tokens + budget) / 2;
            let continuation = self
                .prompts
                .continuation(&previous_context, &chunk_translation, source_context);

            let mut attempts = 0u32;
            let mut last_error: Option<AttemptError> = None;
            let mut accepted: Option<(Increment, Generation)> = None;

            while attempts < common.max_attempts {
                self.ctx.check_cancelled()?;

                let user_turn = self.prompts.user_turn(&continuation.statement, &warning);
                let request_key = (user_turn.clone(), continuation.primer.clone());
                if last_request.as_ref() == Some(&request_key) {
                    warn!("Chunk {}: identical request would be repeated, stuck in a loop", chunk.index);
                    last_error = Some(AttemptError::StalledConversation);
                    break;
                }
                last_request = Some(request_key);

                let temperature = attempt_temperature(common.temperature, attempts, state.problematic);
                attempts += 1;
                info!(
                    "Chunk {} part {} attempt {}/{} into {}: temperature {:.1}, max tokens {}{}",
                    chunk.index,
                    part,
                    attempts,
                    common.max_attempts,
                    self.prompts.language(),
                    temperature,
                    budget,
                    if use_cache { ", cached" } else { "" }
                );

                if common.rate_limit_delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(common.rate_limit_delay_ms)).await;
                }

                let request = GenerationRequest {
                    system_instructions: system.clone(),
                    turns: vec![
                        Turn::user(user_turn.clone()),
                        Turn::assistant(continuation.primer.clone()),
                    ],
                    max_tokens: budget,
                    temperature,
                    cache_hint: use_cache,
                    stop_markers: vec![config.document.stop_marker.clone()],
                };

                let generation = match self.ctx.provider.complete(request).await {
                    Ok(generation) => generation,
                    Err(e) if e.is_fatal() => {
                        self.ctx.cancel(&e.to_string());
                        return Err(TranslationError::GeneratorFatal(e));
                    }
                    Err(e) => {
                        warn!("Chunk {}: generator error, retrying: {}", chunk.index, e);
                        last_request = None;
                        last_error = Some(AttemptError::Generator(e));
                        continue;
                    }
                };
                self.log_exchange(&user_turn, &continuation.primer, &generation)?;

                match self.check_answer(state, chunk, &previous_context, &continuation.primer, &generation) {
                    Ok(increment) => {
                        accepted = Some((increment, generation));
                        break;
                    }
                    Err(rejection) => {
                        if let AttemptError::StructuralMismatch(mismatch) = &rejection {
                            budget = ((generation.output_tokens as f64 * mismatch.consumed_ratio) as u32)
                                .max(common.min_tokens);
                            use_cache = true;
                        }
                        if let Some(text) = self.prompts.warning(&rejection, expected_last.as_deref()) {
                            warning = text;
                        }
                        last_error = Some(rejection);
                    }
                }
            }

            let Some((increment, generation)) = accepted else {
                return self.recover(chunk, &chunk_translation, attempts, last_error).await;
            };

            let Increment { mut answer, alignment } = increment;
            let Alignment { mut position, leftover } = alignment;

            let remaining = state.skeleton.span(position, chunk_end);
            if leftover.is_empty() && !remaining.is_empty() && remaining.iter().all(|t| t.is_tag) {
                let closing: String = remaining.iter().map(|t| simplify_tags(&t.text)).collect();
                debug!("Only tags left in chunk {}, appending {}", chunk.index, closing);
                answer.push_str(&closing);
                position = chunk_end;
            }

            FileManager::append_to_file(&self.paths.partial, &answer).map_err(file_error)?;
            let normalized = normalize_whitespace(&answer);
            chunk_translation.push_str(&normalized);
            previous_context = tail(&format!("{}{}", previous_context, normalized), overlap).to_string();

            state.position = position;
            state.leftover = leftover;
            state
                .checkpoint
                .record_increment(chunk, position, &state.leftover, chunk_end, &chunk_translation);

            let complete = generation.stop_reason == StopReason::StopMarker
                || (position >= chunk_end && state.leftover.is_empty())
                || (position + 1 >= chunk_end && !state.leftover.is_empty());
            if complete {
                state.checkpoint.mark_chunk_complete();
            }
            self.store.save(&state.checkpoint).await?;

            if complete {
                info!(
                    "Chunk {} translated in {} part(s), position {}",
                    chunk.index, part, position
                );
                return Ok(ChunkOutcome {
                    translation: chunk_translation,
                    problematic: false,
                    degraded: false,
                });
            }

            info!(
                "Chunk {}: position {}/{}, continuing after {} characters",
                chunk.index,
                position,
                chunk_end,
                char_len(&chunk_translation)
            );
            warning.clear();
        }
    }

    /// Clean, prefix and validate one generator answer
    fn check_answer(
        &self,
        state: &DocumentState,
        chunk: &Chunk,
        previous_context: &str,
        primer: &str,
        generation: &Generation,
    ) -> Result<Increment, AttemptError> {
        let cleaned = clean_answer(&generation.content);
        self.validator.ensure_not_empty(&cleaned)?;
        info!("Answer: {}", truncate_middle(&cleaned, LOG_PREVIEW_CHARS));

        let mut answer = if previous_context.is_empty() {
            format!("{}{}", primer, cleaned)
        } else {
            cleaned
        };
        if generation.stop_reason == StopReason::StopMarker {
            answer.push_str(&self.ctx.config.document.stop_marker);
        }

        let context = AnswerContext {
            skeleton: &state.skeleton,
            position: state.position,
            leftover: &state.leftover,
            source_chars: char_len(&chunk.text),
            profile: self.profile,
        };
        let alignment = self.validator.validate(&answer, &context)?;
        Ok(Increment { answer, alignment })
    }

    /// Degraded fragment when progress exists, failure otherwise
    async fn recover(
        &self,
        chunk: &Chunk,
        chunk_translation: &str,
        attempts: u32,
        last_error: Option<AttemptError>,
    ) -> Result<ChunkOutcome, TranslationError> {
        let last_error = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempt was made".to_string());
        let config = &self.ctx.config;

        if config.recovery.enabled && (!chunk_translation.is_empty() || self.store.exists().await) {
            error!(
                "Chunk {} of {} could not be completed ({}); closing it as incomplete",
                chunk.index,
                self.paths.name(),
                last_error
            );
            let translation = degraded_fragment(
                chunk_translation,
                &config.document.incomplete_marker,
                &config.document.stop_marker,
                &config.recovery,
                self.profile,
                &self.paths.name(),
            );
            return Ok(ChunkOutcome {
                translation,
                problematic: true,
                degraded: true,
            });
        }

        error!("Chunk {} failed after {} attempts: {}", chunk.index, attempts, last_error);
        Err(TranslationError::AttemptsExhausted {
            chunk: chunk.index,
            attempts,
            last_error,
        })
    }

    fn log_exchange(&self, user_turn: &str, primer: &str, generation: &Generation) -> Result<(), TranslationError> {
        FileManager::append_to_log_file(
            &self.paths.exchange_log,
            &format!(
                "Conversation: {}\n\nPrimer: {}\n\nMessage: {}\n\nStop: {:?}, {} tokens",
                user_turn, primer, generation.content, generation.stop_reason, generation.output_tokens
            ),
        )
        .map_err(file_error)
    }
}

/*!
 * Validation service that runs every answer check in order.
 *
 * The first failing check decides the rejection, so the warning sent back to
 * the generator always names one concrete problem.
 */

use log::{debug, warn};

use crate::app_config::{LanguageProfile, ValidationConfig};
use crate::errors::AttemptError;
use crate::structure::StructureToken;

use super::alignment::{Alignment, validate_increment};
use super::length::LengthValidator;
use super::repetition::RepetitionValidator;
use super::script::ScriptValidator;

/// What an answer is validated against
#[derive(Debug, Clone, Copy)]
pub struct AnswerContext<'a> {
    /// Whole-document skeleton
    pub skeleton: &'a [StructureToken],
    /// Current skeleton position
    pub position: usize,
    /// Unconfirmed fragment of the previous increment
    pub leftover: &'a str,
    /// Length of the chunk source in characters
    pub source_chars: usize,
    /// Target language profile
    pub profile: &'a LanguageProfile,
}

/// Runs the content checks and structural alignment on generator answers
#[derive(Debug, Clone)]
pub struct ValidationService {
    script: ScriptValidator,
    repetition: RepetitionValidator,
    length: LengthValidator,
}

impl ValidationService {
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            script: ScriptValidator::new(&config.source_script_ranges, config.leak_cap),
            repetition: RepetitionValidator::new(
                config.repetition_window,
                config.repetition_threshold,
                config.unspaced_repetition_threshold,
            ),
            length: LengthValidator::new(),
        }
    }

    /// Reject a raw answer that has no content
    pub fn ensure_not_empty(&self, raw_answer: &str) -> Result<(), AttemptError> {
        if raw_answer.trim().is_empty() {
            warn!("Empty answer from generator");
            return Err(AttemptError::EmptyAnswer);
        }
        Ok(())
    }

    /// Run the content checks, then align the answer against the skeleton
    pub fn validate(&self, answer: &str, context: &AnswerContext<'_>) -> Result<Alignment, AttemptError> {
        self.ensure_not_empty(answer)?;

        if let Some(leak) = self.script.check(answer) {
            warn!("Source script in translation: ...{}...", leak.snippet);
            return Err(AttemptError::SourceLanguageLeak {
                positions: leak.positions,
                snippet: leak.snippet,
            });
        }

        let words = self
            .repetition
            .find_repetitions(answer, context.profile.unspaced_script);
        if !words.is_empty() {
            warn!("Abnormal repetition detected: {}", words.join(", "));
            return Err(AttemptError::AbnormalRepetition { words });
        }

        if let Some(short) = self
            .length
            .check(answer, context.source_chars, context.profile.multiplier)
        {
            warn!("Cannot validate: only text without markup");
            return Err(AttemptError::ImplausibleOutput {
                length: short.length,
                expected_min: short.expected_min,
            });
        }

        let alignment = validate_increment(context.skeleton, context.position, context.leftover, answer)
            .map_err(AttemptError::StructuralMismatch)?;
        debug!("Answer accepted at position {}", alignment.position);
        Ok(alignment)
    }
}

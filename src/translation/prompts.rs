/*!
 * Prompt construction for chunk translation.
 *
 * Every request to the generator is made of:
 * - System instructions: the rendered template followed by the chunk source
 * - One user turn: progress statement, compliance reminder and warning
 * - One assistant turn: the primer the answer must continue from
 *
 * Warnings name the concrete problem of the previous answer so the next
 * attempt can correct it.
 */

use crate::app_config::{Config, LanguageProfile};
use crate::errors::AttemptError;
use crate::language_utils;
use crate::structure::text::{char_len, head, tail};

/// Progress statement and primer of a continuation request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Continuation {
    /// "About N characters were translated..." statement, empty on a first request
    pub statement: String,
    /// Assistant primer the answer continues from
    pub primer: String,
}

/// Builds system instructions, user turns and warnings for one
/// (document, language) pair
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    language: String,
    source_language: String,
    system_template: String,
    reminder: String,
    opening_primer: String,
    title: String,
    translator_note: String,
    example: String,
    multiplier: f64,
    overlap: usize,
    parting: usize,
    repetition_window: usize,
    repetition_threshold: usize,
    unspaced: bool,
}

impl PromptBuilder {
    pub fn new(config: &Config, profile: &LanguageProfile) -> Self {
        let source_language = language_utils::get_language_name(&config.source_language)
            .unwrap_or_else(|_| config.source_language.clone());
        let repetition_threshold = if profile.unspaced_script {
            config.validation.unspaced_repetition_threshold
        } else {
            config.validation.repetition_threshold
        };

        Self {
            language: profile.language_name(),
            source_language,
            system_template: config.translation.common.system_prompt.clone(),
            reminder: config.translation.common.reminder.clone(),
            opening_primer: config.document.opening_primer.replace("{title}", &profile.title),
            title: profile.title.clone(),
            translator_note: profile.translator_note.clone(),
            example: profile.example.clone(),
            multiplier: if profile.multiplier > 0.0 { profile.multiplier } else { 1.0 },
            overlap: config.chunking.chunk_overlap,
            parting: config.chunking.overlap_parting.max(1),
            repetition_window: config.validation.repetition_window,
            repetition_threshold,
            unspaced: profile.unspaced_script,
        }
    }

    /// Target language name used in prompts
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Rendered template followed by the source of the chunk
    pub fn system_instructions(&self, source_context: &str, chunk_text: &str) -> String {
        let rendered = self
            .system_template
            .replace("{language}", &self.language)
            .replace("{title}", &self.title)
            .replace("{translator_note}", &self.translator_note)
            .replace("{example}", &self.example);

        format!(
            "{}\n\nHTML text to translate into {}:\n{}{}",
            rendered, self.language, source_context, chunk_text
        )
    }

    /// Primer of the very first request of a document
    pub fn opening_primer(&self) -> &str {
        &self.opening_primer
    }

    /// Characters of previous translation used as assistant primer
    pub fn primer_len(&self) -> usize {
        self.overlap / self.parting
    }

    /// Characters of previous translation quoted in the progress statement
    pub fn context_head_len(&self) -> usize {
        self.primer_len() * (self.parting - 1)
    }

    /// Progress statement and primer for a request that continues
    /// `previous_context`. Without previous context the primer is the
    /// opening primer and there is no statement.
    pub fn continuation(&self, previous_context: &str, chunk_translation: &str, source_context: &str) -> Continuation {
        if previous_context.is_empty() {
            return Continuation {
                statement: String::new(),
                primer: self.opening_primer.clone(),
            };
        }

        let primer = tail(previous_context, self.primer_len());
        // A short context is quoted whole, so head and primer may overlap
        let context_head = head(previous_context, self.context_head_len());

        let translated = if chunk_translation.is_empty() {
            char_len(context_head) as f64 / self.multiplier
        } else {
            char_len(chunk_translation).saturating_sub(char_len(primer)) as f64 / self.multiplier
                + char_len(source_context).saturating_sub(3) as f64
        };

        Continuation {
            statement: format!(
                "About {} characters were translated. End of previous translation: <context>{}</context> Continue the translation exactly from where you left off. ",
                translated as usize, context_head
            ),
            primer: primer.to_string(),
        }
    }

    /// User turn: progress statement, reminder, warning
    pub fn user_turn(&self, statement: &str, warning: &str) -> String {
        format!("{}{}{}", statement, self.reminder, warning)
    }

    /// Corrective warning for a rejected answer, with the attention line.
    ///
    /// `expected_last` is the last skeleton token of the chunk when it is a
    /// tag. Returns `None` for errors that keep the previous warning.
    pub fn warning(&self, error: &AttemptError, expected_last: Option<&str>) -> Option<String> {
        let text = match error {
            AttemptError::EmptyAnswer => {
                let mut text = "Last time, you returned an empty answer. Do not repeat this mistake. DO NOT stop before the very last character of this HTML text".to_string();
                if let Some(tag) = expected_last {
                    text.push_str(&format!(
                        ", NOR forget to include the last HTML tags in your answer. Your translation must end with {}",
                        tag
                    ));
                }
                text.push_str("</warning>");
                text
            }
            AttemptError::SourceLanguageLeak { snippet, .. } => format!(
                "Last time, there was {} inside your answer, instead of only {}: \"...{}...\". NEVER use {} letters in your answer. DO NOT repeat this mistake</warning>",
                self.source_language,
                self.language,
                snippet,
                self.source_language.to_lowercase()
            ),
            AttemptError::AbnormalRepetition { words } => format!(
                "Content hallucination was detected in your previous answer. Within ~{} {}, these appeared over {} times each: {}. This indicates severe repetition and loss of context. DO NOT repeat this mistake</warning>",
                self.repetition_window,
                if self.unspaced { "characters" } else { "words" },
                self.repetition_threshold,
                words.join(", ")
            ),
            AttemptError::ImplausibleOutput { .. } => {
                "Last time you returned only text without HTML structure. ONLY stop answering at the end of the entire original text</warning>".to_string()
            }
            AttemptError::StructuralMismatch(mismatch) => format!(
                "An HTML mismatch was detected in your previous answer, due to earlier omissions or alterations. Instead of {orig} there was {trans}. Context up to and including mismatch: <original>{oc}</original> <your-translation>{tc}</your-translation></warning> DO NOT repeat this mistake, NOR misplace any {orig} or {trans}.",
                orig = mismatch.original_token,
                trans = mismatch.translated_token,
                oc = mismatch.original_context,
                tc = mismatch.translated_context
            ),
            AttemptError::StalledConversation | AttemptError::Generator(_) => return None,
        };
        Some(self.with_attention(text))
    }

    /// Prefix the "last attempt" attention line unless already present
    pub fn with_attention(&self, warning: String) -> String {
        if warning.contains("<warning>") {
            return warning;
        }
        format!(
            " <warning>ATTENTION: This is your last attempt to translate this section into {}. {}",
            self.language, warning
        )
    }
}

/*!
 * Error types for the yahtwai application.
 *
 * This module contains custom error types for the different layers of the
 * application, using the thiserror crate for ergonomic error definitions:
 * - `ProviderError`: failures talking to a text generator
 * - `AttemptError`: retryable rejections of a single generator answer
 * - `TranslationError`: failures of a chunk or a whole document
 * - `AppError`: everything, at the binary boundary
 */

use thiserror::Error;

use crate::validation::alignment::StructuralMismatch;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting or exhausted quota
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// The API rejected the request itself (malformed, billing, context size)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether this error must abort the whole run instead of being retried.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded(_) | Self::InvalidRequest(_) | Self::AuthenticationError(_)
        )
    }

    /// Map an HTTP status and body onto the matching variant.
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            400 | 413 => Self::InvalidRequest(message),
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Rejection of one generator answer. Every variant is retried inside the
/// chunk's attempt budget with a corrective warning.
#[derive(Error, Debug, Clone)]
pub enum AttemptError {
    /// The generator returned nothing usable
    #[error("Empty answer")]
    EmptyAnswer,

    /// Characters of the source script leaked into the translation
    #[error("Source script in translation at {positions:?}: ...{snippet}...")]
    SourceLanguageLeak {
        /// Character offsets of the leaked characters (capped)
        positions: Vec<usize>,
        /// Text surrounding the first leak
        snippet: String,
    },

    /// Hallucinated looping detected in a sliding window
    #[error("Abnormal repetition detected: {}", words.join(", "))]
    AbnormalRepetition {
        /// Tokens that crossed the repetition threshold
        words: Vec<String>,
    },

    /// The answer's tag sequence drifted from the skeleton
    #[error("Structure mismatch: expected {} found {}", .0.original_token, .0.translated_token)]
    StructuralMismatch(StructuralMismatch),

    /// Markup-free answer far shorter than the source would justify
    #[error("Only text without markup ({length} < {expected_min} chars)")]
    ImplausibleOutput {
        /// Length of the answer
        length: usize,
        /// Minimum length expected for a markup-free answer
        expected_min: usize,
    },

    /// The outgoing request was identical to the previous one
    #[error("Stuck in a loop with the generator")]
    StalledConversation,

    /// A transient generator failure
    #[error("Generator error: {0}")]
    Generator(ProviderError),
}

/// Errors that can occur while translating a chunk or a document
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Quota, authentication or invalid-request failure; stops the run
    #[error("Fatal generator error: {0}")]
    GeneratorFatal(ProviderError),

    /// Attempts ran out and no degraded fragment could be produced
    #[error("Chunk {chunk} failed after {attempts} attempts: {last_error}")]
    AttemptsExhausted {
        /// Zero-based chunk index
        chunk: usize,
        /// Attempts spent on the last part
        attempts: u32,
        /// Description of the last rejection
        last_error: String,
    },

    /// The chunk produced no translation, even after a retry
    #[error("Chunk {chunk} produced an empty translation after retry")]
    EmptyChunk {
        /// Zero-based chunk index
        chunk: usize,
    },

    /// Translated markup could not be matched back onto the skeleton
    #[error("Structure reconstruction failed: {0}")]
    StructureReconstruction(String),

    /// The source document lacks a required boundary marker
    #[error("Missing document boundary marker: {0}")]
    MissingBoundary(String),

    /// Checkpoint persistence failed
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Writing side files failed
    #[error("File error: {0}")]
    File(String),

    /// The run was cancelled by a fatal error elsewhere
    #[error("Run cancelled")]
    Cancelled,
}

impl TranslationError {
    /// Whether this error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::GeneratorFatal(_) | Self::Cancelled)
    }
}

impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

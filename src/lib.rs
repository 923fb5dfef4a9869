/*!
 * # YAHTwAI - Yet Another HTML Translator with AI
 *
 * A Rust library for translating HTML documents with large language models
 * while preserving their markup exactly.
 *
 * ## Features
 *
 * - Chunked translation of long documents with continuity context
 * - Every answer is checked against the source tag structure
 * - Detection of source-language leaks, hallucinated repetition and
 *   truncated output, with corrective warnings sent back to the generator
 * - Checkpoints after every accepted increment, in JSON files or SQLite
 * - Degraded but well-formed output when a chunk cannot be completed
 * - Anthropic and Ollama providers
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `structure`: Tokenizer, skeleton and tag reconstruction
 * - `validation`: Answer checks and structural alignment
 * - `translation`: AI-powered translation engine:
 *   - `translation::chunking`: Chunk splitting and boundary adjustment
 *   - `translation::machine`: Per-chunk translation state machine
 *   - `translation::orchestrator`: Whole-document pipeline
 * - `session`: Checkpoints and per-document side files
 * - `database`: SQLite storage for checkpoints
 * - `providers`: Client implementations for LLM providers
 * - `run_context`: Configuration, provider and cancellation of a run
 * - `app_controller`: Directory-level run driver
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod database;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod run_context;
pub mod session;
pub mod structure;
pub mod translation;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunSummary};
pub use errors::{AppError, AttemptError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use run_context::RunContext;
pub use translation::{DocumentPipeline, TranslatedDocument};

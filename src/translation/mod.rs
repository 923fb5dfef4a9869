/*!
 * Chunked translation of markup documents.
 *
 * This module contains the translation engine. It is split into several
 * submodules:
 *
 * - `chunking`: Splitting the flattened body into chunks at natural boundaries
 * - `prompts`: System instructions, progress statements and warnings
 * - `machine`: The per-chunk request/validate/continue state machine
 * - `recovery`: Degraded fragments for chunks that cannot be completed
 * - `finishing`: Page title and headline cleanup of the reassembled document
 * - `orchestrator`: Whole-document split, translation and reassembly
 */

// Re-export main types for easier usage
pub use self::chunking::{Chunk, adjust_boundaries, split_into_chunks};
pub use self::machine::{ChunkOutcome, ChunkTranslator, DocumentState};
pub use self::orchestrator::{DocumentParts, DocumentPipeline, TranslatedDocument, split_document};
pub use self::prompts::PromptBuilder;

// Submodules
pub mod chunking;
pub mod finishing;
pub mod machine;
pub mod orchestrator;
pub mod prompts;
pub mod recovery;

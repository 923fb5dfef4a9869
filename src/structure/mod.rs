/*!
 * Markup structure engine.
 *
 * The skeleton of a document is the ordered list of its tag and text tokens.
 * It is computed once from the source body and is the ground truth every
 * translated increment is checked against.
 *
 * # Architecture
 *
 * - `tokenizer`: token extraction, tag names and tag simplification
 * - `text`: character-safe slicing helpers shared by the whole crate
 * - `reconstruct`: restores original tag attributes in translated markup
 */

pub mod reconstruct;
pub mod text;
pub mod tokenizer;

// Re-export main types
pub use reconstruct::reconstruct;
pub use tokenizer::{Skeleton, StructureToken, normalize_whitespace, simplify_tags, tag_name, tokenize};

/*!
 * Validation of generator answers.
 *
 * Every answer goes through content checks before its structure is aligned
 * against the document skeleton:
 * - Source-script leaks
 * - Abnormal repetition (hallucinated looping)
 * - Implausibly short markup-free output
 * - Structural alignment
 *
 * # Architecture
 *
 * - `alignment`: Aligns increments against the skeleton
 * - `script`: Finds source-script characters
 * - `repetition`: Sliding-window repetition detection
 * - `length`: Length plausibility
 * - `service`: Runs all checks in order
 */

pub mod alignment;
pub mod length;
pub mod repetition;
pub mod script;
pub mod service;

// Re-export main types
pub use alignment::{Alignment, StructuralMismatch, validate_increment};
pub use service::{AnswerContext, ValidationService};

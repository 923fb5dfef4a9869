/*!
 * SQLite backend for checkpoints.
 *
 * - `checkpoints`: the shared database handle and its row operations
 * - `schema`: table creation and version check
 */

pub mod checkpoints;
pub mod schema;

pub use checkpoints::{CheckpointDatabase, PayloadSlot};

/*!
 * Schema of the checkpoint database.
 *
 * The schema version lives in SQLite's `user_version` pragma. A database
 * written by a newer release is refused instead of being modified.
 */

use anyhow::{Context, Result, bail};
use log::{debug, info};
use rusqlite::Connection;

/// Schema version written by this release
pub const SCHEMA_VERSION: i32 = 1;

/// One row per (document, language); `old_payload` holds the superseded checkpoint
const CHECKPOINTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS checkpoints (
        document_key TEXT PRIMARY KEY,
        payload TEXT NOT NULL,
        old_payload TEXT,
        updated_at TEXT NOT NULL
    );
"#;

/// Schema version stored in the database, 0 for a fresh file
pub fn schema_version(conn: &Connection) -> Result<i32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .context("Failed to read the checkpoint schema version")
}

/// Create the checkpoint table on a fresh database and check the version of an existing one
pub fn prepare(conn: &Connection) -> Result<()> {
    let version = schema_version(conn)?;
    if version > SCHEMA_VERSION {
        bail!(
            "Checkpoint database has schema v{}, this release only knows v{}",
            version,
            SCHEMA_VERSION
        );
    }

    // WAL keeps the last committed checkpoint readable after a crash
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    conn.execute_batch(CHECKPOINTS_TABLE)
        .context("Failed to create the checkpoints table")?;

    if version < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        info!("Checkpoint database initialized (schema v{})", SCHEMA_VERSION);
    } else {
        debug!("Checkpoint database schema is current (v{})", version);
    }
    Ok(())
}

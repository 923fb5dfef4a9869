/*!
 * Checkpoint rows in SQLite.
 *
 * `CheckpointDatabase` owns one connection shared by every document of a run.
 * Each row is addressed by a document key and carries the current payload and
 * the one it replaced. Rusqlite is blocking, so every row operation runs on
 * tokio's blocking pool.
 */

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::schema;

const DEFAULT_DB_FILENAME: &str = "checkpoints.db";
const DEFAULT_DB_DIRNAME: &str = "yahtwai";

/// Which of the two payloads of a row to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSlot {
    /// The last saved checkpoint
    Current,
    /// The checkpoint it replaced
    Previous,
}

impl PayloadSlot {
    fn column(self) -> &'static str {
        match self {
            PayloadSlot::Current => "payload",
            PayloadSlot::Previous => "old_payload",
        }
    }
}

/// Shared handle on the checkpoint database
#[derive(Clone, Debug)]
pub struct CheckpointDatabase {
    path: PathBuf,
    conn: Arc<Mutex<Connection>>,
}

impl CheckpointDatabase {
    /// Open the database in the user's data directory
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    /// Open or create the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        info!("Opening checkpoint database at: {:?}", path);
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open checkpoint database: {:?}", path))?;
        Self::prepared(path, conn)
    }

    /// Database that lives as long as the handle
    pub fn in_memory() -> Result<Self> {
        debug!("Creating in-memory checkpoint database");
        let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;
        Self::prepared(PathBuf::from(":memory:"), conn)
    }

    fn prepared(path: PathBuf, conn: Connection) -> Result<Self> {
        schema::prepare(&conn)?;
        Ok(Self { path, conn: Arc::new(Mutex::new(conn)) })
    }

    /// `<data dir>/yahtwai/checkpoints.db`
    pub fn default_path() -> Result<PathBuf> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| anyhow!("Could not determine data directory"))?;
        Ok(base_dir.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // @method: with_connection
    async fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || f(&*conn.lock()))
            .await
            .context("Checkpoint database task panicked")?
            .map_err(Into::into)
    }

    /// Stored payload of `key`, None when the row or the slot is empty
    pub async fn payload(&self, key: &str, slot: PayloadSlot) -> Result<Option<String>> {
        let key = key.to_string();
        let sql = format!("SELECT {} FROM checkpoints WHERE document_key = ?1", slot.column());
        let found: Option<Option<String>> = self
            .with_connection(move |conn| {
                conn.query_row(&sql, params![key], |row| row.get(0)).optional()
            })
            .await?;
        Ok(found.flatten())
    }

    /// Store `json` as the current payload, moving the previous one aside
    pub async fn replace(&self, key: &str, json: String) -> Result<()> {
        let key = key.to_string();
        self.with_connection(move |conn| {
            conn.execute(
                "INSERT INTO checkpoints (document_key, payload, updated_at)
                 VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(document_key) DO UPDATE SET
                    old_payload = checkpoints.payload,
                    payload = excluded.payload,
                    updated_at = excluded.updated_at",
                params![key, json],
            )
        })
        .await?;
        Ok(())
    }

    /// Delete the row of `key`, both payloads included
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.with_connection(move |conn| {
            conn.execute("DELETE FROM checkpoints WHERE document_key = ?1", params![key])
        })
        .await?;
        Ok(())
    }

    pub async fn contains(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        self.with_connection(move |conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM checkpoints WHERE document_key = ?1)",
                params![key],
                |row| row.get(0),
            )
        })
        .await
    }

    /// Number of documents with a checkpoint
    pub fn checkpoint_count(&self) -> Result<i64> {
        let conn = self.conn.lock();
        Ok(conn.query_row("SELECT COUNT(*) FROM checkpoints", [], |row| row.get(0))?)
    }
}

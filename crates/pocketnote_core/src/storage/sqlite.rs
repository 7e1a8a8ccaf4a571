//! SQLite-backed key-value persistence.
//!
//! # Responsibility
//! - Store one JSON snapshot per key in the `kv_entries` table.
//! - Keep blocking SQLite calls off the async executor threads.
//!
//! # Invariants
//! - Each `set` is a single upsert statement, so a key always holds a complete
//!   snapshot.
//! - The connection is shared behind a mutex and only touched from
//!   `spawn_blocking` workers.

use super::{KeyValueStore, StorageError, StorageResult};
use crate::db::{open_db, open_db_in_memory, DbError};
use async_trait::async_trait;
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Durable [`KeyValueStore`] over a migrated SQLite connection.
#[derive(Clone)]
pub struct SqliteKeyValueStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKeyValueStore {
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a throwaway in-memory database.
    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps an already-migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    async fn run<T, F>(&self, op: &'static str, work: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StorageResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let joined = tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| DbError::ConnectionPoisoned)?;
            work(&guard)
        })
        .await;

        match joined {
            Ok(result) => result,
            Err(err) => {
                error!("event=kv_{op} module=storage status=error error=worker_failed detail={err}");
                Err(StorageError::Backend(format!("sqlite worker failed: {err}")))
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let key = key.to_string();
        self.run("get", move |conn| {
            let value: Option<String> = conn
                .query_row(
                    "SELECT value FROM kv_entries WHERE key = ?1;",
                    [key.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            debug!(
                "event=kv_get module=storage status=ok key={} found={}",
                key,
                value.is_some()
            );
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let key = key.to_string();
        let value = value.to_string();
        self.run("set", move |conn| {
            conn.execute(
                "INSERT INTO kv_entries (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key.as_str(), value.as_str()],
            )?;
            debug!(
                "event=kv_set module=storage status=ok key={} bytes={}",
                key,
                value.len()
            );
            Ok(())
        })
        .await
    }
}

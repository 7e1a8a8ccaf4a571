//! Persistence adapter contract and backends.
//!
//! # Responsibility
//! - Define the async key-value contract the stores persist through.
//! - Provide an in-memory backend and a SQLite-backed durable backend.
//!
//! # Invariants
//! - Values are complete UTF-8 JSON snapshots; partial writes do not exist.
//! - A `set` either stores the whole value or fails; callers never observe a
//!   half-written value through `get`.

use crate::db::DbError;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

/// Storage key of the notes collection.
pub const NOTES_KEY: &str = "notes";
/// Storage key of the tags collection.
pub const TAGS_KEY: &str = "tags";

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure reported by a persistence backend.
#[derive(Debug)]
pub enum StorageError {
    /// SQLite backend failure.
    Db(DbError),
    /// Collection snapshot could not be encoded as JSON.
    Encode(serde_json::Error),
    /// Backend-specific failure without a richer type (worker panics, I/O
    /// shims, test doubles).
    Backend(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "storage database error: {err}"),
            Self::Encode(err) => write!(f, "failed to encode collection: {err}"),
            Self::Backend(message) => write!(f, "storage backend error: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Backend(_) => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Minimal async key-value storage the stores depend on.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` when the key was never written.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replaces the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

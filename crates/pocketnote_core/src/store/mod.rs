//! Entity stores: canonical in-memory collections with write-through
//! persistence.
//!
//! # Responsibility
//! - Own the in-memory notes and tags collections.
//! - Apply every mutation to the current in-memory state, publish it to
//!   observers, then write the full collection through the storage adapter.
//! - Recover from unreadable persisted data without failing startup.
//!
//! # Invariants
//! - The in-memory collection is authoritative; a failed write is reported to
//!   the caller but never rolled back.
//! - Each successful mutation issues exactly one full-collection write.
//! - Validation failures return before any mutation or write.
//! - The collection lock is never held across an `.await`.

use crate::model::tag::{TagId, TagValidationError};
use crate::storage::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

mod collection;
pub mod notes_store;
pub mod tags_store;

pub use notes_store::NotesStore;
pub use tags_store::TagsStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by store mutations.
#[derive(Debug)]
pub enum StoreError {
    /// Caller input violates an entity invariant. Nothing was changed.
    Validation(TagValidationError),
    /// Tag name collides with `existing_id` ignoring case. Nothing was changed.
    Duplicate { name: String, existing_id: TagId },
    /// The write-through failed. The in-memory change is kept.
    Persistence(StorageError),
}

impl StoreError {
    /// Returns whether the in-memory state was changed despite this error.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Duplicate { name, .. } => write!(f, "a tag named `{name}` already exists"),
            Self::Persistence(err) => write!(f, "change kept in memory but not saved: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Duplicate { .. } => None,
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<TagValidationError> for StoreError {
    fn from(value: TagValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Persistence(value)
    }
}

/// How a `load` call populated a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A persisted collection was read and migrated.
    Restored { records: usize, dropped: usize },
    /// Nothing was persisted yet; the store starts with `seeded` records.
    Fresh { seeded: usize },
    /// Persisted data could not be read; the store fell back to its initial
    /// collection of `seeded` records.
    Degraded { seeded: usize, reason: String },
}

/// Source of "now" in epoch milliseconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Wall clock used outside tests.
pub fn system_clock() -> Clock {
    Arc::new(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| {
                i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
            })
    })
}

/// Issues timestamp-shaped ids that never repeat within the process.
pub(crate) struct IdSource {
    last: AtomicI64,
}

impl IdSource {
    pub(crate) fn new() -> Self {
        Self {
            last: AtomicI64::new(i64::MIN),
        }
    }

    /// Returns the first candidate at or after `now` that is newer than every
    /// id issued before and not `taken` by an existing record.
    pub(crate) fn next(&self, now: i64, taken: impl Fn(&str) -> bool) -> String {
        let mut candidate = now.max(self.last.load(Ordering::Acquire).saturating_add(1));
        while taken(&candidate.to_string()) {
            candidate = candidate.saturating_add(1);
        }
        self.last.fetch_max(candidate, Ordering::AcqRel);
        candidate.to_string()
    }
}

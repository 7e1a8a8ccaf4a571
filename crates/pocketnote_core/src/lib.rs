//! Core data layer for PocketNote.
//! This crate is the single source of truth for note and tag invariants.

pub mod config;
pub mod context;
pub mod db;
pub mod derivation;
pub mod logging;
pub mod migrator;
pub mod model;
pub mod storage;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use context::{Notebook, NotebookLoad, OpenError};
pub use derivation::{
    display_title, filter_archived, filter_by_tag, resolve_tags, truncate_for_display, TagFilter,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::color::{NoteColor, DEFAULT_NOTE_COLOR};
pub use model::note::{Note, NoteDraft, NoteId};
pub use model::tag::{Tag, TagId, TagValidationError};
pub use storage::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};
pub use store::{Clock, LoadOutcome, NotesStore, StoreError, StoreResult, TagsStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

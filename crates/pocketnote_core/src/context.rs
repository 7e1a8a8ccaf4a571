//! Process-wide entry point handed to the view layer.
//!
//! # Responsibility
//! - Wire storage, logging and both stores together.
//! - Load both collections before the view layer reads them.
//!
//! # Invariants
//! - Stores are constructed once per `Notebook` and shared by `Arc`; views
//!   receive the `Notebook` (or a store handle) instead of reaching for
//!   globals.
//! - Opening never fails because of unreadable collections; only config,
//!   logging and database bootstrap errors are fatal.

use crate::config::{ConfigError, CoreConfig};
use crate::logging::{init_logging, LoggingError};
use crate::storage::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError};
use crate::store::{LoadOutcome, NotesStore, TagsStore};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Fatal errors while opening a [`Notebook`].
#[derive(Debug)]
pub enum OpenError {
    Config(ConfigError),
    Logging(LoggingError),
    DataDir(std::io::Error),
    Storage(StorageError),
}

impl Display for OpenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::DataDir(err) => write!(f, "failed to prepare data directory: {err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for OpenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::DataDir(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

/// Outcome of loading both collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookLoad {
    pub notes: LoadOutcome,
    pub tags: LoadOutcome,
}

/// Notes and tags stores sharing one storage backend.
#[derive(Clone)]
pub struct Notebook {
    notes: Arc<NotesStore>,
    tags: Arc<TagsStore>,
}

impl Notebook {
    /// Opens the durable notebook described by `config` and loads it.
    pub async fn open(config: &CoreConfig) -> Result<(Self, NotebookLoad), OpenError> {
        config.validate().map_err(OpenError::Config)?;
        if config.log_to_file {
            init_logging(&config.log_level, &config.log_dir()).map_err(OpenError::Logging)?;
        }
        let storage = open_sqlite(config.data_dir.clone(), config.db_path()).await?;
        Ok(Self::with_storage(Arc::new(storage)).await)
    }

    /// Opens an ephemeral notebook kept in process memory.
    pub async fn in_memory() -> (Self, NotebookLoad) {
        Self::with_storage(Arc::new(MemoryKeyValueStore::new())).await
    }

    /// Builds both stores over `storage` and loads them.
    pub async fn with_storage(storage: Arc<dyn KeyValueStore>) -> (Self, NotebookLoad) {
        let notebook = Self::unloaded(storage);
        let load = notebook.load().await;
        (notebook, load)
    }

    /// Builds both stores without loading; call [`Notebook::load`] next.
    pub fn unloaded(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            notes: Arc::new(NotesStore::new(Arc::clone(&storage))),
            tags: Arc::new(TagsStore::new(storage)),
        }
    }

    /// (Re)loads both collections from storage.
    pub async fn load(&self) -> NotebookLoad {
        let started_at = Instant::now();
        let tags = self.tags.load().await;
        let notes = self.notes.load().await;
        info!(
            "event=notebook_load module=core status=ok duration_ms={} notes={:?} tags={:?}",
            started_at.elapsed().as_millis(),
            notes,
            tags
        );
        NotebookLoad { notes, tags }
    }

    pub fn notes(&self) -> &Arc<NotesStore> {
        &self.notes
    }

    pub fn tags(&self) -> &Arc<TagsStore> {
        &self.tags
    }
}

/// Creates the data directory and opens the migrated database off the
/// executor threads.
async fn open_sqlite(
    data_dir: PathBuf,
    db_path: PathBuf,
) -> Result<SqliteKeyValueStore, OpenError> {
    let joined = tokio::task::spawn_blocking(move || {
        std::fs::create_dir_all(&data_dir).map_err(OpenError::DataDir)?;
        SqliteKeyValueStore::open(db_path).map_err(OpenError::Storage)
    })
    .await;

    match joined {
        Ok(result) => result,
        Err(err) => {
            error!("event=notebook_open module=core status=error error=worker_failed detail={err}");
            Err(OpenError::Storage(StorageError::Backend(format!(
                "database open worker failed: {err}"
            ))))
        }
    }
}

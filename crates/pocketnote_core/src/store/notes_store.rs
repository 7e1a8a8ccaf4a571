//! Notes store.
//!
//! # Responsibility
//! - Own the notes collection and its archive lifecycle.
//! - Persist the full collection after every mutation.
//!
//! # Invariants
//! - Unknown ids make `update`/`archive`/`unarchive`/`delete` no-ops that
//!   still write the (unchanged) collection.
//! - `update` refreshes `updated_at`; archive toggles do not.
//! - A fresh install starts with no notes.

use super::collection::{Change, Collection};
use super::{system_clock, Clock, IdSource, LoadOutcome, StoreResult};
use crate::derivation::{filter_by_tag, find_note, TagFilter};
use crate::migrator::migrate_notes;
use crate::model::note::Note;
use crate::model::tag::TagId;
use crate::storage::{KeyValueStore, NOTES_KEY};
use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::watch;

/// Canonical notes collection with write-through persistence.
pub struct NotesStore {
    notes: Collection<Note>,
    ids: IdSource,
    clock: Clock,
}

impl NotesStore {
    /// Creates an empty store persisting through `storage`.
    ///
    /// Call [`NotesStore::load`] before serving reads.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(storage, system_clock())
    }

    /// Creates a store that reads "now" from `clock`.
    pub fn with_clock(storage: Arc<dyn KeyValueStore>, clock: Clock) -> Self {
        Self {
            notes: Collection::new(NOTES_KEY, storage),
            ids: IdSource::new(),
            clock,
        }
    }

    /// Loads and migrates the persisted collection.
    ///
    /// Never fails: unreadable data is logged and the store starts empty.
    pub async fn load(&self) -> LoadOutcome {
        let key = self.notes.key();
        match self.notes.fetch().await {
            Ok(None) => {
                self.notes.publish(Vec::new());
                info!("event=store_load module=notes status=ok key={key} source=fresh records=0");
                LoadOutcome::Fresh { seeded: 0 }
            }
            Ok(Some(raw)) => {
                let migrated = migrate_notes(raw);
                let records = migrated.records.len();
                let dropped = migrated.dropped;
                let needs_rewrite = migrated.needs_rewrite();
                self.notes.publish(migrated.records);
                info!(
                    "event=store_load module=notes status=ok key={key} source=persisted records={records} dropped={dropped}"
                );
                if needs_rewrite {
                    if let Err(err) = self.notes.persist_current("load_rewrite").await {
                        warn!(
                            "event=store_load module=notes status=degraded key={key} error_code=rewrite_failed error={err}"
                        );
                    }
                }
                LoadOutcome::Restored { records, dropped }
            }
            Err(err) => {
                self.notes.publish(Vec::new());
                error!(
                    "event=store_load module=notes status=error key={key} error_code=load_failed error={err}"
                );
                LoadOutcome::Degraded {
                    seeded: 0,
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Snapshot of every note in collection order.
    pub fn notes(&self) -> Vec<Note> {
        self.notes.snapshot()
    }

    /// Receiver that observes every published change of the collection.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Note>> {
        self.notes.subscribe()
    }

    /// Appends a new active note and persists.
    ///
    /// On a persistence error the note stays in memory.
    pub async fn add(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
        tag_ids: Vec<TagId>,
        color: Option<String>,
    ) -> StoreResult<Note> {
        let title = title.into();
        let content = content.into();
        self.notes
            .mutate("add", |notes| {
                let now = (self.clock)();
                let id = self
                    .ids
                    .next(now, |candidate| notes.iter().any(|note| note.id == candidate));
                let note = Note::new(id, title, content, tag_ids, color, now);
                notes.push(note.clone());
                Ok(Change::modified(note))
            })
            .await
    }

    /// Replaces the editable fields of note `id`.
    ///
    /// Returns the updated note, or `None` when no note has that id.
    pub async fn update(
        &self,
        id: &str,
        title: impl Into<String>,
        content: impl Into<String>,
        tag_ids: Vec<TagId>,
        color: impl Into<String>,
    ) -> StoreResult<Option<Note>> {
        let title = title.into();
        let content = content.into();
        let color = color.into();
        self.notes
            .mutate("update", |notes| {
                let Some(note) = notes.iter_mut().find(|note| note.id == id) else {
                    return Ok(Change::unchanged(None));
                };
                note.title = title;
                note.content = content;
                note.tag_ids = tag_ids;
                note.color = color;
                note.updated_at = (self.clock)();
                Ok(Change::modified(Some(note.clone())))
            })
            .await
    }

    /// Removes note `id`. Returns whether a note was removed.
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        self.notes
            .mutate("delete", |notes| {
                let before = notes.len();
                notes.retain(|note| note.id != id);
                if notes.len() < before {
                    Ok(Change::modified(true))
                } else {
                    Ok(Change::unchanged(false))
                }
            })
            .await
    }

    /// Moves note `id` into the archive.
    pub async fn archive(&self, id: &str) -> StoreResult<Option<Note>> {
        self.set_archived("archive", id, true).await
    }

    /// Moves note `id` back to the active list.
    pub async fn unarchive(&self, id: &str) -> StoreResult<Option<Note>> {
        self.set_archived("unarchive", id, false).await
    }

    async fn set_archived(
        &self,
        op: &'static str,
        id: &str,
        archived: bool,
    ) -> StoreResult<Option<Note>> {
        self.notes
            .mutate(op, |notes| {
                let Some(note) = notes.iter_mut().find(|note| note.id == id) else {
                    return Ok(Change::unchanged(None));
                };
                if note.is_archived == archived {
                    return Ok(Change::unchanged(Some(note.clone())));
                }
                if archived {
                    note.archive();
                } else {
                    note.unarchive();
                }
                Ok(Change::modified(Some(note.clone())))
            })
            .await
    }

    pub fn get_by_id(&self, id: &str) -> Option<Note> {
        self.notes.read(|notes| find_note(notes, id).cloned())
    }

    /// Notes referencing `tag_id`, in collection order.
    pub fn get_by_tag(&self, tag_id: &str) -> Vec<Note> {
        let filter = TagFilter::Tag(tag_id.to_string());
        self.notes.read(|notes| filter_by_tag(notes, filter))
    }
}

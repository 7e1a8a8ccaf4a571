//! Tags store.
//!
//! # Responsibility
//! - Own the tags collection and enforce name rules on every write.
//! - Seed the starter tags on first launch.
//!
//! # Invariants
//! - Stored names are trimmed, non-empty and unique ignoring case.
//! - Deleting a tag never touches notes; their dangling ids are filtered at
//!   read time.

use super::collection::{Change, Collection};
use super::{system_clock, Clock, IdSource, LoadOutcome, StoreError, StoreResult};
use crate::derivation::find_tag;
use crate::migrator::migrate_tags;
use crate::model::tag::{normalize_tag_name, starter_tags, Tag};
use crate::storage::{KeyValueStore, TAGS_KEY};
use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::watch;

/// Canonical tags collection with write-through persistence.
pub struct TagsStore {
    tags: Collection<Tag>,
    ids: IdSource,
    clock: Clock,
}

impl TagsStore {
    /// Creates an empty store persisting through `storage`.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(storage, system_clock())
    }

    /// Creates a store that reads "now" (used for ids) from `clock`.
    pub fn with_clock(storage: Arc<dyn KeyValueStore>, clock: Clock) -> Self {
        Self {
            tags: Collection::new(TAGS_KEY, storage),
            ids: IdSource::new(),
            clock,
        }
    }

    /// Loads and migrates the persisted collection.
    ///
    /// When nothing was ever saved, the starter tags are seeded and written.
    /// When the saved data cannot be read, the starter tags are used in
    /// memory only so the unreadable blob is not overwritten by the seed.
    pub async fn load(&self) -> LoadOutcome {
        let key = self.tags.key();
        match self.tags.fetch().await {
            Ok(None) => {
                let seed = starter_tags();
                let seeded = seed.len();
                self.tags.publish(seed);
                if let Err(err) = self.tags.persist_current("seed").await {
                    warn!(
                        "event=store_load module=tags status=degraded key={key} error_code=seed_write_failed error={err}"
                    );
                }
                info!("event=store_load module=tags status=ok key={key} source=fresh records={seeded}");
                LoadOutcome::Fresh { seeded }
            }
            Ok(Some(raw)) => {
                let migrated = migrate_tags(raw);
                let records = migrated.records.len();
                let dropped = migrated.dropped;
                let needs_rewrite = migrated.needs_rewrite();
                self.tags.publish(migrated.records);
                info!(
                    "event=store_load module=tags status=ok key={key} source=persisted records={records} dropped={dropped}"
                );
                if needs_rewrite {
                    if let Err(err) = self.tags.persist_current("load_rewrite").await {
                        warn!(
                            "event=store_load module=tags status=degraded key={key} error_code=rewrite_failed error={err}"
                        );
                    }
                }
                LoadOutcome::Restored { records, dropped }
            }
            Err(err) => {
                let seed = starter_tags();
                let seeded = seed.len();
                self.tags.publish(seed);
                error!(
                    "event=store_load module=tags status=error key={key} error_code=load_failed error={err}"
                );
                LoadOutcome::Degraded {
                    seeded,
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Snapshot of every tag in collection order.
    pub fn tags(&self) -> Vec<Tag> {
        self.tags.snapshot()
    }

    /// Receiver that observes every published change of the collection.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Tag>> {
        self.tags.subscribe()
    }

    /// Creates a tag named `name` (trimmed).
    ///
    /// # Errors
    /// - `StoreError::Validation` when the name is blank.
    /// - `StoreError::Duplicate` when a tag with the same name ignoring case
    ///   exists.
    /// - `StoreError::Persistence` when the write failed; the tag is kept.
    pub async fn add(&self, name: &str) -> StoreResult<Tag> {
        let name = normalize_tag_name(name)?;
        self.tags
            .mutate("add", |tags| {
                ensure_unique(tags, &name, None)?;
                let now = (self.clock)();
                let id = self
                    .ids
                    .next(now, |candidate| tags.iter().any(|tag| tag.id == candidate));
                let tag = Tag::new(id, name);
                tags.push(tag.clone());
                Ok(Change::modified(tag))
            })
            .await
    }

    /// Renames tag `id`.
    ///
    /// Returns the tag after the call, or `None` when no tag has that id.
    /// Renaming to the current name succeeds without writing.
    pub async fn update(&self, id: &str, name: &str) -> StoreResult<Option<Tag>> {
        let name = normalize_tag_name(name)?;
        self.tags
            .mutate("update", |tags| {
                let Some(position) = tags.iter().position(|tag| tag.id == id) else {
                    return Ok(Change::unchanged(None));
                };
                ensure_unique(tags, &name, Some(id))?;
                let tag = &mut tags[position];
                if tag.name == name {
                    return Ok(Change::skipped(Some(tag.clone())));
                }
                tag.name = name;
                Ok(Change::modified(Some(tag.clone())))
            })
            .await
    }

    /// Removes tag `id`. Returns whether a tag was removed.
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        self.tags
            .mutate("delete", |tags| {
                let before = tags.len();
                tags.retain(|tag| tag.id != id);
                if tags.len() < before {
                    Ok(Change::modified(true))
                } else {
                    Ok(Change::unchanged(false))
                }
            })
            .await
    }

    pub fn get_by_id(&self, id: &str) -> Option<Tag> {
        self.tags.read(|tags| find_tag(tags, id).cloned())
    }
}

fn ensure_unique(tags: &[Tag], name: &str, except_id: Option<&str>) -> StoreResult<()> {
    let collision = tags
        .iter()
        .filter(|tag| Some(tag.id.as_str()) != except_id)
        .find(|tag| tag.name_matches(name));
    match collision {
        Some(existing) => Err(StoreError::Duplicate {
            name: name.to_string(),
            existing_id: existing.id.clone(),
        }),
        None => Ok(()),
    }
}

//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record persisted under the `notes` key.
//! - Provide archive lifecycle helpers and draft normalization.
//!
//! # Invariants
//! - `id` and `created_at` never change after creation.
//! - `tag_ids` keeps caller order and duplicates; dangling ids are allowed.
//! - `extra` carries unrecognized persisted fields through unchanged.

use crate::model::color::DEFAULT_NOTE_COLOR;
use crate::model::tag::TagId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stable note identifier (a millisecond timestamp token for new notes).
pub type NoteId = String;

/// Title shown for drafts saved without one.
pub const UNTITLED_NOTE_TITLE: &str = "Untitled note";

/// Canonical note record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub tag_ids: Vec<TagId>,
    /// Palette key, see [`crate::model::color::NoteColor`].
    pub color: String,
    pub is_archived: bool,
    /// Unix epoch milliseconds, set once.
    pub created_at: i64,
    /// Unix epoch milliseconds, refreshed by content updates.
    pub updated_at: i64,
    /// Fields written by other app versions that this version does not know.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Note {
    /// Creates an active note stamped with `now` for both timestamps.
    ///
    /// `color` falls back to the default palette key when `None`.
    pub fn new(
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
        tag_ids: Vec<TagId>,
        color: Option<String>,
        now: i64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            tag_ids,
            color: color.unwrap_or_else(|| DEFAULT_NOTE_COLOR.to_string()),
            is_archived: false,
            created_at: now,
            updated_at: now,
            extra: Map::new(),
        }
    }

    /// Returns whether `tag_id` is referenced by this note.
    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tag_ids.iter().any(|candidate| candidate == tag_id)
    }

    /// Moves the note into the archive.
    pub fn archive(&mut self) {
        self.is_archived = true;
    }

    /// Moves the note back to the active list.
    pub fn unarchive(&mut self) {
        self.is_archived = false;
    }

    /// Returns whether the note is shown in the active list.
    pub fn is_active(&self) -> bool {
        !self.is_archived
    }
}

/// Normalized editor input ready to be handed to the notes store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    /// Trims editor input and applies the untitled placeholder.
    ///
    /// Returns `None` when both fields are blank: there is nothing to save.
    pub fn from_input(title: &str, content: &str) -> Option<Self> {
        let title = title.trim();
        let content = content.trim();
        if title.is_empty() && content.is_empty() {
            return None;
        }

        let title = if title.is_empty() {
            UNTITLED_NOTE_TITLE
        } else {
            title
        };
        Some(Self {
            title: title.to_string(),
            content: content.to_string(),
        })
    }
}

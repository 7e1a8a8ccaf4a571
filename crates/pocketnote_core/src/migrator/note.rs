//! Note record migration.
//!
//! Shapes handled:
//! - v1 notes without `tagIds`.
//! - notes whose `color` stored a raw hex value instead of a palette key.
//! - notes saved before archiving existed (no `isArchived`).

use super::fields::{take_bool, take_i64, take_id, take_id_list, take_string};
use super::Migrated;
use crate::model::color::{is_raw_hex_color, DEFAULT_NOTE_COLOR};
use crate::model::note::Note;
use serde_json::Value;
use std::collections::HashSet;

/// Migrates a whole notes collection.
///
/// Records without a usable id, and repeats of an id already seen, are
/// dropped; the first occurrence wins.
pub fn migrate_notes(records: Vec<Value>) -> Migrated<Note> {
    let total = records.len();
    let mut seen_ids = HashSet::new();
    let notes: Vec<Note> = records
        .into_iter()
        .filter_map(migrate_note)
        .filter(|note| seen_ids.insert(note.id.clone()))
        .collect();

    Migrated {
        dropped: total - notes.len(),
        records: notes,
    }
}

/// Migrates one raw record, or returns `None` when it cannot form a note.
pub fn migrate_note(record: Value) -> Option<Note> {
    let Value::Object(mut fields) = record else {
        return None;
    };

    let id = take_id(&mut fields, "id")?;
    let title = take_string(&mut fields, "title").unwrap_or_default();
    let content = take_string(&mut fields, "content").unwrap_or_default();
    let tag_ids = take_id_list(&mut fields, "tagIds").unwrap_or_default();
    let color = take_string(&mut fields, "color")
        .filter(|color| !color.is_empty() && !is_raw_hex_color(color))
        .unwrap_or_else(|| DEFAULT_NOTE_COLOR.to_string());
    let is_archived = take_bool(&mut fields, "isArchived").unwrap_or(false);
    // Older ids are creation timestamps, the best guess when the field is gone.
    let created_at = take_i64(&mut fields, "createdAt")
        .or_else(|| id.parse::<i64>().ok())
        .unwrap_or(0);
    let updated_at = take_i64(&mut fields, "updatedAt").unwrap_or(created_at);

    Some(Note {
        id,
        title,
        content,
        tag_ids,
        color,
        is_archived,
        created_at,
        updated_at,
        extra: fields,
    })
}

//! Tag record migration.
//!
//! Older builds let blank names reach storage; those records are dropped
//! here and the caller rewrites the collection so they do not come back.

use super::fields::{take_id, take_string};
use super::Migrated;
use crate::model::tag::{normalize_tag_name, Tag};
use serde_json::Value;
use std::collections::HashSet;

/// Migrates a whole tags collection.
///
/// Besides unusable records, a record is dropped when its id or its
/// case-insensitive name repeats an earlier record.
pub fn migrate_tags(records: Vec<Value>) -> Migrated<Tag> {
    let total = records.len();
    let mut seen_ids = HashSet::new();
    let mut seen_names = HashSet::new();
    let tags: Vec<Tag> = records
        .into_iter()
        .filter_map(migrate_tag)
        .filter(|tag| {
            let name_key = tag.name.to_lowercase();
            if seen_names.contains(&name_key) || seen_ids.contains(&tag.id) {
                return false;
            }
            seen_names.insert(name_key);
            seen_ids.insert(tag.id.clone());
            true
        })
        .collect();

    Migrated {
        dropped: total - tags.len(),
        records: tags,
    }
}

/// Migrates one raw record, or returns `None` when it cannot form a tag.
pub fn migrate_tag(record: Value) -> Option<Tag> {
    let Value::Object(mut fields) = record else {
        return None;
    };

    let id = take_id(&mut fields, "id")?;
    let name = take_string(&mut fields, "name")
        .and_then(|name| normalize_tag_name(&name).ok())?;
    let color = take_string(&mut fields, "color");

    Some(Tag {
        id,
        name,
        color,
        extra: fields,
    })
}

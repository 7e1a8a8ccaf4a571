//! Tag domain model.
//!
//! # Responsibility
//! - Define the canonical tag record persisted under the `tags` key.
//! - Validate and normalize tag names.
//! - Provide the starter tag set used for first launch.
//!
//! # Invariants
//! - Stored names are trimmed and never empty.
//! - Name comparison for uniqueness is case-insensitive.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable tag identifier.
pub type TagId = String;

/// Canonical tag record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    /// Display color (hex) carried by starter tags and older data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tag {
    /// Creates a tag from an already-validated name.
    pub fn new(id: TagId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: None,
            extra: Map::new(),
        }
    }

    /// Returns whether this tag's name equals `other` ignoring case.
    pub fn name_matches(&self, other: &str) -> bool {
        names_collide(&self.name, other)
    }
}

/// Validation errors for caller-supplied tag data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValidationError {
    /// Name is empty after trimming.
    EmptyName,
}

impl Display for TagValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "tag name cannot be empty"),
        }
    }
}

impl Error for TagValidationError {}

/// Trims a tag name and rejects blank input.
pub fn normalize_tag_name(name: &str) -> Result<String, TagValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TagValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Case-insensitive name equality used for the uniqueness invariant.
pub fn names_collide(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}

/// Tags seeded on first launch when no tag collection was ever saved.
pub fn starter_tags() -> Vec<Tag> {
    [
        ("1", "Work", "#ff7675"),
        ("2", "Personal", "#74b9ff"),
        ("3", "Ideas", "#55efc4"),
        ("4", "Important", "#ffeaa7"),
    ]
    .into_iter()
    .map(|(id, name, color)| Tag {
        color: Some(color.to_string()),
        ..Tag::new(id.to_string(), name)
    })
    .collect()
}

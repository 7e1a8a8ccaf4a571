//! Forward migration of persisted collections.
//!
//! # Responsibility
//! - Decode a raw persisted blob into untyped records.
//! - Map every record of any earlier app version onto the current entity
//!   shape, filling documented defaults.
//! - Drop records that cannot form a valid entity and report how many were
//!   dropped so the caller can rewrite the stored blob.
//!
//! # Invariants
//! - Record mapping never fails; malformed fields fall back to defaults.
//! - Unrecognized fields are carried through in the entity's `extra` map.
//! - Migrating already-migrated output is a no-op.

use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod fields;
pub mod note;
pub mod tag;

pub use note::{migrate_note, migrate_notes};
pub use tag::{migrate_tag, migrate_tags};

/// Result of migrating one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Migrated<T> {
    /// Records in persisted order, converted to the current shape.
    pub records: Vec<T>,
    /// Number of input records that were discarded.
    pub dropped: usize,
}

impl<T> Migrated<T> {
    /// Returns whether the stored blob no longer matches `records` in length
    /// and must be rewritten.
    pub fn needs_rewrite(&self) -> bool {
        self.dropped > 0
    }
}

/// A persisted blob that is not a JSON array at all.
#[derive(Debug)]
pub enum DecodeError {
    Json(serde_json::Error),
    NotAnArray(&'static str),
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "persisted collection is not valid JSON: {err}"),
            Self::NotAnArray(kind) => {
                write!(f, "persisted collection is a JSON {kind}, expected an array")
            }
        }
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::NotAnArray(_) => None,
        }
    }
}

/// Parses a stored blob into untyped records.
pub fn decode_records(raw: &str) -> Result<Vec<Value>, DecodeError> {
    match serde_json::from_str::<Value>(raw).map_err(DecodeError::Json)? {
        Value::Array(records) => Ok(records),
        Value::Null => Err(DecodeError::NotAnArray("null")),
        Value::Bool(_) => Err(DecodeError::NotAnArray("boolean")),
        Value::Number(_) => Err(DecodeError::NotAnArray("number")),
        Value::String(_) => Err(DecodeError::NotAnArray("string")),
        Value::Object(_) => Err(DecodeError::NotAnArray("object")),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_records, DecodeError};

    #[test]
    fn decode_accepts_arrays_of_anything() {
        let records = decode_records(r#"[{"id":"1"}, 3, null]"#).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn decode_rejects_non_array_and_invalid_json() {
        assert!(matches!(
            decode_records(r#"{"id":"1"}"#),
            Err(DecodeError::NotAnArray("object"))
        ));
        assert!(matches!(decode_records("[{"), Err(DecodeError::Json(_))));
    }
}

//! Domain model for notes and tags.
//!
//! # Responsibility
//! - Define the canonical entity shapes held by the stores.
//! - Own entity-level invariants (tag name rules, palette keys).
//!
//! # Invariants
//! - Entity ids are opaque strings and never reused within a collection.
//! - Serialized field names are camelCase to stay compatible with existing
//!   persisted blobs.
//! - Deletion is a hard delete; there are no tombstones.

pub mod color;
pub mod note;
pub mod tag;

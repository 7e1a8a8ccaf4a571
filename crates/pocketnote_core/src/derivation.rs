//! Pure queries over note and tag collections.
//!
//! # Responsibility
//! - Provide the filters and lookups views render from.
//! - Estimate how much note content fits on a fixed-size card.
//!
//! # Invariants
//! - Functions never mutate or persist; same input, same output.
//! - Filters keep the original collection order.

use crate::model::note::Note;
use crate::model::tag::Tag;

/// Title shown for notes whose stored title is blank.
pub const UNTITLED_DISPLAY_TITLE: &str = "Untitled Note";

const AVG_GLYPH_WIDTH: f64 = 10.0;
const CARD_HORIZONTAL_PADDING: f64 = 32.0;
const CARD_TITLE_HEIGHT: f64 = 24.0;
const CARD_VERTICAL_PADDING: f64 = 24.0;
const CARD_LINE_HEIGHT: f64 = 20.0;
const CARD_MAX_CHARS: usize = 130;
const ELLIPSIS: &str = "...";

/// Tag filter selected in the notes list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagFilter {
    All,
    Tag(String),
}

impl From<&str> for TagFilter {
    /// `"all"` selects every note; anything else is a tag id.
    fn from(value: &str) -> Self {
        if value == "all" {
            Self::All
        } else {
            Self::Tag(value.to_string())
        }
    }
}

impl From<String> for TagFilter {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Option<&str>> for TagFilter {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Self::All, Self::from)
    }
}

/// Notes whose archive flag equals `archived`.
pub fn filter_archived(notes: &[Note], archived: bool) -> Vec<Note> {
    notes
        .iter()
        .filter(|note| note.is_archived == archived)
        .cloned()
        .collect()
}

/// Notes matching `filter`; [`TagFilter::All`] returns the input unchanged.
pub fn filter_by_tag(notes: &[Note], filter: impl Into<TagFilter>) -> Vec<Note> {
    match filter.into() {
        TagFilter::All => notes.to_vec(),
        TagFilter::Tag(tag_id) => notes
            .iter()
            .filter(|note| note.has_tag(&tag_id))
            .cloned()
            .collect(),
    }
}

pub fn find_note<'a>(notes: &'a [Note], id: &str) -> Option<&'a Note> {
    notes.iter().find(|note| note.id == id)
}

pub fn find_tag<'a>(tags: &'a [Tag], id: &str) -> Option<&'a Tag> {
    tags.iter().find(|tag| tag.id == id)
}

/// Tags referenced by `note`, in `tag_ids` order, skipping dangling ids.
pub fn resolve_tags<'a>(note: &Note, tags: &'a [Tag]) -> Vec<&'a Tag> {
    note.tag_ids
        .iter()
        .filter_map(|tag_id| find_tag(tags, tag_id))
        .collect()
}

/// Title for display, with a placeholder for empty titles.
///
/// Whitespace-only titles are shown as stored.
pub fn display_title(note: &Note) -> &str {
    if note.title.is_empty() {
        UNTITLED_DISPLAY_TITLE
    } else {
        note.title.as_str()
    }
}

/// Character budget of a card measuring `width` x `height` layout units.
///
/// This is a glyph-width heuristic, not text layout.
pub fn display_char_budget(width: f64, height: f64) -> usize {
    let chars_per_line = whole_units((width - CARD_HORIZONTAL_PADDING) / AVG_GLYPH_WIDTH);
    let available_height = height - CARD_TITLE_HEIGHT - CARD_VERTICAL_PADDING;
    let max_lines = whole_units(available_height / CARD_LINE_HEIGHT);
    chars_per_line
        .saturating_mul(max_lines)
        .min(CARD_MAX_CHARS)
}

/// Truncates `content` to what fits on a card, ending in `...` when cut.
pub fn truncate_for_display(content: &str, width: f64, height: f64) -> String {
    let budget = display_char_budget(width, height);
    if content.chars().count() <= budget {
        return content.to_string();
    }

    let keep = budget.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = content.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

fn whole_units(value: f64) -> usize {
    if value.is_finite() && value > 0.0 {
        value.floor() as usize
    } else {
        0
    }
}

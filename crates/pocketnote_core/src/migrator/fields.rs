//! Defensive field readers over untyped records.
//!
//! Every reader removes the field it inspects from the map, so whatever is
//! left afterwards is the set of unrecognized fields to pass through.

use serde_json::{Map, Value};

/// Reads an identifier: non-empty strings as-is, integers as decimal text.
pub(super) fn take_id(record: &mut Map<String, Value>, field: &str) -> Option<String> {
    match record.remove(field)? {
        Value::String(text) if !text.is_empty() => Some(text),
        Value::Number(number) if number.is_i64() || number.is_u64() => Some(number.to_string()),
        _ => None,
    }
}

/// Reads a string field, `None` for absent or non-string values.
pub(super) fn take_string(record: &mut Map<String, Value>, field: &str) -> Option<String> {
    match record.remove(field)? {
        Value::String(text) => Some(text),
        _ => None,
    }
}

/// Reads an integer field; floats are truncated toward zero.
pub(super) fn take_i64(record: &mut Map<String, Value>, field: &str) -> Option<i64> {
    match record.remove(field)? {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|value| value.is_finite()).map(|value| value as i64)),
        _ => None,
    }
}

/// Reads a boolean field, `None` for anything but `true`/`false`.
pub(super) fn take_bool(record: &mut Map<String, Value>, field: &str) -> Option<bool> {
    match record.remove(field)? {
        Value::Bool(flag) => Some(flag),
        _ => None,
    }
}

/// Reads a list of identifiers, keeping string and integer elements.
pub(super) fn take_id_list(record: &mut Map<String, Value>, field: &str) -> Option<Vec<String>> {
    match record.remove(field)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(text),
                    Value::Number(number) if number.is_i64() || number.is_u64() => {
                        Some(number.to_string())
                    }
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{take_i64, take_id, take_id_list};
    use serde_json::{json, Map, Value};

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test input must be an object"),
        }
    }

    #[test]
    fn id_accepts_strings_and_integers_and_consumes_field() {
        let mut map = record(json!({"id": 17, "other": true}));
        assert_eq!(take_id(&mut map, "id").as_deref(), Some("17"));
        assert!(!map.contains_key("id"));
        assert!(map.contains_key("other"));

        let mut map = record(json!({"id": ""}));
        assert_eq!(take_id(&mut map, "id"), None);
        let mut map = record(json!({"id": 1.5}));
        assert_eq!(take_id(&mut map, "id"), None);
    }

    #[test]
    fn integer_reader_truncates_floats() {
        let mut map = record(json!({"at": 1700000000123.9, "bad": "x"}));
        assert_eq!(take_i64(&mut map, "at"), Some(1_700_000_000_123));
        assert_eq!(take_i64(&mut map, "bad"), None);
    }

    #[test]
    fn id_list_keeps_order_and_skips_junk() {
        let mut map = record(json!({"tagIds": ["b", 2, null, {"x": 1}, "b"]}));
        assert_eq!(
            take_id_list(&mut map, "tagIds"),
            Some(vec!["b".to_string(), "2".to_string(), "b".to_string()])
        );
    }
}

//! Loosely-typed JSONB id arrays.
//!
//! Project→category references are stored as a JSONB array whose elements
//! may be JSON numbers (`[3, 7]`) or numeric JSON strings (`["3", "7"]`),
//! depending on which client wrote the row. Every reader must accept both
//! encodings; the helpers here centralize that rule.

use serde_json::Value;

use crate::types::DbId;

/// Extract the ids from a loose JSONB array, accepting numbers and numeric
/// strings. Non-numeric elements are skipped; order is preserved and
/// duplicates are kept.
pub fn parse_loose_id_array(value: &Value) -> Vec<DbId> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<DbId>().ok(),
            _ => None,
        })
        .collect()
}

/// The two JSONB element text forms an id can take: `7` and `"7"`.
///
/// Matches the SQL side, where `jsonb_array_elements(...)::text` yields the
/// bare digits for a number element and a double-quoted token for a string
/// element.
pub fn jsonb_text_encodings(id: DbId) -> [String; 2] {
    [id.to_string(), format!("\"{id}\"")]
}

/// Flattened text encodings for a whole id set, for `= ANY($n)` binds.
pub fn jsonb_text_encodings_all(ids: &[DbId]) -> Vec<String> {
    ids.iter()
        .flat_map(|id| jsonb_text_encodings(*id))
        .collect()
}

//! Record helpers
//!
//! A record is any JSON object (`serde_json::Value::Object`). One of its
//! top-level scalar fields is the primary key; the key rendered as text is
//! the record id used everywhere else (manifest, indexes, caches).

mod path;

pub use path::{get_nested_value, scalar_leaves};

use serde_json::Value;

/// Record id used for a `null` primary key.
pub const NULL_RECORD_ID: &str = "null";

/// Renders a primary-key value as a record id.
///
/// Strings map to themselves, numbers and booleans to their JSON text,
/// `null` to [`NULL_RECORD_ID`]. Objects and arrays have no id.
pub fn record_id(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(NULL_RECORD_ID.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Returns the record id of `record` under `primary_key`, if it has one.
pub fn record_id_of(record: &Value, primary_key: &str) -> Option<String> {
    record.get(primary_key).and_then(record_id)
}

/// Returns true for values that are observed as-is by the field walk.
pub fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_id_forms() {
        assert_eq!(record_id(&json!("u1")), Some("u1".to_string()));
        assert_eq!(record_id(&json!(42)), Some("42".to_string()));
        assert_eq!(record_id(&json!(1.5)), Some("1.5".to_string()));
        assert_eq!(record_id(&json!(true)), Some("true".to_string()));
        assert_eq!(record_id(&Value::Null), Some("null".to_string()));
        assert_eq!(record_id(&json!([1])), None);
        assert_eq!(record_id(&json!({"a": 1})), None);
    }

    #[test]
    fn test_record_id_of_missing_field() {
        let record = json!({"name": "Alice"});
        assert_eq!(record_id_of(&record, "id"), None);
        assert_eq!(record_id_of(&json!({"id": 7}), "id"), Some("7".to_string()));
    }
}

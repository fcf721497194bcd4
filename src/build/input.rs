//! Input extraction
//!
//! The build accepts either a bare array of records or an object wrapping
//! them, e.g. `{"users": [...], "total": 3}`. For an object the array-valued
//! property with the most elements wins; the first one in document order
//! on ties.

use std::path::Path;

use serde_json::Value;

use super::errors::{BuildError, BuildResult};
use super::files;

/// Pulls the record array out of a parsed input document
pub fn extract_records(document: Value) -> BuildResult<Vec<Value>> {
    match document {
        Value::Array(records) => Ok(records),
        Value::Object(map) => {
            let mut best: Option<Vec<Value>> = None;
            for (_, value) in map {
                if let Value::Array(items) = value {
                    if best.as_ref().map_or(true, |b| items.len() > b.len()) {
                        best = Some(items);
                    }
                }
            }
            best.ok_or(BuildError::InvalidInputShape("an object without array properties"))
        }
        other => Err(BuildError::InvalidInputShape(kind_of(&other))),
    }
}

/// Reads an input file and extracts its records
pub fn read_input(path: &Path) -> BuildResult<Vec<Value>> {
    let document: Value = files::read_json(path)?;
    extract_records(document)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array() {
        let records = extract_records(json!([{"id": 1}, {"id": 2}])).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_largest_array_property_wins() {
        let document = json!({
            "tags": ["a"],
            "users": [{"id": 1}, {"id": 2}, {"id": 3}],
            "total": 3
        });
        let records = extract_records(document).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], json!({"id": 1}));
    }

    #[test]
    fn test_tie_picks_first_property() {
        let document = json!({"zeta": [{"id": "first"}], "alpha": [{"id": "second"}]});
        let records = extract_records(document).unwrap();
        assert_eq!(records[0]["id"], "first");
    }

    #[test]
    fn test_tie_follows_file_order() {
        let document: Value =
            serde_json::from_str(r#"{"users": [{"id": 1}], "admins": [{"id": 2}]}"#).unwrap();
        let records = extract_records(document).unwrap();
        assert_eq!(records[0]["id"], 1);
    }

    #[test]
    fn test_rejects_scalars_and_plain_objects() {
        assert!(matches!(
            extract_records(json!("nope")),
            Err(BuildError::InvalidInputShape("a string"))
        ));
        assert!(matches!(
            extract_records(json!({"count": 1})),
            Err(BuildError::InvalidInputShape(_))
        ));
    }
}

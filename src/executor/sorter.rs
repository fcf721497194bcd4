//! Result sorting
//!
//! Stable multi-key sort over nested field values. Keys apply in order;
//! ties on one key fall through to the next, and records tied on every
//! key keep their incoming order.

use std::cmp::Ordering;

use serde_json::Value;

use super::filters::number_cmp;
use crate::planner::{SortDirection, SortKey};
use crate::record::get_nested_value;

/// Sorts result records
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts `records` by `keys`. Sort keys are resolved once per record.
    pub fn sort(records: Vec<Value>, keys: &[SortKey]) -> Vec<Value> {
        if keys.is_empty() {
            return records;
        }

        let mut keyed: Vec<(Vec<Option<Value>>, Value)> = records
            .into_iter()
            .map(|record| {
                let values = keys
                    .iter()
                    .map(|k| get_nested_value(&record, &k.field).map(|v| v.into_owned()))
                    .collect();
                (values, record)
            })
            .collect();

        keyed.sort_by(|(a, _), (b, _)| {
            keys.iter()
                .zip(a.iter().zip(b.iter()))
                .map(|(key, (av, bv))| {
                    let ordering = Self::compare_values(av.as_ref(), bv.as_ref());
                    match key.direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                })
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        keyed.into_iter().map(|(_, record)| record).collect()
    }

    /// Compares two JSON values for sorting.
    ///
    /// Ordering rules:
    /// - missing < null < bool < number < string < array < object
    /// - numbers numerically, strings lexicographically
    /// - arrays and objects compare equal to their own kind
    pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a_val), Some(b_val)) => {
                let type_order = |v: &Value| -> u8 {
                    match v {
                        Value::Null => 0,
                        Value::Bool(_) => 1,
                        Value::Number(_) => 2,
                        Value::String(_) => 3,
                        Value::Array(_) => 4,
                        Value::Object(_) => 5,
                    }
                };

                let a_type = type_order(a_val);
                let b_type = type_order(b_val);
                if a_type != b_type {
                    return a_type.cmp(&b_type);
                }

                match (a_val, b_val) {
                    (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
                    (Value::Number(x), Value::Number(y)) => {
                        number_cmp(x, y).unwrap_or(Ordering::Equal)
                    }
                    (Value::String(x), Value::String(y)) => x.cmp(y),
                    _ => Ordering::Equal,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(records: &[Value]) -> Vec<&str> {
        records.iter().map(|r| r["id"].as_str().unwrap()).collect()
    }

    #[test]
    fn test_sort_ascending_and_descending() {
        let records = vec![
            json!({"id": "c", "age": 30}),
            json!({"id": "a", "age": 20}),
            json!({"id": "b", "age": 25}),
        ];

        let asc = ResultSorter::sort(records.clone(), &[SortKey::asc("age")]);
        assert_eq!(ids(&asc), vec!["a", "b", "c"]);

        let desc = ResultSorter::sort(records, &[SortKey::desc("age")]);
        assert_eq!(ids(&desc), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_ties_fall_through_to_next_key() {
        let records = vec![
            json!({"id": "1", "team": "b", "name": "zed"}),
            json!({"id": "2", "team": "a", "name": "max"}),
            json!({"id": "3", "team": "b", "name": "amy"}),
            json!({"id": "4", "team": "a", "name": "bob"}),
        ];

        let sorted = ResultSorter::sort(records, &[SortKey::asc("team"), SortKey::desc("name")]);
        assert_eq!(ids(&sorted), vec!["2", "4", "1", "3"]);
    }

    #[test]
    fn test_sort_stable_on_full_ties() {
        let records = vec![
            json!({"id": "a", "age": 25}),
            json!({"id": "b", "age": 25}),
            json!({"id": "c", "age": 25}),
        ];

        let sorted = ResultSorter::sort(records, &[SortKey::asc("age")]);
        assert_eq!(ids(&sorted), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_missing_values_sort_first_ascending() {
        let records = vec![
            json!({"id": "x", "profile": {"rank": 2}}),
            json!({"id": "y"}),
            json!({"id": "z", "profile": {"rank": 1}}),
        ];

        let sorted = ResultSorter::sort(records, &[SortKey::asc("profile.rank")]);
        assert_eq!(ids(&sorted), vec!["y", "z", "x"]);
    }

    #[test]
    fn test_mixed_integer_and_float() {
        let records = vec![
            json!({"id": "a", "score": 2.5}),
            json!({"id": "b", "score": 2}),
            json!({"id": "c", "score": 10}),
        ];

        let sorted = ResultSorter::sort(records, &[SortKey::asc("score")]);
        assert_eq!(ids(&sorted), vec!["b", "a", "c"]);
    }
}

//! Predicate evaluation
//!
//! One set of rules serves both resolution paths:
//! - record path: the value found by dot-path lookup in a loaded record
//! - index path: a single entry value from a field index
//!
//! Rules:
//! - a missing value never matches, not even NOT_EQUALS
//! - objects never match
//! - on an array, CONTAINS is membership; any other operator matches when
//!   some element matches
//! - numbers compare numerically; ordering operators need two numbers
//! - CONTAINS, STARTS_WITH and ENDS_WITH on strings are substring tests
//!
//! Index-side CONTAINS also accepts substring hits on string entries, so an
//! index lookup may over-approximate an array-membership test. Candidates
//! are always re-checked against the record path.

use std::cmp::Ordering;

use serde_json::{Number, Value};

use crate::planner::{Filter, FilterOperator};
use crate::record::{get_nested_value, scalar_leaves};

/// Evaluates filters against records and index entries
pub struct PredicateFilter;

impl PredicateFilter {
    /// Checks a record against every filter (AND semantics)
    pub fn matches(record: &Value, filters: &[Filter]) -> bool {
        filters.iter().all(|f| Self::matches_filter(record, f))
    }

    /// Checks a record against one filter
    pub fn matches_filter(record: &Value, filter: &Filter) -> bool {
        match get_nested_value(record, &filter.field) {
            Some(actual) => Self::matches_value(&actual, filter.operator, &filter.value),
            None => false,
        }
    }

    /// Evaluates an operator against a value found in a record
    pub fn matches_value(actual: &Value, operator: FilterOperator, expected: &Value) -> bool {
        match actual {
            Value::Object(_) => false,
            Value::Array(_) => {
                let leaves = scalar_leaves(actual);
                if operator == FilterOperator::Contains {
                    leaves.into_iter().any(|leaf| values_equal(leaf, expected))
                } else {
                    leaves
                        .into_iter()
                        .any(|leaf| Self::matches_scalar(leaf, operator, expected))
                }
            }
            scalar => Self::matches_scalar(scalar, operator, expected),
        }
    }

    /// Evaluates an operator against one stored index entry value
    pub fn matches_index_entry(entry: &Value, operator: FilterOperator, expected: &Value) -> bool {
        if operator == FilterOperator::Contains {
            return values_equal(entry, expected) || string_contains(entry, expected);
        }
        Self::matches_scalar(entry, operator, expected)
    }

    fn matches_scalar(actual: &Value, operator: FilterOperator, expected: &Value) -> bool {
        if actual.is_object() || actual.is_array() {
            return false;
        }

        match operator {
            FilterOperator::Equals => values_equal(actual, expected),
            FilterOperator::NotEquals => !values_equal(actual, expected),
            FilterOperator::GreaterThan => compare_numbers(actual, expected) == Some(Ordering::Greater),
            FilterOperator::LessThan => compare_numbers(actual, expected) == Some(Ordering::Less),
            FilterOperator::GreaterThanOrEqual => matches!(
                compare_numbers(actual, expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOperator::LessThanOrEqual => matches!(
                compare_numbers(actual, expected),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOperator::In => expected
                .as_array()
                .is_some_and(|members| members.iter().any(|m| values_equal(actual, m))),
            FilterOperator::Contains => match actual {
                Value::String(_) => string_contains(actual, expected),
                _ => values_equal(actual, expected),
            },
            FilterOperator::StartsWith => match (actual, expected) {
                (Value::String(a), Value::String(e)) => a.starts_with(e.as_str()),
                _ => false,
            },
            FilterOperator::EndsWith => match (actual, expected) {
                (Value::String(a), Value::String(e)) => a.ends_with(e.as_str()),
                _ => false,
            },
        }
    }
}

/// JSON equality with numbers compared by value (`1` equals `1.0`)
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => number_cmp(x, y) == Some(Ordering::Equal),
        _ => a == b,
    }
}

/// Orders two numbers; `None` if either is not a number
pub fn compare_numbers(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => number_cmp(x, y),
        _ => None,
    }
}

pub(crate) fn number_cmp(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return Some(x.cmp(&y));
    }
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

fn string_contains(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::String(a), Value::String(e)) => a.contains(e.as_str()),
        _ => false,
    }
}

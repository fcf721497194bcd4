//! Query AST
//!
//! Filters, sort keys and pagination options as callers submit them. The
//! JSON form matches the persisted-layout conventions: operators are
//! `SCREAMING_SNAKE_CASE`, sort directions `asc`/`desc`, keys camelCase.
//!
//! ```json
//! {
//!   "filters": [{"field": "age", "operator": "GREATER_THAN", "value": 26}],
//!   "options": {"sort": [{"field": "age", "direction": "desc"}], "limit": 10}
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    /// Actual value equals one member of the expected array
    In,
    /// Array membership, or substring for strings
    Contains,
    StartsWith,
    EndsWith,
}

impl FilterOperator {
    /// Returns the operator name used in logs and explain output
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "EQUALS",
            FilterOperator::NotEquals => "NOT_EQUALS",
            FilterOperator::GreaterThan => "GREATER_THAN",
            FilterOperator::LessThan => "LESS_THAN",
            FilterOperator::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            FilterOperator::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            FilterOperator::In => "IN",
            FilterOperator::Contains => "CONTAINS",
            FilterOperator::StartsWith => "STARTS_WITH",
            FilterOperator::EndsWith => "ENDS_WITH",
        }
    }

    /// Returns true for the four ordering operators
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            FilterOperator::GreaterThan
                | FilterOperator::LessThan
                | FilterOperator::GreaterThanOrEqual
                | FilterOperator::LessThanOrEqual
        )
    }
}

/// A single predicate: `field operator value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Dot-separated field path
    pub field: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::Equals, value)
    }

    pub fn not_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::NotEquals, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::GreaterThan, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::LessThan, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::GreaterThanOrEqual, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::LessThanOrEqual, value)
    }

    /// Matches when the field equals any of `values`
    pub fn is_in<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        Self::new(field, FilterOperator::In, Value::Array(values))
    }

    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::Contains, value)
    }

    pub fn starts_with(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::StartsWith, prefix.into())
    }

    pub fn ends_with(field: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::EndsWith, suffix.into())
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Dot-separated field path
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Sorting and pagination
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
    /// Applied in order; later keys break ties of earlier ones
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortKey>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Appends a sort key
    pub fn with_sort(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }
}

/// A complete query: filters combined with AND, plus options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub options: QueryOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_wire_names() {
        let op: FilterOperator = serde_json::from_value(json!("GREATER_THAN_OR_EQUAL")).unwrap();
        assert_eq!(op, FilterOperator::GreaterThanOrEqual);
        assert_eq!(serde_json::to_value(FilterOperator::In).unwrap(), json!("IN"));
        assert_eq!(FilterOperator::StartsWith.as_str(), "STARTS_WITH");
        assert!(FilterOperator::LessThan.is_comparison());
        assert!(!FilterOperator::Contains.is_comparison());
    }

    #[test]
    fn test_request_parses_with_defaults() {
        let request: QueryRequest = serde_json::from_value(json!({
            "filters": [{"field": "status", "operator": "EQUALS", "value": "active"}],
            "options": {"sort": [{"field": "age"}], "limit": 5}
        }))
        .unwrap();

        assert_eq!(request.filters, vec![Filter::eq("status", "active")]);
        assert_eq!(request.options.limit, Some(5));
        assert_eq!(request.options.offset, 0);
        assert_eq!(request.options.sort, vec![SortKey::asc("age")]);

        let empty: QueryRequest = serde_json::from_value(json!({})).unwrap();
        assert!(empty.filters.is_empty());
    }

    #[test]
    fn test_in_filter_builds_array() {
        let filter = Filter::is_in("status", ["active", "pending"]);
        assert_eq!(filter.operator, FilterOperator::In);
        assert_eq!(filter.value, json!(["active", "pending"]));
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let parsed: Result<Filter, _> =
            serde_json::from_value(json!({"field": "a", "operator": "LIKE", "value": 1}));
        assert!(parsed.is_err());
    }
}

//! Query results and pagination

use serde::Serialize;
use serde_json::Value;

use crate::planner::QueryOptions;

/// Result of one query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// The requested page, in sort order
    pub records: Vec<Value>,
    /// Matches before pagination
    pub total_count: usize,
    /// True when a limit was set and more matches follow this page
    pub has_more: bool,
    /// Wall time spent in the engine, in milliseconds
    pub execution_time: f64,
}

impl QueryResult {
    /// Cuts the page described by `options` out of the sorted, filtered records
    pub fn paginate(records: Vec<Value>, options: &QueryOptions, execution_time: f64) -> Self {
        let total_count = records.len();
        let has_more = options
            .limit
            .is_some_and(|limit| options.offset.saturating_add(limit) < total_count);

        let page = records
            .into_iter()
            .skip(options.offset)
            .take(options.limit.unwrap_or(usize::MAX))
            .collect();

        Self {
            records: page,
            total_count,
            has_more,
            execution_time,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

//! Query planner
//!
//! Assigns each filter a resolution strategy from database metadata:
//! `IndexLookup` when the field has an index, `FullScan` otherwise.
//!
//! Index lookups are ordered before full scans (stable within each
//! group). Results do not depend on filter order since candidate sets
//! are intersected, but an early lookup can empty the candidate set
//! and skip a scan, or shrink what the scan must load.
//!
//! Planning is deterministic: same metadata and filters, same plan.

use serde::Serialize;

use crate::index::DatabaseMetadata;

use super::ast::Filter;

/// How a single filter's candidate set is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionStrategy {
    /// Union of matching entries in the field's inverted index
    IndexLookup,
    /// Load records and evaluate the predicate directly
    FullScan,
}

impl ResolutionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStrategy::IndexLookup => "INDEX_LOOKUP",
            ResolutionStrategy::FullScan => "FULL_SCAN",
        }
    }
}

/// A filter with its chosen strategy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterPlan {
    pub filter: Filter,
    pub strategy: ResolutionStrategy,
}

/// Immutable query plan (no runtime state)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryPlan {
    /// Filters in evaluation order
    pub steps: Vec<FilterPlan>,
}

impl QueryPlan {
    /// True when no filters were given; every record is a candidate
    pub fn is_unfiltered(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn index_lookups(&self) -> usize {
        self.count(ResolutionStrategy::IndexLookup)
    }

    pub fn full_scans(&self) -> usize {
        self.count(ResolutionStrategy::FullScan)
    }

    fn count(&self, strategy: ResolutionStrategy) -> usize {
        self.steps.iter().filter(|s| s.strategy == strategy).count()
    }
}

/// Query planner over a database's metadata
pub struct QueryPlanner<'a> {
    metadata: &'a DatabaseMetadata,
}

impl<'a> QueryPlanner<'a> {
    pub fn new(metadata: &'a DatabaseMetadata) -> Self {
        Self { metadata }
    }

    /// Plans `filters`, keeping every filter exactly once
    pub fn plan(&self, filters: &[Filter]) -> QueryPlan {
        let mut steps: Vec<FilterPlan> = filters
            .iter()
            .map(|filter| FilterPlan {
                strategy: self.strategy_for(&filter.field),
                filter: filter.clone(),
            })
            .collect();

        // stable: keeps caller order within each strategy
        steps.sort_by_key(|step| step.strategy == ResolutionStrategy::FullScan);

        QueryPlan { steps }
    }

    fn strategy_for(&self, field: &str) -> ResolutionStrategy {
        if self.metadata.is_indexed(field) {
            ResolutionStrategy::IndexLookup
        } else {
            ResolutionStrategy::FullScan
        }
    }
}

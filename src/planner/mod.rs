//! Query planner subsystem for shardb
//!
//! Parses nothing and loads nothing: it turns a filter list into a
//! per-filter resolution strategy using only database metadata. The
//! executor carries the plan out.

mod ast;
mod explain;
mod planner;

pub use ast::{Filter, FilterOperator, QueryOptions, QueryRequest, SortDirection, SortKey};
pub use explain::{ExplainPlan, ExplainStep};
pub use planner::{FilterPlan, QueryPlan, QueryPlanner, ResolutionStrategy};

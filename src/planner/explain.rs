//! Explain output for `shardb query --explain`

use std::fmt;

use serde::Serialize;

use super::planner::QueryPlan;

/// One line of an explain plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainStep {
    pub field: String,
    pub operator: String,
    pub strategy: String,
}

/// Deterministic, human-readable description of a plan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainPlan {
    pub steps: Vec<ExplainStep>,
    pub index_lookups: usize,
    pub full_scans: usize,
}

impl ExplainPlan {
    pub fn from_plan(plan: &QueryPlan) -> Self {
        let steps = plan
            .steps
            .iter()
            .map(|step| ExplainStep {
                field: step.filter.field.clone(),
                operator: step.filter.operator.as_str().to_string(),
                strategy: step.strategy.as_str().to_string(),
            })
            .collect();

        Self {
            steps,
            index_lookups: plan.index_lookups(),
            full_scans: plan.full_scans(),
        }
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return writeln!(f, "ALL_RECORDS");
        }
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(f, "{}. {} {} via {}", i + 1, step.field, step.operator, step.strategy)?;
        }
        Ok(())
    }
}

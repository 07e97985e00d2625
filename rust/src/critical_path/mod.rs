//! Critical path analysis over a task dependency graph.
//!
//! A forward pass computes earliest start/finish for every task, a backward
//! pass anchored at the project finish computes latest start/finish, and slack
//! is the difference. The reported critical path is the longest chain of
//! zero-slack tasks linked by driving dependencies.

mod analyzer;
pub(crate) mod calculation;
pub(crate) mod graph;
mod scoring;
mod types;

pub use analyzer::ScheduleAnalyzer;
pub use scoring::{
    base_probability, complexity_risk, confidence_for, dependency_risk, score_task_risk,
};
pub use types::{CriticalPathAnalysis, ScheduleRiskFactors, TaskTiming};

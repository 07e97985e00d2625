//! Delay propagation and project-level schedule intelligence.
//!
//! A delay injected at one task is pushed through the dependency graph with
//! each successor absorbing what its float allows; what survives past the
//! project finish is the scenario's project impact. Scenarios seeded at the
//! critical path (and at high-risk tasks) feed the project report.

mod engine;
mod intelligence;
mod simulation;

pub use engine::DelayPropagationEngine;
pub use intelligence::{integration_risk_score, recommended_buffer_days, resilience_score};

use chrono::NaiveDate;
use pyo3::prelude::*;
use std::collections::HashMap;

use crate::critical_path::{CriticalPathAnalysis, ScheduleRiskFactors};
use crate::models::TaskDependency;

/// One simulated delay scenario.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct DelayPropagation {
    #[pyo3(get)]
    pub initial_task_id: String,
    #[pyo3(get)]
    pub initial_delay_days: i64,
    /// task_id -> days the task is pushed back; always contains the seed.
    #[pyo3(get)]
    pub affected_tasks: HashMap<String, i64>,
    /// Seed first, then every task the delay reached, in dependency order.
    #[pyo3(get)]
    pub propagation_path: Vec<String>,
    #[pyo3(get)]
    pub total_project_delay_days: i64,
    /// Mean confidence of the risk estimates for the tasks on the path.
    #[pyo3(get)]
    pub confidence_score: f64,
    #[pyo3(get)]
    pub explanation: String,
}

impl DelayPropagation {
    /// Fraction of the injected delay that reached the project finish.
    pub fn pass_through_fraction(&self) -> f64 {
        if self.initial_delay_days <= 0 {
            return 0.0;
        }
        (self.total_project_delay_days as f64 / self.initial_delay_days as f64).min(1.0)
    }

    pub fn is_absorbed(&self) -> bool {
        self.total_project_delay_days == 0
    }
}

#[pymethods]
impl DelayPropagation {
    fn __repr__(&self) -> String {
        format!(
            "DelayPropagation(task={:?}, delay={}, project_delay={}, affected={})",
            self.initial_task_id,
            self.initial_delay_days,
            self.total_project_delay_days,
            self.affected_tasks.len()
        )
    }
}

/// Top-level schedule risk report for one project.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectScheduleIntelligence {
    #[pyo3(get)]
    pub project_id: String,
    #[pyo3(get)]
    pub project_name: String,
    #[pyo3(get)]
    pub critical_path_analysis: CriticalPathAnalysis,
    #[pyo3(get)]
    pub risk_factors: HashMap<String, ScheduleRiskFactors>,
    #[pyo3(get)]
    pub delay_scenarios: Vec<DelayPropagation>,
    /// 0-1, higher means delays are absorbed before the project finish.
    #[pyo3(get)]
    pub schedule_resilience_score: f64,
    /// Dependencies touching a high-risk task, carrying their criticality.
    #[pyo3(get)]
    pub high_risk_dependencies: Vec<TaskDependency>,
    #[pyo3(get)]
    pub recommended_buffer_days: i64,
    /// 0-1, `1 - resilience` blended with the high-risk task fraction.
    #[pyo3(get)]
    pub integration_risk_score: f64,
    #[pyo3(get)]
    pub high_risk_tasks: Vec<String>,
    /// Project start + duration + recommended buffer, when a start is known.
    #[pyo3(get)]
    pub projected_finish_date: Option<NaiveDate>,
}

#[pymethods]
impl ProjectScheduleIntelligence {
    pub fn high_risk_dependency_count(&self) -> usize {
        self.high_risk_dependencies.len()
    }

    pub fn scenario_count(&self) -> usize {
        self.delay_scenarios.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "ProjectScheduleIntelligence(project_id={:?}, duration={}, resilience={:.3}, integration_risk={:.3}, buffer={})",
            self.project_id,
            self.critical_path_analysis.project_duration_days,
            self.schedule_resilience_score,
            self.integration_risk_score,
            self.recommended_buffer_days
        )
    }
}

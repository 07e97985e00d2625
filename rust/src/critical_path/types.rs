//! Result types for critical path analysis and risk scoring.

use chrono::NaiveDate;
use pyo3::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::models::ConfidenceLevel;

// Maps keyed by task or dependency id surface in Python as dict and set

/// Per-task schedule-pass output, in days offset from project start.
#[pyclass]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskTiming {
    /// Earliest possible start (forward pass).
    #[pyo3(get)]
    pub earliest_start: i64,
    /// Earliest possible finish (forward pass).
    #[pyo3(get)]
    pub earliest_finish: i64,
    /// Latest allowable start (backward pass).
    #[pyo3(get)]
    pub latest_start: i64,
    /// Latest allowable finish (backward pass).
    #[pyo3(get)]
    pub latest_finish: i64,
    /// Slack = latest_start - earliest_start.
    #[pyo3(get)]
    pub slack: i64,
}

impl TaskTiming {
    pub fn is_critical(&self) -> bool {
        self.slack == 0
    }
}

#[pymethods]
impl TaskTiming {
    fn __repr__(&self) -> String {
        format!(
            "TaskTiming(es={}, ef={}, ls={}, lf={}, slack={})",
            self.earliest_start,
            self.earliest_finish,
            self.latest_start,
            self.latest_finish,
            self.slack
        )
    }
}

/// Critical path, slack, and float for one project graph.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CriticalPathAnalysis {
    /// Task ids from project start to project finish along the longest chain.
    #[pyo3(get)]
    pub critical_path: Vec<String>,
    #[pyo3(get)]
    pub project_duration_days: i64,
    #[pyo3(get)]
    pub slack_by_task: HashMap<String, i64>,
    /// Every task with zero slack, on the reported chain or not.
    #[pyo3(get)]
    pub critical_tasks: HashSet<String>,
    /// Critical tasks flagged by weather, resource, or complexity signals, in insertion order.
    #[pyo3(get)]
    pub bottleneck_tasks: Vec<String>,
    #[pyo3(get)]
    pub task_timings: HashMap<String, TaskTiming>,
    /// dependency_id -> criticality score in (0, 1].
    #[pyo3(get)]
    pub dependency_criticality: HashMap<String, f64>,
    /// Calendar finish when the analyzer has a project start date.
    #[pyo3(get)]
    pub project_finish_date: Option<NaiveDate>,
}

impl CriticalPathAnalysis {
    pub fn slack_of(&self, task_id: &str) -> Option<i64> {
        self.slack_by_task.get(task_id).copied()
    }

    pub fn is_critical(&self, task_id: &str) -> bool {
        self.critical_tasks.contains(task_id)
    }
}

#[pymethods]
impl CriticalPathAnalysis {
    fn __repr__(&self) -> String {
        format!(
            "CriticalPathAnalysis(duration={}, path={:?}, critical={}, bottlenecks={})",
            self.project_duration_days,
            self.critical_path,
            self.critical_tasks.len(),
            self.bottleneck_tasks.len()
        )
    }
}

/// Deterministic delay-risk estimate for one task.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleRiskFactors {
    #[pyo3(get)]
    pub task_id: String,
    #[pyo3(get)]
    pub base_delay_probability: f64,
    #[pyo3(get)]
    pub weather_risk: f64,
    #[pyo3(get)]
    pub resource_risk: f64,
    #[pyo3(get)]
    pub dependency_risk: f64,
    #[pyo3(get)]
    pub complexity_risk: f64,
    /// Capped weighted sum of the sub-scores, always in [0, 1].
    #[pyo3(get)]
    pub combined_delay_probability: f64,
    #[pyo3(get)]
    pub expected_delay_days: f64,
    #[pyo3(get)]
    pub worst_case_delay_days: i64,
    #[pyo3(get)]
    pub confidence_level: ConfidenceLevel,
}

#[pymethods]
impl ScheduleRiskFactors {
    fn __repr__(&self) -> String {
        format!(
            "ScheduleRiskFactors(task_id={:?}, combined={:.3}, worst_case={}, confidence={})",
            self.task_id,
            self.combined_delay_probability,
            self.worst_case_delay_days,
            self.confidence_level.as_str()
        )
    }
}

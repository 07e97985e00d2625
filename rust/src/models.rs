//! Core data types for the schedule graph.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::critical_path::TaskTiming;
use crate::error::ScheduleError;

/// Largest task duration, lag magnitude, or injected delay accepted, in days.
pub const MAX_SCHEDULE_DAYS: i64 = 1_000_000;

/// Lifecycle state of a task.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    OnHold,
    Completed,
    Delayed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not_started",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::OnHold => "on_hold",
            TaskStatus::Completed => "completed",
            TaskStatus::Delayed => "delayed",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(TaskStatus::NotStarted),
            "in_progress" => Ok(TaskStatus::InProgress),
            "on_hold" => Ok(TaskStatus::OnHold),
            "completed" => Ok(TaskStatus::Completed),
            "delayed" => Ok(TaskStatus::Delayed),
            other => Err(ScheduleError::UnknownVariant {
                kind: "task status",
                value: other.to_string(),
            }),
        }
    }
}

/// Which endpoints of two tasks a dependency links (PMBOK terminology).
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum DependencyType {
    #[default]
    FinishToStart,
    StartToStart,
    FinishToFinish,
    StartToFinish,
}

impl DependencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyType::FinishToStart => "finish_to_start",
            DependencyType::StartToStart => "start_to_start",
            DependencyType::FinishToFinish => "finish_to_finish",
            DependencyType::StartToFinish => "start_to_finish",
        }
    }

    /// Earliest start the successor may take given the predecessor's window.
    ///
    /// Finish-anchored kinds constrain the successor's finish, so its start is
    /// derived by subtracting the successor's own duration.
    pub fn earliest_successor_start(
        self,
        predecessor_start: i64,
        predecessor_finish: i64,
        successor_duration: i64,
        lag_days: i64,
    ) -> i64 {
        match self {
            DependencyType::FinishToStart => predecessor_finish + lag_days,
            DependencyType::StartToStart => predecessor_start + lag_days,
            DependencyType::FinishToFinish => predecessor_finish + lag_days - successor_duration,
            DependencyType::StartToFinish => predecessor_start + lag_days - successor_duration,
        }
    }

    /// Latest finish the predecessor may take given the successor's late window.
    ///
    /// Mirror image of [`earliest_successor_start`](Self::earliest_successor_start).
    pub fn latest_predecessor_finish(
        self,
        successor_late_start: i64,
        successor_late_finish: i64,
        predecessor_duration: i64,
        lag_days: i64,
    ) -> i64 {
        match self {
            DependencyType::FinishToStart => successor_late_start - lag_days,
            DependencyType::StartToStart => {
                successor_late_start - lag_days + predecessor_duration
            }
            DependencyType::FinishToFinish => successor_late_finish - lag_days,
            DependencyType::StartToFinish => {
                successor_late_finish - lag_days + predecessor_duration
            }
        }
    }
}

impl FromStr for DependencyType {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "finish_to_start" => Ok(DependencyType::FinishToStart),
            "start_to_start" => Ok(DependencyType::StartToStart),
            "finish_to_finish" => Ok(DependencyType::FinishToFinish),
            "start_to_finish" => Ok(DependencyType::StartToFinish),
            other => Err(ScheduleError::UnknownVariant {
                kind: "dependency type",
                value: other.to_string(),
            }),
        }
    }
}

/// How much explicit risk signal backs a task's risk estimate.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
        }
    }

    /// Numeric weight used when averaging confidence across tasks.
    pub fn score(&self) -> f64 {
        match self {
            ConfidenceLevel::Low => 0.5,
            ConfidenceLevel::Medium => 0.7,
            ConfidenceLevel::High => 0.9,
        }
    }
}

/// A unit of schedule work.
///
/// Identity is the `task_id` alone: equality and hashing ignore every other field.
#[pyclass]
#[derive(Clone, Debug)]
pub struct Task {
    #[pyo3(get, set)]
    pub task_id: String,
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub duration_days: i64,
    #[pyo3(get, set)]
    pub status: TaskStatus,
    /// Multiplier on delay likelihood, nominally 0.5-2.0.
    #[pyo3(get, set)]
    pub complexity_factor: f64,
    #[pyo3(get, set)]
    pub weather_dependency: bool,
    #[pyo3(get, set)]
    pub resource_constrained: bool,
    /// Set by the analyzer after a critical path calculation.
    #[pyo3(get)]
    pub(crate) critical_path_member: bool,
    /// Set by the analyzer after a critical path calculation.
    #[pyo3(get)]
    pub(crate) timing: Option<TaskTiming>,
}

impl Task {
    pub fn new(task_id: impl Into<String>, name: impl Into<String>, duration_days: i64) -> Self {
        Self {
            task_id: task_id.into(),
            name: name.into(),
            duration_days,
            status: TaskStatus::NotStarted,
            complexity_factor: 1.0,
            weather_dependency: false,
            resource_constrained: false,
            critical_path_member: false,
            timing: None,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_complexity(mut self, complexity_factor: f64) -> Self {
        self.complexity_factor = complexity_factor;
        self
    }

    pub fn with_weather_dependency(mut self, weather_dependency: bool) -> Self {
        self.weather_dependency = weather_dependency;
        self
    }

    pub fn with_resource_constraint(mut self, resource_constrained: bool) -> Self {
        self.resource_constrained = resource_constrained;
        self
    }

    pub fn is_critical_path_member(&self) -> bool {
        self.critical_path_member
    }

    /// Schedule-pass output from the most recent critical path calculation.
    pub fn schedule(&self) -> Option<&TaskTiming> {
        self.timing.as_ref()
    }

    /// Whether any weather, resource, or complexity flag marks this task as delay-prone.
    pub fn is_delay_prone(&self) -> bool {
        self.weather_dependency || self.resource_constrained || self.complexity_factor > 1.0
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        let invalid = |reason: &str| ScheduleError::InvalidTask {
            task_id: self.task_id.clone(),
            reason: reason.to_string(),
        };
        if self.task_id.trim().is_empty() {
            return Err(invalid("task_id must be non-empty"));
        }
        if self.duration_days < 0 {
            return Err(invalid("duration_days must be >= 0"));
        }
        if self.duration_days > MAX_SCHEDULE_DAYS {
            return Err(invalid("duration_days exceeds the schedule limit"));
        }
        if !self.complexity_factor.is_finite() || self.complexity_factor < 0.0 {
            return Err(invalid("complexity_factor must be a finite non-negative number"));
        }
        Ok(())
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.task_id == other.task_id
    }
}

impl Eq for Task {}

impl Hash for Task {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.task_id.hash(state);
    }
}

#[pymethods]
impl Task {
    #[new]
    #[pyo3(signature = (
        task_id,
        name,
        duration_days,
        status=None,
        complexity_factor=1.0,
        weather_dependency=false,
        resource_constrained=false
    ))]
    #[allow(clippy::too_many_arguments)]
    fn py_new(
        task_id: String,
        name: String,
        duration_days: i64,
        status: Option<String>,
        complexity_factor: f64,
        weather_dependency: bool,
        resource_constrained: bool,
    ) -> PyResult<Self> {
        let status = match status {
            Some(s) => s
                .parse::<TaskStatus>()
                .map_err(|e| PyValueError::new_err(e.to_string()))?,
            None => TaskStatus::NotStarted,
        };
        Ok(Task::new(task_id, name, duration_days)
            .with_status(status)
            .with_complexity(complexity_factor)
            .with_weather_dependency(weather_dependency)
            .with_resource_constraint(resource_constrained))
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(task_id={:?}, duration_days={}, status={}, critical={})",
            self.task_id,
            self.duration_days,
            self.status.as_str(),
            self.critical_path_member
        )
    }
}

/// Directed edge from a predecessor task to a successor task.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct TaskDependency {
    #[pyo3(get, set)]
    pub dependency_id: String,
    #[pyo3(get, set)]
    pub predecessor_task_id: String,
    #[pyo3(get, set)]
    pub successor_task_id: String,
    #[pyo3(get, set)]
    pub dependency_type: DependencyType,
    /// Negative values express lead time.
    #[pyo3(get, set)]
    pub lag_days: i64,
    /// 0-1, filled in by critical path analysis.
    #[pyo3(get, set)]
    pub criticality_score: f64,
}

impl TaskDependency {
    pub fn new(
        dependency_id: impl Into<String>,
        predecessor_task_id: impl Into<String>,
        successor_task_id: impl Into<String>,
        dependency_type: DependencyType,
    ) -> Self {
        Self {
            dependency_id: dependency_id.into(),
            predecessor_task_id: predecessor_task_id.into(),
            successor_task_id: successor_task_id.into(),
            dependency_type,
            lag_days: 0,
            criticality_score: 0.0,
        }
    }

    pub fn with_lag(mut self, lag_days: i64) -> Self {
        self.lag_days = lag_days;
        self
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        let invalid = |reason: &str| ScheduleError::InvalidDependency {
            dependency_id: self.dependency_id.clone(),
            reason: reason.to_string(),
        };
        if self.dependency_id.trim().is_empty() {
            return Err(invalid("dependency_id must be non-empty"));
        }
        if self.predecessor_task_id.trim().is_empty() {
            return Err(invalid("predecessor_task_id must be non-empty"));
        }
        if self.successor_task_id.trim().is_empty() {
            return Err(invalid("successor_task_id must be non-empty"));
        }
        if self.lag_days.unsigned_abs() > MAX_SCHEDULE_DAYS as u64 {
            return Err(invalid("lag_days exceeds the schedule limit"));
        }
        Ok(())
    }
}

#[pymethods]
impl TaskDependency {
    #[new]
    #[pyo3(signature = (
        dependency_id,
        predecessor_task_id,
        successor_task_id,
        dependency_type=None,
        lag_days=0
    ))]
    fn py_new(
        dependency_id: String,
        predecessor_task_id: String,
        successor_task_id: String,
        dependency_type: Option<String>,
        lag_days: i64,
    ) -> PyResult<Self> {
        let dependency_type = match dependency_type {
            Some(s) => s
                .parse::<DependencyType>()
                .map_err(|e| PyValueError::new_err(e.to_string()))?,
            None => DependencyType::FinishToStart,
        };
        Ok(
            TaskDependency::new(
                dependency_id,
                predecessor_task_id,
                successor_task_id,
                dependency_type,
            )
            .with_lag(lag_days),
        )
    }

    fn __repr__(&self) -> String {
        format!(
            "TaskDependency({:?} -> {:?}, type={}, lag_days={})",
            self.predecessor_task_id,
            self.successor_task_id,
            self.dependency_type.as_str(),
            self.lag_days
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_task_identity_is_task_id() {
        let a = Task::new("a", "Excavation", 5);
        let a2 = Task::new("a", "Renamed", 9).with_complexity(1.8);
        let b = Task::new("b", "Excavation", 5);

        assert_eq!(a, a2);
        assert_ne!(a, b);

        let set: HashSet<Task> = [a, a2, b].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_parse_round_trip_literals() {
        for literal in [
            "finish_to_start",
            "start_to_start",
            "finish_to_finish",
            "start_to_finish",
        ] {
            let kind: DependencyType = literal.parse().unwrap();
            assert_eq!(kind.as_str(), literal);
        }
        assert_eq!(
            "on_hold".parse::<TaskStatus>().unwrap(),
            TaskStatus::OnHold
        );
        assert!(matches!(
            "finish_to_middle".parse::<DependencyType>(),
            Err(ScheduleError::UnknownVariant { .. })
        ));
    }

    #[test]
    fn test_forward_offsets_per_dependency_type() {
        // Predecessor occupies [2, 7), successor lasts 3 days, lag 1.
        let (start, finish, dur, lag) = (2, 7, 3, 1);
        assert_eq!(
            DependencyType::FinishToStart.earliest_successor_start(start, finish, dur, lag),
            8
        );
        assert_eq!(
            DependencyType::StartToStart.earliest_successor_start(start, finish, dur, lag),
            3
        );
        assert_eq!(
            DependencyType::FinishToFinish.earliest_successor_start(start, finish, dur, lag),
            5
        );
        assert_eq!(
            DependencyType::StartToFinish.earliest_successor_start(start, finish, dur, lag),
            0
        );
    }

    #[test]
    fn test_backward_offsets_per_dependency_type() {
        // Successor late window [10, 14), predecessor lasts 4 days, lag 2.
        let (late_start, late_finish, dur, lag) = (10, 14, 4, 2);
        assert_eq!(
            DependencyType::FinishToStart
                .latest_predecessor_finish(late_start, late_finish, dur, lag),
            8
        );
        assert_eq!(
            DependencyType::StartToStart
                .latest_predecessor_finish(late_start, late_finish, dur, lag),
            12
        );
        assert_eq!(
            DependencyType::FinishToFinish
                .latest_predecessor_finish(late_start, late_finish, dur, lag),
            12
        );
        assert_eq!(
            DependencyType::StartToFinish
                .latest_predecessor_finish(late_start, late_finish, dur, lag),
            16
        );
    }

    #[test]
    fn test_task_validation() {
        assert!(Task::new("a", "A", 0).validate().is_ok());
        assert!(matches!(
            Task::new("a", "A", -1).validate(),
            Err(ScheduleError::InvalidTask { .. })
        ));
        assert!(Task::new("", "A", 1).validate().is_err());
        assert!(Task::new("a", "A", 1)
            .with_complexity(f64::NAN)
            .validate()
            .is_err());
        assert!(Task::new("a", "A", MAX_SCHEDULE_DAYS).validate().is_ok());
        assert!(Task::new("a", "A", i64::MAX).validate().is_err());
    }

    #[test]
    fn test_dependency_validation() {
        let dep = TaskDependency::new("d1", "a", "b", DependencyType::FinishToStart).with_lag(-2);
        assert!(dep.validate().is_ok());
        assert_eq!(dep.lag_days, -2);

        let missing = TaskDependency::new("d2", "", "b", DependencyType::StartToStart);
        assert!(matches!(
            missing.validate(),
            Err(ScheduleError::InvalidDependency { .. })
        ));

        let lead = TaskDependency::new("d3", "a", "b", DependencyType::FinishToStart);
        assert!(lead.clone().with_lag(-MAX_SCHEDULE_DAYS).validate().is_ok());
        assert!(lead.clone().with_lag(i64::MIN).validate().is_err());
        assert!(lead.with_lag(i64::MAX).validate().is_err());
    }

    #[test]
    fn test_delay_prone_flags() {
        assert!(!Task::new("a", "A", 3).is_delay_prone());
        assert!(Task::new("a", "A", 3)
            .with_weather_dependency(true)
            .is_delay_prone());
        assert!(Task::new("a", "A", 3).with_complexity(1.2).is_delay_prone());
        assert!(!Task::new("a", "A", 3).with_complexity(1.0).is_delay_prone());
    }
}

//! Error types for schedule analysis and delay propagation.

use thiserror::Error;

/// Errors raised while building, analyzing, or simulating a schedule graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid task {task_id:?}: {reason}")]
    InvalidTask { task_id: String, reason: String },
    #[error("Invalid dependency {dependency_id:?}: {reason}")]
    InvalidDependency {
        dependency_id: String,
        reason: String,
    },
    #[error("Dependency {dependency_id:?} references unknown task {task_id:?}")]
    UnknownTask {
        dependency_id: String,
        task_id: String,
    },
    #[error("Circular dependency detected among tasks: {}", .0.join(", "))]
    CycleDetected(Vec<String>),
    #[error("Task not found: {0}")]
    TaskNotFound(String),
    #[error("Invalid delay of {delay_days} days for task {task_id:?}")]
    InvalidDelay { task_id: String, delay_days: i64 },
    #[error("Critical path analysis has no timing for task {0:?}; recompute it first")]
    StaleAnalysis(String),
    #[error("Unknown {kind}: {value:?}")]
    UnknownVariant { kind: &'static str, value: String },
}

impl ScheduleError {
    /// True for errors caused by malformed input records rather than graph shape.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ScheduleError::InvalidTask { .. }
                | ScheduleError::InvalidDependency { .. }
                | ScheduleError::UnknownTask { .. }
                | ScheduleError::UnknownVariant { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_tasks() {
        let err = ScheduleError::CycleDetected(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            err.to_string(),
            "Circular dependency detected among tasks: a, b"
        );
        assert!(!err.is_validation());
    }

    #[test]
    fn test_unknown_task_is_validation() {
        let err = ScheduleError::UnknownTask {
            dependency_id: "d1".to_string(),
            task_id: "ghost".to_string(),
        };
        assert!(err.is_validation());
        assert!(err.to_string().contains("ghost"));
    }
}

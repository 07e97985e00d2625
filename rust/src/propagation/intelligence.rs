//! Project-level aggregation of risk factors and delay scenarios.

use std::collections::HashMap;

use crate::critical_path::ScheduleRiskFactors;
use crate::models::{Task, TaskDependency};

use super::DelayPropagation;

/// 1 minus the mean fraction of injected delay that reached the project finish.
///
/// No scenarios means nothing was shown to propagate, which scores 1.0.
pub fn resilience_score(scenarios: &[DelayPropagation]) -> f64 {
    if scenarios.is_empty() {
        return 1.0;
    }
    let mean = scenarios
        .iter()
        .map(DelayPropagation::pass_through_fraction)
        .sum::<f64>()
        / scenarios.len() as f64;
    (1.0 - mean).clamp(0.0, 1.0)
}

/// `1 - resilience`, blended toward the high-risk task fraction by `blend`.
///
/// The result stays within `blend` of `1 - resilience`.
pub fn integration_risk_score(resilience: f64, high_risk_fraction: f64, blend: f64) -> f64 {
    let blend = blend.clamp(0.0, 1.0);
    let fraction = high_risk_fraction.clamp(0.0, 1.0);
    ((1.0 - blend) * (1.0 - resilience) + blend * fraction).clamp(0.0, 1.0)
}

/// Worst scenario project delay rounded up to a multiple of `granularity_days`.
pub fn recommended_buffer_days(scenarios: &[DelayPropagation], granularity_days: i64) -> i64 {
    let worst = scenarios
        .iter()
        .map(|s| s.total_project_delay_days)
        .max()
        .unwrap_or(0)
        .max(0);
    let step = granularity_days.max(1);
    match worst % step {
        0 => worst,
        rem => worst.saturating_add(step - rem),
    }
}

fn exceeds(risk: &HashMap<String, ScheduleRiskFactors>, task_id: &str, threshold: f64) -> bool {
    risk.get(task_id)
        .is_some_and(|r| r.combined_delay_probability > threshold)
}

/// Ids of tasks whose combined delay probability exceeds `threshold`, in `tasks` order.
pub(crate) fn high_risk_tasks(
    tasks: &[Task],
    risk: &HashMap<String, ScheduleRiskFactors>,
    threshold: f64,
) -> Vec<String> {
    tasks
        .iter()
        .filter(|task| exceeds(risk, &task.task_id, threshold))
        .map(|task| task.task_id.clone())
        .collect()
}

/// Dependencies with a high-risk predecessor or successor.
///
/// Returned copies carry the criticality from `criticality` when present.
pub(crate) fn high_risk_dependencies(
    dependencies: &[TaskDependency],
    risk: &HashMap<String, ScheduleRiskFactors>,
    criticality: &HashMap<String, f64>,
    threshold: f64,
) -> Vec<TaskDependency> {
    dependencies
        .iter()
        .filter(|dep| {
            exceeds(risk, &dep.predecessor_task_id, threshold)
                || exceeds(risk, &dep.successor_task_id, threshold)
        })
        .map(|dep| {
            let mut dep = dep.clone();
            if let Some(&score) = criticality.get(&dep.dependency_id) {
                dep.criticality_score = score;
            }
            dep
        })
        .collect()
}

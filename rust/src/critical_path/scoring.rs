//! Deterministic per-task delay-risk scoring.

use crate::config::RiskConfig;
use crate::models::{ConfidenceLevel, Task, TaskStatus};

use super::types::ScheduleRiskFactors;

/// Base delay probability for a task's lifecycle state.
pub fn base_probability(status: TaskStatus, config: &RiskConfig) -> f64 {
    match status {
        TaskStatus::NotStarted | TaskStatus::InProgress => config.base_delay_probability,
        TaskStatus::OnHold => config.on_hold_delay_probability,
        TaskStatus::Delayed => config.delayed_delay_probability,
        TaskStatus::Completed => 0.0,
    }
}

/// Dependency risk from predecessor count and their average criticality.
///
/// Half the score comes from how many predecessors feed the task (saturating
/// at `dependency_saturation`), half from their mean `criticality_score`.
pub fn dependency_risk(criticality_scores: &[f64], config: &RiskConfig) -> f64 {
    if criticality_scores.is_empty() {
        return 0.0;
    }
    let count = criticality_scores.len() as f64;
    let saturation = config.dependency_saturation.max(1) as f64;
    let count_factor = (count / saturation).min(1.0);
    let mean_criticality = criticality_scores.iter().sum::<f64>() / count;
    (0.5 * count_factor + 0.5 * mean_criticality).clamp(0.0, 1.0)
}

/// Complexity above the 1.0 baseline, normalized by `complexity_span`.
pub fn complexity_risk(complexity_factor: f64, config: &RiskConfig) -> f64 {
    let excess = complexity_factor - 1.0;
    if excess <= 0.0 {
        return 0.0;
    }
    if config.complexity_span <= 0.0 {
        return 1.0;
    }
    (excess / config.complexity_span).clamp(0.0, 1.0)
}

/// Confidence from how many explicit risk signals the task carries.
///
/// Signals: weather flag, resource flag, at least one predecessor, and a
/// complexity factor other than 1.0. All four is high, two or three medium.
pub fn confidence_for(signal_count: usize) -> ConfidenceLevel {
    if signal_count >= 4 {
        ConfidenceLevel::High
    } else if signal_count >= 2 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

/// Score a task's delay risk.
///
/// `predecessor_criticality` holds one criticality score per dependency whose
/// successor is this task. Completed tasks carry no risk and cannot slip.
pub fn score_task_risk(
    task: &Task,
    predecessor_criticality: impl IntoIterator<Item = f64>,
    config: &RiskConfig,
) -> ScheduleRiskFactors {
    let criticality: Vec<f64> = predecessor_criticality
        .into_iter()
        .map(|score| score.clamp(0.0, 1.0))
        .collect();

    let signals = [
        task.weather_dependency,
        task.resource_constrained,
        !criticality.is_empty(),
        (task.complexity_factor - 1.0).abs() > 1e-9,
    ]
    .iter()
    .filter(|&&present| present)
    .count();
    let confidence_level = confidence_for(signals);

    if task.status == TaskStatus::Completed {
        return ScheduleRiskFactors {
            task_id: task.task_id.clone(),
            base_delay_probability: 0.0,
            weather_risk: 0.0,
            resource_risk: 0.0,
            dependency_risk: 0.0,
            complexity_risk: 0.0,
            combined_delay_probability: 0.0,
            expected_delay_days: 0.0,
            worst_case_delay_days: 0,
            confidence_level,
        };
    }

    let base = base_probability(task.status, config).clamp(0.0, 1.0);
    let weather = if task.weather_dependency {
        config.weather_risk.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let resource = if task.resource_constrained {
        config.resource_risk.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let dependency = dependency_risk(&criticality, config);
    let complexity = complexity_risk(task.complexity_factor, config);

    let combined = (base
        + config.weather_weight * weather
        + config.resource_weight * resource
        + config.dependency_weight * dependency
        + config.complexity_weight * complexity)
        .clamp(0.0, 1.0);

    let duration = task.duration_days as f64;
    ScheduleRiskFactors {
        task_id: task.task_id.clone(),
        base_delay_probability: base,
        weather_risk: weather,
        resource_risk: resource,
        dependency_risk: dependency,
        complexity_risk: complexity,
        combined_delay_probability: combined,
        expected_delay_days: combined * duration,
        worst_case_delay_days: (duration * task.complexity_factor).ceil() as i64,
        confidence_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_deps() -> std::iter::Empty<f64> {
        std::iter::empty()
    }

    #[test]
    fn test_plain_task_baseline() {
        let task = Task::new("t", "Framing", 10);
        let risk = score_task_risk(&task, no_deps(), &RiskConfig::default());

        assert!((risk.combined_delay_probability - 0.1).abs() < 1e-9);
        assert!((risk.expected_delay_days - 1.0).abs() < 1e-9);
        assert_eq!(risk.worst_case_delay_days, 10);
        assert_eq!(risk.confidence_level, ConfidenceLevel::Low);
        assert_eq!(risk.weather_risk, 0.0);
        assert_eq!(risk.complexity_risk, 0.0);
    }

    #[test]
    fn test_all_signals_high_confidence() {
        let task = Task::new("t", "Roofing", 4)
            .with_weather_dependency(true)
            .with_resource_constraint(true)
            .with_complexity(1.5);
        let config = RiskConfig::default();
        let risk = score_task_risk(&task, [1.0, 0.5], &config);

        assert_eq!(risk.confidence_level, ConfidenceLevel::High);
        assert!((risk.weather_risk - 0.6).abs() < 1e-9);
        assert!((risk.resource_risk - 0.5).abs() < 1e-9);
        // count 2/4 -> 0.5, mean criticality 0.75
        assert!((risk.dependency_risk - 0.625).abs() < 1e-9);
        assert!((risk.complexity_risk - 0.5).abs() < 1e-9);

        let expected = 0.1 + 0.35 * 0.6 + 0.3 * 0.5 + 0.2 * 0.625 + 0.25 * 0.5;
        assert!((risk.combined_delay_probability - expected).abs() < 1e-9);
        assert_eq!(risk.worst_case_delay_days, 6);
    }

    #[test]
    fn test_combined_probability_is_capped() {
        let config = RiskConfig {
            base_delay_probability: 0.9,
            weather_weight: 1.0,
            ..RiskConfig::default()
        };
        let task = Task::new("t", "Pour", 3).with_weather_dependency(true);
        let risk = score_task_risk(&task, no_deps(), &config);
        assert!((risk.combined_delay_probability - 1.0).abs() < 1e-9);
        assert_eq!(risk.confidence_level, ConfidenceLevel::Low);
    }

    #[test]
    fn test_complexity_clipping() {
        let config = RiskConfig::default();
        assert_eq!(complexity_risk(0.5, &config), 0.0);
        assert!((complexity_risk(1.25, &config) - 0.25).abs() < 1e-9);
        assert_eq!(complexity_risk(3.0, &config), 1.0);
    }

    #[test]
    fn test_worst_case_rounds_up() {
        let task = Task::new("t", "Inspection", 3).with_complexity(1.1);
        let risk = score_task_risk(&task, no_deps(), &RiskConfig::default());
        assert_eq!(risk.worst_case_delay_days, 4);
        assert_eq!(risk.confidence_level, ConfidenceLevel::Low);
    }

    #[test]
    fn test_status_changes_base() {
        let config = RiskConfig::default();
        let delayed = Task::new("t", "Drywall", 2).with_status(TaskStatus::Delayed);
        let risk = score_task_risk(&delayed, no_deps(), &config);
        assert!((risk.base_delay_probability - 0.5).abs() < 1e-9);

        let done = Task::new("t", "Drywall", 2)
            .with_status(TaskStatus::Completed)
            .with_weather_dependency(true);
        let risk = score_task_risk(&done, no_deps(), &config);
        assert_eq!(risk.combined_delay_probability, 0.0);
        assert_eq!(risk.worst_case_delay_days, 0);
    }

    #[test]
    fn test_dependency_risk_saturates() {
        let config = RiskConfig::default();
        assert_eq!(dependency_risk(&[], &config), 0.0);
        let many = vec![0.0; 10];
        assert!((dependency_risk(&many, &config) - 0.5).abs() < 1e-9);
        let critical = vec![1.0; 10];
        assert!((dependency_risk(&critical, &config) - 1.0).abs() < 1e-9);
    }
}

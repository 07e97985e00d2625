//! Scenario generation and project report assembly over an analyzer.

use std::collections::{HashMap, HashSet};

use crate::config::PropagationConfig;
use crate::critical_path::graph::ScheduleGraph;
use crate::critical_path::{CriticalPathAnalysis, ScheduleAnalyzer, ScheduleRiskFactors, TaskTiming};
use crate::error::ScheduleError;
use crate::models::MAX_SCHEDULE_DAYS;
use crate::{log_detail, log_summary};

use super::intelligence::{
    high_risk_dependencies, high_risk_tasks, integration_risk_score, recommended_buffer_days,
    resilience_score,
};
use super::simulation::{explain, propagate_delay};
use super::{DelayPropagation, ProjectScheduleIntelligence};

/// Graph, order, and analysis timings lined up by task index.
struct ScheduledGraph {
    graph: ScheduleGraph,
    order: Vec<usize>,
    timings: Vec<TaskTiming>,
    project_duration: i64,
}

/// Simulates delays against an analyzer's graph and builds project reports.
///
/// Holds the analyzer by shared reference and never mutates it, so the same
/// analyzer state and inputs always give the same output.
pub struct DelayPropagationEngine<'a> {
    analyzer: &'a ScheduleAnalyzer,
    config: PropagationConfig,
}

impl<'a> DelayPropagationEngine<'a> {
    pub fn new(analyzer: &'a ScheduleAnalyzer) -> Self {
        Self {
            analyzer,
            config: PropagationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PropagationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    fn verbosity(&self) -> u8 {
        self.config.verbosity.max(self.analyzer.verbosity())
    }

    /// Line the analysis up with the analyzer's current graph.
    fn schedule(&self, analysis: &CriticalPathAnalysis) -> Result<ScheduledGraph, ScheduleError> {
        let (graph, order) = self.analyzer.ordered_graph()?;
        let timings = self
            .analyzer
            .tasks()
            .iter()
            .map(|task| {
                analysis
                    .task_timings
                    .get(&task.task_id)
                    .copied()
                    .ok_or_else(|| ScheduleError::StaleAnalysis(task.task_id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ScheduledGraph {
            graph,
            order,
            timings,
            project_duration: analysis.project_duration_days,
        })
    }

    fn scenario(
        &self,
        scheduled: &ScheduledGraph,
        risk: &HashMap<String, ScheduleRiskFactors>,
        seed: usize,
        delay: i64,
    ) -> DelayPropagation {
        let tasks = self.analyzer.tasks();
        let trace = propagate_delay(
            &scheduled.graph,
            &scheduled.timings,
            &scheduled.order,
            scheduled.project_duration,
            seed,
            delay,
            self.verbosity(),
        );

        let propagation_path: Vec<String> = trace
            .shifted
            .iter()
            .map(|&(task, _)| tasks[task].task_id.clone())
            .collect();
        let affected_tasks: HashMap<String, i64> = trace
            .shifted
            .iter()
            .map(|&(task, shift)| (tasks[task].task_id.clone(), shift))
            .collect();

        let confidence_score = propagation_path
            .iter()
            .map(|id| risk.get(id).map_or(0.0, |r| r.confidence_level.score()))
            .sum::<f64>()
            / propagation_path.len().max(1) as f64;

        let explanation = explain(&trace, seed, delay, |i| tasks[i].task_id.as_str());
        log_detail!(self.verbosity(), "{}", explanation);

        DelayPropagation {
            initial_task_id: tasks[seed].task_id.clone(),
            initial_delay_days: delay,
            affected_tasks,
            propagation_path,
            total_project_delay_days: trace.project_delay,
            confidence_score,
            explanation,
        }
    }

    fn scenarios_with(
        &self,
        analysis: &CriticalPathAnalysis,
        risk: &HashMap<String, ScheduleRiskFactors>,
    ) -> Result<Vec<DelayPropagation>, ScheduleError> {
        let scheduled = self.schedule(analysis)?;
        let tasks = self.analyzer.tasks();

        let mut seeds: Vec<&str> = analysis.critical_path.iter().map(String::as_str).collect();
        if self.config.include_high_risk_tasks {
            let on_path: HashSet<&str> = seeds.iter().copied().collect();
            seeds.extend(
                tasks
                    .iter()
                    .map(|task| task.task_id.as_str())
                    .filter(|id| !on_path.contains(id))
                    .filter(|id| {
                        risk.get(*id).is_some_and(|r| {
                            r.combined_delay_probability > self.config.high_risk_threshold
                        })
                    }),
            );
        }

        let mut scenarios = Vec::with_capacity(seeds.len());
        for task_id in seeds {
            let Some(factors) = risk.get(task_id) else {
                continue;
            };
            if factors.worst_case_delay_days <= 0 {
                continue;
            }
            let seed = self
                .analyzer
                .task_index(task_id)
                .ok_or_else(|| ScheduleError::TaskNotFound(task_id.to_string()))?;
            scenarios.push(self.scenario(&scheduled, risk, seed, factors.worst_case_delay_days));
        }

        log_summary!(
            self.verbosity(),
            "Generated {} delay scenarios ({} absorbed)",
            scenarios.len(),
            scenarios.iter().filter(|s| s.is_absorbed()).count()
        );
        Ok(scenarios)
    }

    /// One scenario per critical-path task, plus off-path high-risk tasks when
    /// configured, each slipping by its worst-case delay.
    ///
    /// Tasks whose worst case is 0 days produce no scenario.
    pub fn generate_delay_scenarios(
        &self,
        analysis: &CriticalPathAnalysis,
    ) -> Result<Vec<DelayPropagation>, ScheduleError> {
        let risk = self.analyzer.risk_factors_from(analysis)?;
        self.scenarios_with(analysis, &risk)
    }

    /// Propagate a delay of up to [`MAX_SCHEDULE_DAYS`] injected at `task_id`.
    pub fn simulate_delay(
        &self,
        analysis: &CriticalPathAnalysis,
        task_id: &str,
        delay_days: i64,
    ) -> Result<DelayPropagation, ScheduleError> {
        if !(0..=MAX_SCHEDULE_DAYS).contains(&delay_days) {
            return Err(ScheduleError::InvalidDelay {
                task_id: task_id.to_string(),
                delay_days,
            });
        }
        let seed = self
            .analyzer
            .task_index(task_id)
            .ok_or_else(|| ScheduleError::TaskNotFound(task_id.to_string()))?;
        let scheduled = self.schedule(analysis)?;
        let risk = self.analyzer.risk_factors_from(analysis)?;
        Ok(self.scenario(&scheduled, &risk, seed, delay_days))
    }

    /// Aggregate an analysis, its risk factors, and scenarios into a report.
    pub fn create_project_intelligence(
        &self,
        project_id: impl Into<String>,
        project_name: impl Into<String>,
        critical_path_analysis: CriticalPathAnalysis,
        risk_factors: HashMap<String, ScheduleRiskFactors>,
        delay_scenarios: Vec<DelayPropagation>,
    ) -> ProjectScheduleIntelligence {
        let threshold = self.config.high_risk_threshold;
        let tasks = self.analyzer.tasks();

        let schedule_resilience_score = resilience_score(&delay_scenarios);
        let high_risk_tasks = high_risk_tasks(tasks, &risk_factors, threshold);
        let high_risk_fraction = if tasks.is_empty() {
            0.0
        } else {
            high_risk_tasks.len() as f64 / tasks.len() as f64
        };
        let integration_risk_score = integration_risk_score(
            schedule_resilience_score,
            high_risk_fraction,
            self.config.high_risk_blend,
        );
        let high_risk_dependencies = high_risk_dependencies(
            self.analyzer.dependencies(),
            &risk_factors,
            &critical_path_analysis.dependency_criticality,
            threshold,
        );
        let recommended_buffer_days =
            recommended_buffer_days(&delay_scenarios, self.config.buffer_granularity_days);
        let projected_finish_date = self
            .analyzer
            .date_at(
                critical_path_analysis
                    .project_duration_days
                    .saturating_add(recommended_buffer_days),
            );

        log_summary!(
            self.verbosity(),
            "Resilience {:.3}, integration risk {:.3}, buffer {} days, {} high-risk tasks",
            schedule_resilience_score,
            integration_risk_score,
            recommended_buffer_days,
            high_risk_tasks.len()
        );

        ProjectScheduleIntelligence {
            project_id: project_id.into(),
            project_name: project_name.into(),
            critical_path_analysis,
            risk_factors,
            delay_scenarios,
            schedule_resilience_score,
            high_risk_dependencies,
            recommended_buffer_days,
            integration_risk_score,
            high_risk_tasks,
            projected_finish_date,
        }
    }

    /// Critical path, risk factors, scenarios, and report in one call.
    pub fn analyze(
        &self,
        project_id: impl Into<String>,
        project_name: impl Into<String>,
    ) -> Result<ProjectScheduleIntelligence, ScheduleError> {
        let analysis = self.analyzer.compute_critical_path()?;
        let risk = self.analyzer.risk_factors_from(&analysis)?;
        let scenarios = self.scenarios_with(&analysis, &risk)?;
        Ok(self.create_project_intelligence(project_id, project_name, analysis, risk, scenarios))
    }
}

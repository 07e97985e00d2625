//! Dependency graph owner and critical path entry point.

use chrono::{Days, NaiveDate};
use rustc_hash::FxHashMap;
use std::collections::{HashMap, HashSet};

use crate::arena::IdArena;
use crate::config::RiskConfig;
use crate::error::ScheduleError;
use crate::models::{Task, TaskDependency};
use crate::{log_detail, log_summary};

use super::calculation::{edge_criticality, schedule_passes, trace_critical_path, SchedulePasses};
use super::graph::ScheduleGraph;
use super::scoring::score_task_risk;
use super::types::{CriticalPathAnalysis, ScheduleRiskFactors};

/// Owns the tasks and dependencies of one project graph.
///
/// Not thread-safe: callers must not mutate an analyzer while another call on
/// it is running. Analyze each project with its own instance.
#[derive(Clone, Debug, Default)]
pub struct ScheduleAnalyzer {
    tasks: IdArena<Task>,
    dependencies: IdArena<TaskDependency>,
    /// successor task_id -> dependency indices feeding it
    incoming: FxHashMap<String, Vec<usize>>,
    risk_config: RiskConfig,
    project_start: Option<NaiveDate>,
    verbosity: u8,
}

impl ScheduleAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_risk_config(mut self, risk_config: RiskConfig) -> Self {
        self.risk_config = risk_config;
        self
    }

    /// Anchor day offsets to a calendar date.
    pub fn with_project_start(mut self, project_start: NaiveDate) -> Self {
        self.project_start = Some(project_start);
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Insert a task, replacing any task with the same id.
    pub fn add_task(&mut self, task: Task) -> Result<(), ScheduleError> {
        if task.task_id.trim().is_empty() {
            return Err(ScheduleError::InvalidTask {
                task_id: task.task_id,
                reason: "task_id must be non-empty".to_string(),
            });
        }
        let id = task.task_id.clone();
        self.tasks.upsert(&id, task);
        Ok(())
    }

    /// Insert a dependency, replacing any dependency with the same id.
    ///
    /// Endpoints are not checked here, so dependencies may arrive before
    /// their tasks; unknown endpoints fail at analysis time.
    pub fn add_dependency(&mut self, dependency: TaskDependency) -> Result<(), ScheduleError> {
        dependency.validate()?;
        let id = dependency.dependency_id.clone();
        let successor = dependency.successor_task_id.clone();
        let (index, replaced) = self.dependencies.upsert(&id, dependency);

        if let Some(old) = replaced {
            if let Some(indices) = self.incoming.get_mut(&old.successor_task_id) {
                indices.retain(|&i| i != index);
            }
        }
        self.incoming.entry(successor).or_default().push(index);
        Ok(())
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.get(task_id)
    }

    pub(crate) fn task_index(&self, task_id: &str) -> Option<usize> {
        self.tasks.index_of(task_id)
    }

    /// Tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        self.tasks.as_slice()
    }

    pub fn dependency(&self, dependency_id: &str) -> Option<&TaskDependency> {
        self.dependencies.get(dependency_id)
    }

    /// Dependencies in insertion order.
    pub fn dependencies(&self) -> &[TaskDependency] {
        self.dependencies.as_slice()
    }

    /// Dependencies whose successor is `task_id`.
    pub fn predecessors_of<'a>(
        &'a self,
        task_id: &str,
    ) -> impl Iterator<Item = &'a TaskDependency> + 'a {
        self.incoming
            .get(task_id)
            .map(|indices| indices.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&i| self.dependencies.at(i))
    }

    pub fn project_start(&self) -> Option<NaiveDate> {
        self.project_start
    }

    pub fn risk_config(&self) -> &RiskConfig {
        &self.risk_config
    }

    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Calendar date `offset_days` after the project start, if one is set.
    pub fn date_at(&self, offset_days: i64) -> Option<NaiveDate> {
        let start = self.project_start?;
        if offset_days >= 0 {
            start.checked_add_days(Days::new(offset_days as u64))
        } else {
            start.checked_sub_days(Days::new(offset_days.unsigned_abs()))
        }
    }

    /// Validated graph plus a topological order of its tasks.
    pub(crate) fn ordered_graph(&self) -> Result<(ScheduleGraph, Vec<usize>), ScheduleError> {
        let graph = ScheduleGraph::build(&self.tasks, &self.dependencies)?;
        let order = graph.topological_order().map_err(|stuck| {
            ScheduleError::CycleDetected(
                stuck
                    .into_iter()
                    .map(|i| self.tasks.at(i).task_id.clone())
                    .collect(),
            )
        })?;
        Ok((graph, order))
    }

    /// Compute the critical path without touching stored tasks.
    pub fn compute_critical_path(&self) -> Result<CriticalPathAnalysis, ScheduleError> {
        let (graph, order) = self.ordered_graph()?;
        let passes = schedule_passes(&graph, &order);
        let path = trace_critical_path(&graph, &passes, &order);
        Ok(self.build_analysis(&graph, &passes, &path))
    }

    /// Compute the critical path and record its outputs on the stored records.
    ///
    /// Each task gets its timing and `critical_path_member` (zero slack); each
    /// dependency gets its `criticality_score`.
    pub fn calculate_critical_path(&mut self) -> Result<CriticalPathAnalysis, ScheduleError> {
        let analysis = self.compute_critical_path()?;

        for task in self.tasks.iter_mut() {
            task.timing = analysis.task_timings.get(&task.task_id).copied();
            task.critical_path_member = analysis.critical_tasks.contains(&task.task_id);
        }
        for dep in self.dependencies.iter_mut() {
            if let Some(&score) = analysis.dependency_criticality.get(&dep.dependency_id) {
                dep.criticality_score = score;
            }
        }

        Ok(analysis)
    }

    fn build_analysis(
        &self,
        graph: &ScheduleGraph,
        passes: &SchedulePasses,
        path: &[usize],
    ) -> CriticalPathAnalysis {
        let mut slack_by_task = HashMap::with_capacity(self.tasks.len());
        let mut task_timings = HashMap::with_capacity(self.tasks.len());
        let mut critical_tasks = HashSet::new();
        let mut bottleneck_tasks = Vec::new();

        for (task, timing) in self.tasks.iter().zip(&passes.timings) {
            slack_by_task.insert(task.task_id.clone(), timing.slack);
            task_timings.insert(task.task_id.clone(), *timing);
            log_detail!(
                self.verbosity,
                "{}: es={} ef={} ls={} lf={} slack={}",
                task.task_id,
                timing.earliest_start,
                timing.earliest_finish,
                timing.latest_start,
                timing.latest_finish,
                timing.slack
            );
            if timing.is_critical() {
                critical_tasks.insert(task.task_id.clone());
                if task.is_delay_prone() {
                    bottleneck_tasks.push(task.task_id.clone());
                }
            }
        }

        let mut dependency_criticality = HashMap::with_capacity(self.dependencies.len());
        for edges in &graph.successors {
            for edge in edges {
                let dep = self.dependencies.at(edge.dependency);
                dependency_criticality.insert(
                    dep.dependency_id.clone(),
                    edge_criticality(graph, &passes.timings, edge),
                );
            }
        }

        let critical_path: Vec<String> = path
            .iter()
            .map(|&i| self.tasks.at(i).task_id.clone())
            .collect();

        log_summary!(
            self.verbosity,
            "Critical path: {} ({} days, {} critical tasks, {} bottlenecks)",
            critical_path.join(" -> "),
            passes.project_duration,
            critical_tasks.len(),
            bottleneck_tasks.len()
        );

        CriticalPathAnalysis {
            critical_path,
            project_duration_days: passes.project_duration,
            slack_by_task,
            critical_tasks,
            bottleneck_tasks,
            task_timings,
            dependency_criticality,
            project_finish_date: self.date_at(passes.project_duration),
        }
    }

    /// Score one task's delay risk.
    ///
    /// Dependency risk reads the `criticality_score` stored on incoming
    /// dependencies, so call [`calculate_critical_path`](Self::calculate_critical_path) first.
    pub fn calculate_risk_factors(&self, task_id: &str) -> Result<ScheduleRiskFactors, ScheduleError> {
        let task = self
            .tasks
            .get(task_id)
            .ok_or_else(|| ScheduleError::TaskNotFound(task_id.to_string()))?;
        task.validate()?;
        let criticality = self.predecessors_of(task_id).map(|dep| dep.criticality_score);
        Ok(score_task_risk(task, criticality, &self.risk_config))
    }

    /// Risk factors for every task from stored criticality scores, keyed by task id.
    ///
    /// Fails on the first task that does not validate.
    pub fn calculate_all_risk_factors(
        &self,
    ) -> Result<HashMap<String, ScheduleRiskFactors>, ScheduleError> {
        self.tasks
            .iter()
            .map(|task| {
                task.validate()?;
                let criticality = self
                    .predecessors_of(&task.task_id)
                    .map(|dep| dep.criticality_score);
                Ok((
                    task.task_id.clone(),
                    score_task_risk(task, criticality, &self.risk_config),
                ))
            })
            .collect()
    }

    /// Risk factors for every task, taking dependency criticality from
    /// `analysis` instead of the stored records.
    ///
    /// Dependencies the analysis does not know keep their stored score.
    pub fn risk_factors_from(
        &self,
        analysis: &CriticalPathAnalysis,
    ) -> Result<HashMap<String, ScheduleRiskFactors>, ScheduleError> {
        self.tasks
            .iter()
            .map(|task| {
                task.validate()?;
                let criticality = self.predecessors_of(&task.task_id).map(|dep| {
                    analysis
                        .dependency_criticality
                        .get(&dep.dependency_id)
                        .copied()
                        .unwrap_or(dep.criticality_score)
                });
                Ok((
                    task.task_id.clone(),
                    score_task_risk(task, criticality, &self.risk_config),
                ))
            })
            .collect()
    }
}

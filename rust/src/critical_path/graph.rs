//! Index-based adjacency for the dependency graph.

use std::collections::VecDeque;

use crate::arena::IdArena;
use crate::error::ScheduleError;
use crate::models::{DependencyType, Task, TaskDependency};

/// One dependency resolved to task indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Edge {
    pub predecessor: usize,
    pub successor: usize,
    /// Index of the dependency record in the analyzer's dependency arena.
    pub dependency: usize,
    pub kind: DependencyType,
    pub lag_days: i64,
}

/// Validated graph with predecessor/successor lists indexed by task index.
///
/// Task indices match the analyzer's task arena, so insertion order is index order.
#[derive(Clone, Debug)]
pub(crate) struct ScheduleGraph {
    pub durations: Vec<i64>,
    pub predecessors: Vec<Vec<Edge>>,
    pub successors: Vec<Vec<Edge>>,
}

impl ScheduleGraph {
    /// Validate every record and resolve dependency endpoints to indices.
    pub fn build(
        tasks: &IdArena<Task>,
        dependencies: &IdArena<TaskDependency>,
    ) -> Result<Self, ScheduleError> {
        let n = tasks.len();
        let mut durations = Vec::with_capacity(n);
        for task in tasks.iter() {
            task.validate()?;
            durations.push(task.duration_days);
        }

        let mut predecessors: Vec<Vec<Edge>> = vec![Vec::new(); n];
        let mut successors: Vec<Vec<Edge>> = vec![Vec::new(); n];

        for (index, dep) in dependencies.iter().enumerate() {
            dep.validate()?;
            let resolve = |task_id: &str| {
                tasks
                    .index_of(task_id)
                    .ok_or_else(|| ScheduleError::UnknownTask {
                        dependency_id: dep.dependency_id.clone(),
                        task_id: task_id.to_string(),
                    })
            };
            let predecessor = resolve(&dep.predecessor_task_id)?;
            let successor = resolve(&dep.successor_task_id)?;

            let edge = Edge {
                predecessor,
                successor,
                dependency: index,
                kind: dep.dependency_type,
                lag_days: dep.lag_days,
            };
            predecessors[successor].push(edge);
            successors[predecessor].push(edge);
        }

        Ok(Self {
            durations,
            predecessors,
            successors,
        })
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    /// Kahn's algorithm: predecessors before successors.
    ///
    /// Ready tasks are released in index order, so the result is deterministic.
    /// On failure, returns the indices that could not be ordered (every task on
    /// a cycle plus anything downstream of one), ascending.
    pub fn topological_order(&self) -> Result<Vec<usize>, Vec<usize>> {
        let n = self.len();
        let mut in_degree: Vec<usize> = self.predecessors.iter().map(Vec::len).collect();

        let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut order: Vec<usize> = Vec::with_capacity(n);

        while let Some(task) = queue.pop_front() {
            order.push(task);
            for edge in &self.successors[task] {
                let degree = &mut in_degree[edge.successor];
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(edge.successor);
                }
            }
        }

        if order.len() != n {
            let stuck = (0..n).filter(|&i| in_degree[i] > 0).collect();
            return Err(stuck);
        }

        Ok(order)
    }
}

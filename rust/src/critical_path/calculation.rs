//! Critical path calculation using forward and backward passes.

use super::graph::{Edge, ScheduleGraph};
use super::types::TaskTiming;

/// Timings for every task plus the project makespan.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SchedulePasses {
    /// Indexed like the graph's tasks.
    pub timings: Vec<TaskTiming>,
    pub project_duration: i64,
}

/// Run the forward and backward passes over a topologically ordered graph.
///
/// Tasks with no predecessors start at offset 0 and every start is clamped at
/// 0. Latest finishes are capped at the project duration, so sinks finish by
/// the project end and slack never goes negative.
pub(crate) fn schedule_passes(graph: &ScheduleGraph, order: &[usize]) -> SchedulePasses {
    let mut timings = vec![TaskTiming::default(); graph.len()];

    // Forward pass: earliest start = max over predecessors (per dependency type)
    for &task in order {
        let duration = graph.durations[task];
        let mut earliest_start = 0;
        for edge in &graph.predecessors[task] {
            let pred = &timings[edge.predecessor];
            let required = edge.kind.earliest_successor_start(
                pred.earliest_start,
                pred.earliest_finish,
                duration,
                edge.lag_days,
            );
            if required > earliest_start {
                earliest_start = required;
            }
        }
        timings[task].earliest_start = earliest_start;
        timings[task].earliest_finish = earliest_start + duration;
    }

    let project_duration = timings
        .iter()
        .map(|t| t.earliest_finish)
        .max()
        .unwrap_or(0);

    // Backward pass: latest finish = min over successors (mirror of the forward rules)
    for &task in order.iter().rev() {
        let duration = graph.durations[task];
        let mut latest_finish = project_duration;
        for edge in &graph.successors[task] {
            let succ = &timings[edge.successor];
            let allowed = edge.kind.latest_predecessor_finish(
                succ.latest_start,
                succ.latest_finish,
                duration,
                edge.lag_days,
            );
            if allowed < latest_finish {
                latest_finish = allowed;
            }
        }
        let timing = &mut timings[task];
        timing.latest_finish = latest_finish;
        timing.latest_start = latest_finish - duration;
        timing.slack = timing.latest_start - timing.earliest_start;
    }

    SchedulePasses {
        timings,
        project_duration,
    }
}

/// Days between what an edge requires of its successor's start and where the
/// forward pass actually put it. Zero means the edge drives the successor.
pub(crate) fn edge_float(graph: &ScheduleGraph, timings: &[TaskTiming], edge: &Edge) -> i64 {
    let pred = &timings[edge.predecessor];
    let required = edge.kind.earliest_successor_start(
        pred.earliest_start,
        pred.earliest_finish,
        graph.durations[edge.successor],
        edge.lag_days,
    );
    timings[edge.successor].earliest_start - required
}

/// Criticality of a dependency: 1.0 for a driving edge into a critical task,
/// decaying with the float between the two tasks.
pub(crate) fn edge_criticality(graph: &ScheduleGraph, timings: &[TaskTiming], edge: &Edge) -> f64 {
    let float = edge_float(graph, timings, edge).max(0) + timings[edge.successor].slack;
    1.0 / (1.0 + float as f64)
}

/// Reconstruct the critical path as a chain of zero-slack tasks linked by
/// driving edges, ending at a task that finishes the project.
///
/// When several chains qualify, the one with the greatest cumulative duration
/// wins; remaining ties go to the task inserted first.
pub(crate) fn trace_critical_path(
    graph: &ScheduleGraph,
    passes: &SchedulePasses,
    order: &[usize],
) -> Vec<usize> {
    let timings = &passes.timings;
    let n = graph.len();

    // Longest cumulative duration of a critical chain ending at each task
    let mut chain_length = vec![0i64; n];
    let mut parent: Vec<Option<usize>> = vec![None; n];

    for &task in order {
        if !timings[task].is_critical() {
            continue;
        }
        let mut chosen: Option<usize> = None;
        for edge in &graph.predecessors[task] {
            let pred = edge.predecessor;
            if !timings[pred].is_critical() || edge_float(graph, timings, edge) != 0 {
                continue;
            }
            chosen = match chosen {
                Some(current)
                    if chain_length[pred] < chain_length[current]
                        || (chain_length[pred] == chain_length[current] && pred > current) =>
                {
                    Some(current)
                }
                _ => Some(pred),
            };
        }
        chain_length[task] = graph.durations[task] + chosen.map_or(0, |p| chain_length[p]);
        parent[task] = chosen;
    }

    let mut end: Option<usize> = None;
    for task in 0..n {
        let timing = &timings[task];
        if !timing.is_critical() || timing.earliest_finish != passes.project_duration {
            continue;
        }
        if end.map_or(true, |current| chain_length[task] > chain_length[current]) {
            end = Some(task);
        }
    }

    let mut path = Vec::new();
    let mut cursor = end;
    while let Some(task) = cursor {
        path.push(task);
        cursor = parent[task];
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::IdArena;
    use crate::models::{DependencyType, Task, TaskDependency};

    fn make_graph(
        tasks: &[(&str, i64)],
        deps: &[(&str, &str, DependencyType, i64)],
    ) -> (ScheduleGraph, Vec<usize>) {
        let mut task_arena = IdArena::default();
        for (id, duration) in tasks {
            task_arena.upsert(id, Task::new(*id, *id, *duration));
        }
        let mut dep_arena = IdArena::default();
        for (i, (from, to, kind, lag)) in deps.iter().enumerate() {
            let id = format!("d{}", i);
            dep_arena.upsert(&id, TaskDependency::new(&id, *from, *to, *kind).with_lag(*lag));
        }
        let graph = ScheduleGraph::build(&task_arena, &dep_arena).unwrap();
        let order = graph.topological_order().unwrap();
        (graph, order)
    }

    use DependencyType::*;

    #[test]
    fn test_chain_passes() {
        // a (5) -> b (3) -> c (4)
        let (graph, order) = make_graph(
            &[("a", 5), ("b", 3), ("c", 4)],
            &[("a", "b", FinishToStart, 0), ("b", "c", FinishToStart, 0)],
        );
        let passes = schedule_passes(&graph, &order);

        assert_eq!(passes.project_duration, 12);
        assert_eq!(passes.timings[1].earliest_start, 5);
        assert_eq!(passes.timings[2].earliest_finish, 12);
        assert!(passes.timings.iter().all(|t| t.slack == 0));
        assert_eq!(trace_critical_path(&graph, &passes, &order), vec![0, 1, 2]);
    }

    #[test]
    fn test_diamond_slack() {
        // a -> b -> d, a -> c -> d; path via c is longer
        let (graph, order) = make_graph(
            &[("a", 2), ("b", 3), ("c", 5), ("d", 1)],
            &[
                ("a", "b", FinishToStart, 0),
                ("a", "c", FinishToStart, 0),
                ("b", "d", FinishToStart, 0),
                ("c", "d", FinishToStart, 0),
            ],
        );
        let passes = schedule_passes(&graph, &order);

        assert_eq!(passes.project_duration, 8);
        assert_eq!(passes.timings[1].slack, 2);
        assert_eq!(trace_critical_path(&graph, &passes, &order), vec![0, 2, 3]);
    }

    #[test]
    fn test_lag_and_lead() {
        // a (2) -[+3]-> b (1): 6 days; a (4) -[-2]-> c (3): c starts at 2
        let (graph, order) = make_graph(
            &[("a", 2), ("b", 1)],
            &[("a", "b", FinishToStart, 3)],
        );
        assert_eq!(schedule_passes(&graph, &order).project_duration, 6);

        let (graph, order) = make_graph(
            &[("a", 4), ("c", 3)],
            &[("a", "c", FinishToStart, -2)],
        );
        let passes = schedule_passes(&graph, &order);
        assert_eq!(passes.timings[1].earliest_start, 2);
        assert_eq!(passes.project_duration, 5);
    }

    #[test]
    fn test_start_to_start() {
        // b may start 2 days after a starts; a (10) dominates
        let (graph, order) = make_graph(
            &[("a", 10), ("b", 3)],
            &[("a", "b", StartToStart, 2)],
        );
        let passes = schedule_passes(&graph, &order);

        assert_eq!(passes.timings[1].earliest_start, 2);
        assert_eq!(passes.project_duration, 10);
        assert_eq!(passes.timings[1].slack, 5);
        assert_eq!(passes.timings[0].slack, 0);
        assert_eq!(trace_critical_path(&graph, &passes, &order), vec![0]);
    }

    #[test]
    fn test_finish_to_finish() {
        // b must finish no earlier than 1 day after a finishes
        let (graph, order) = make_graph(
            &[("a", 6), ("b", 2)],
            &[("a", "b", FinishToFinish, 1)],
        );
        let passes = schedule_passes(&graph, &order);

        assert_eq!(passes.timings[1].earliest_start, 5);
        assert_eq!(passes.timings[1].earliest_finish, 7);
        assert_eq!(passes.project_duration, 7);
        assert_eq!(passes.timings[0].slack, 0);
        assert_eq!(trace_critical_path(&graph, &passes, &order), vec![0, 1]);
    }

    #[test]
    fn test_start_to_finish() {
        // b cannot finish until 4 days after a starts
        let (graph, order) = make_graph(
            &[("a", 3), ("b", 2)],
            &[("a", "b", StartToFinish, 4)],
        );
        let passes = schedule_passes(&graph, &order);

        assert_eq!(passes.timings[1].earliest_start, 2);
        assert_eq!(passes.timings[1].earliest_finish, 4);
        assert_eq!(passes.project_duration, 4);
        // a must start at 0 for b to finish by 4
        assert_eq!(passes.timings[0].latest_finish, 3);
        assert_eq!(passes.timings[0].slack, 0);
    }

    #[test]
    fn test_clamped_start_keeps_slack_non_negative() {
        // FF with a long successor would ask for a negative start
        let (graph, order) = make_graph(
            &[("a", 2), ("b", 9)],
            &[("a", "b", FinishToFinish, 0)],
        );
        let passes = schedule_passes(&graph, &order);

        assert_eq!(passes.timings[1].earliest_start, 0);
        assert_eq!(passes.project_duration, 9);
        assert!(passes.timings.iter().all(|t| t.slack >= 0));
        assert_eq!(passes.timings[0].slack, 7);
    }

    #[test]
    fn test_equal_chains_prefer_insertion_order() {
        // Two independent 4-day chains: x1 -> x2 and y1 -> y2
        let (graph, order) = make_graph(
            &[("y1", 2), ("x1", 2), ("y2", 2), ("x2", 2)],
            &[("x1", "x2", FinishToStart, 0), ("y1", "y2", FinishToStart, 0)],
        );
        let passes = schedule_passes(&graph, &order);
        assert_eq!(trace_critical_path(&graph, &passes, &order), vec![0, 2]);
    }

    #[test]
    fn test_longer_cumulative_chain_wins() {
        // Both chains finish at 6; p -> q spends a day of lag, a -> b is all work
        let (graph, order) = make_graph(
            &[("p", 2), ("q", 3), ("a", 3), ("b", 3)],
            &[("p", "q", FinishToStart, 1), ("a", "b", FinishToStart, 0)],
        );
        let passes = schedule_passes(&graph, &order);
        assert_eq!(passes.timings[0].slack, 0);
        assert_eq!(trace_critical_path(&graph, &passes, &order), vec![2, 3]);
    }

    #[test]
    fn test_edge_criticality() {
        let (graph, order) = make_graph(
            &[("a", 5), ("b", 3), ("c", 1)],
            &[("a", "b", FinishToStart, 0), ("a", "c", FinishToStart, 0)],
        );
        let passes = schedule_passes(&graph, &order);

        let driving = graph.successors[0][0];
        let loose = graph.successors[0][1];
        assert!((edge_criticality(&graph, &passes.timings, &driving) - 1.0).abs() < 1e-9);
        // c has 2 days of slack
        assert!((edge_criticality(&graph, &passes.timings, &loose) - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_graph() {
        let (graph, order) = make_graph(&[], &[]);
        let passes = schedule_passes(&graph, &order);
        assert_eq!(passes.project_duration, 0);
        assert!(trace_critical_path(&graph, &passes, &order).is_empty());
    }
}

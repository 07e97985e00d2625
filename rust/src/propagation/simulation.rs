//! Single-seed delay propagation over a scheduled graph.

use std::collections::VecDeque;

use crate::critical_path::calculation::edge_float;
use crate::critical_path::graph::ScheduleGraph;
use crate::critical_path::TaskTiming;
use crate::log_trace;

/// Where the delay went, in task indices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct PropagationTrace {
    /// (task, shift) for the seed and every task pushed back, in topological order.
    pub shifted: Vec<(usize, i64)>,
    /// (task, days) of slack consumed at each task that absorbed delay, one entry per task.
    pub absorbed: Vec<(usize, i64)>,
    pub project_delay: i64,
}

/// Push `delay` days at `seed` through its successors.
///
/// Shifting a predecessor by `s` moves every constraint it places on a
/// successor by `s` regardless of dependency type, so the successor inherits
/// `max(0, s - edge_float)`. Tasks with several delayed predecessors take the
/// largest inherited shift. A task with no successors absorbs whatever fits
/// between its finish and the project finish.
pub(crate) fn propagate_delay(
    graph: &ScheduleGraph,
    timings: &[TaskTiming],
    order: &[usize],
    project_duration: i64,
    seed: usize,
    delay: i64,
    verbosity: u8,
) -> PropagationTrace {
    let n = graph.len();

    // Reachable set from the seed
    let mut reached = vec![false; n];
    reached[seed] = true;
    let mut queue = VecDeque::from([seed]);
    while let Some(task) = queue.pop_front() {
        for edge in &graph.successors[task] {
            if !reached[edge.successor] {
                reached[edge.successor] = true;
                queue.push_back(edge.successor);
            }
        }
    }

    let mut shift = vec![0i64; n];
    shift[seed] = delay;

    let mut trace = PropagationTrace::default();

    for &task in order {
        if !reached[task] {
            continue;
        }
        if task != seed {
            let mut incoming = 0;
            let mut inherited = 0;
            for edge in &graph.predecessors[task] {
                let pred_shift = shift[edge.predecessor];
                if !reached[edge.predecessor] || pred_shift == 0 {
                    continue;
                }
                let carried = pred_shift - edge_float(graph, timings, edge);
                log_trace!(
                    verbosity,
                    "edge {} -> {}: shift {} carries {}",
                    edge.predecessor,
                    task,
                    pred_shift,
                    carried.max(0)
                );
                incoming = incoming.max(pred_shift);
                inherited = inherited.max(carried);
            }
            if incoming == 0 {
                continue;
            }
            shift[task] = inherited.max(0);
            let absorbed = incoming - shift[task];
            if absorbed > 0 {
                trace.absorbed.push((task, absorbed));
            }
        }
        if shift[task] > 0 || task == seed {
            trace.shifted.push((task, shift[task]));
        }
    }

    // Sinks absorb up to the gap between their finish and the project finish
    for &(task, task_shift) in &trace.shifted {
        if task_shift == 0 || !graph.successors[task].is_empty() {
            continue;
        }
        let margin = project_duration - timings[task].earliest_finish;
        let absorbed = task_shift.min(margin);
        if absorbed <= 0 {
            continue;
        }
        // One entry per task: fold into any edge float already taken here
        match trace.absorbed.iter_mut().find(|(t, _)| *t == task) {
            Some((_, days)) => *days += absorbed,
            None => trace.absorbed.push((task, absorbed)),
        }
    }

    trace.project_delay = trace
        .shifted
        .iter()
        .map(|&(task, task_shift)| {
            timings[task].earliest_finish.saturating_add(task_shift) - project_duration
        })
        .max()
        .unwrap_or(0)
        .max(0);

    trace
}

pub(crate) fn plural_days(days: i64) -> &'static str {
    if days == 1 {
        "day"
    } else {
        "days"
    }
}

/// Deterministic one-line account of a trace.
///
/// `task_id` resolves an index to its id.
pub(crate) fn explain<'a>(
    trace: &PropagationTrace,
    seed: usize,
    delay: i64,
    task_id: impl Fn(usize) -> &'a str,
) -> String {
    let mut parts = vec![format!(
        "Task {} delayed by {} {}",
        task_id(seed),
        delay,
        plural_days(delay)
    )];
    for &(task, days) in &trace.absorbed {
        parts.push(format!(
            "absorbed {} {} of slack at {}",
            days,
            plural_days(days),
            task_id(task)
        ));
    }
    if trace.project_delay > 0 {
        parts.push(format!(
            "residual delay of {} {} reaches project finish",
            trace.project_delay,
            plural_days(trace.project_delay)
        ));
    } else {
        parts.push("fully absorbed before project finish".to_string());
    }
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::IdArena;
    use crate::critical_path::calculation::schedule_passes;
    use crate::models::{DependencyType, Task, TaskDependency};

    struct Fixture {
        ids: Vec<String>,
        graph: ScheduleGraph,
        order: Vec<usize>,
        timings: Vec<TaskTiming>,
        project_duration: i64,
    }

    impl Fixture {
        fn new(tasks: &[(&str, i64)], deps: &[(&str, &str, DependencyType, i64)]) -> Self {
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
            let passes = schedule_passes(&graph, &order);
            Self {
                ids: tasks.iter().map(|(id, _)| id.to_string()).collect(),
                graph,
                order,
                timings: passes.timings,
                project_duration: passes.project_duration,
            }
        }

        fn run(&self, seed: usize, delay: i64) -> PropagationTrace {
            propagate_delay(
                &self.graph,
                &self.timings,
                &self.order,
                self.project_duration,
                seed,
                delay,
                0,
            )
        }

        fn explain(&self, seed: usize, delay: i64) -> String {
            let trace = self.run(seed, delay);
            explain(&trace, seed, delay, |i| self.ids[i].as_str())
        }
    }

    const FS: DependencyType = DependencyType::FinishToStart;

    /// A(2) -> B(2) with an independent C(8): B carries 4 days of slack.
    fn absorbing_pair() -> Fixture {
        Fixture::new(&[("A", 2), ("B", 2), ("C", 8)], &[("A", "B", FS, 0)])
    }

    #[test]
    fn test_delay_within_slack_is_absorbed() {
        let fixture = absorbing_pair();
        assert_eq!(fixture.timings[1].slack, 4);

        let trace = fixture.run(0, 3);
        assert_eq!(trace.project_delay, 0);
        assert_eq!(trace.shifted, vec![(0, 3), (1, 3)]);
        assert_eq!(trace.absorbed, vec![(1, 3)]);
    }

    #[test]
    fn test_delay_beyond_slack_reaches_finish() {
        let fixture = absorbing_pair();
        let trace = fixture.run(0, 6);
        assert_eq!(trace.project_delay, 2);
        assert_eq!(trace.absorbed, vec![(1, 4)]);
        assert_eq!(
            fixture.explain(0, 6),
            "Task A delayed by 6 days; absorbed 4 days of slack at B; \
             residual delay of 2 days reaches project finish"
        );
    }

    #[test]
    fn test_edge_float_absorbs_before_successor() {
        // A(2) -> C and B(5) -> C: A's edge has 3 days of float
        let fixture = Fixture::new(
            &[("A", 2), ("B", 5), ("C", 1)],
            &[("A", "C", FS, 0), ("B", "C", FS, 0)],
        );
        let trace = fixture.run(0, 2);
        assert_eq!(trace.shifted, vec![(0, 2)]);
        assert_eq!(trace.absorbed, vec![(2, 2)]);
        assert_eq!(trace.project_delay, 0);

        let trace = fixture.run(0, 5);
        assert_eq!(trace.shifted, vec![(0, 5), (2, 2)]);
        assert_eq!(trace.project_delay, 2);
        assert_eq!(
            fixture.explain(0, 5),
            "Task A delayed by 5 days; absorbed 3 days of slack at C; \
             residual delay of 2 days reaches project finish"
        );
    }

    #[test]
    fn test_critical_chain_passes_everything() {
        let fixture = Fixture::new(
            &[("A", 5), ("B", 3), ("C", 4)],
            &[("A", "B", FS, 0), ("B", "C", FS, 0)],
        );
        let trace = fixture.run(1, 1);
        assert_eq!(trace.shifted, vec![(1, 1), (2, 1)]);
        assert!(trace.absorbed.is_empty());
        assert_eq!(trace.project_delay, 1);
        assert_eq!(
            fixture.explain(1, 1),
            "Task B delayed by 1 day; residual delay of 1 day reaches project finish"
        );
    }

    #[test]
    fn test_upstream_tasks_unaffected() {
        let fixture = Fixture::new(
            &[("A", 5), ("B", 3), ("C", 4)],
            &[("A", "B", FS, 0), ("B", "C", FS, 0)],
        );
        let trace = fixture.run(2, 3);
        assert_eq!(trace.shifted, vec![(2, 3)]);
        assert_eq!(trace.project_delay, 3);
    }

    #[test]
    fn test_start_to_start_with_lag() {
        // A(6) SS+2 -> B(3); C(10) sets the finish. B: es=2 ef=5, slack 5
        let fixture = Fixture::new(
            &[("A", 6), ("B", 3), ("C", 10)],
            &[("A", "B", DependencyType::StartToStart, 2)],
        );
        let trace = fixture.run(0, 7);
        // A finishes at 13 (3 past), B at 12 (2 past)
        assert_eq!(trace.project_delay, 3);
    }

    #[test]
    fn test_zero_delay() {
        let fixture = absorbing_pair();
        let trace = fixture.run(0, 0);
        assert_eq!(trace.shifted, vec![(0, 0)]);
        assert!(trace.absorbed.is_empty());
        assert_eq!(
            fixture.explain(0, 0),
            "Task A delayed by 0 days; fully absorbed before project finish"
        );
    }

    #[test]
    fn test_isolated_task_absorbs_own_slack() {
        let fixture = absorbing_pair();
        // A/B chain finishes at 4 against 8
        let trace = fixture.run(1, 10);
        assert_eq!(trace.absorbed, vec![(1, 4)]);
        assert_eq!(trace.project_delay, 6);
    }

    #[test]
    fn test_finish_to_finish_float_then_sink_margin() {
        // A(2) FF -> B(5): B may start 3 days before the edge requires. D(10) sets the finish.
        let fixture = Fixture::new(
            &[("A", 2), ("B", 5), ("D", 10)],
            &[("A", "B", DependencyType::FinishToFinish, 0)],
        );
        let trace = fixture.run(0, 4);
        assert_eq!(trace.shifted, vec![(0, 4), (1, 1)]);
        assert_eq!(trace.absorbed, vec![(1, 4)]);
        assert_eq!(trace.project_delay, 0);
        assert_eq!(
            fixture.explain(0, 4),
            "Task A delayed by 4 days; absorbed 4 days of slack at B; \
             fully absorbed before project finish"
        );

        let trace = fixture.run(0, 12);
        assert_eq!(trace.shifted, vec![(0, 12), (1, 9)]);
        assert_eq!(trace.project_delay, 4);
    }

    #[test]
    fn test_start_to_finish_carries_predecessor_start() {
        // A(4) SF -> B(3): B's finish is tied to A's start, leaving 3 days of edge float
        let fixture = Fixture::new(
            &[("A", 4), ("B", 3), ("D", 10)],
            &[("A", "B", DependencyType::StartToFinish, 0)],
        );
        let trace = fixture.run(0, 5);
        assert_eq!(trace.shifted, vec![(0, 5), (1, 2)]);
        assert_eq!(trace.absorbed, vec![(1, 5)]);
        assert_eq!(trace.project_delay, 0);

        // A itself now runs 2 days past the finish
        let trace = fixture.run(0, 8);
        assert_eq!(trace.shifted, vec![(0, 8), (1, 5)]);
        assert_eq!(trace.project_delay, 2);
    }

    #[test]
    fn test_huge_delay_saturates() {
        let fixture = absorbing_pair();
        let trace = fixture.run(0, i64::MAX);
        assert_eq!(trace.shifted, vec![(0, i64::MAX), (1, i64::MAX)]);
        assert_eq!(trace.project_delay, i64::MAX - 8);
    }
}


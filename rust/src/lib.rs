//! Rust implementation of delaycast schedule analysis.
//!
//! Critical path analysis, per-task delay risk scoring, and delay propagation
//! over a construction task dependency graph, exposed to Python as `delaycast.rust`.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

mod arena;
mod config;
pub mod critical_path;
mod error;
pub mod logging;
mod models;
pub mod propagation;

pub use arena::IdArena;
pub use config::{PropagationConfig, RiskConfig};
pub use critical_path::{CriticalPathAnalysis, ScheduleAnalyzer, ScheduleRiskFactors, TaskTiming};
pub use error::ScheduleError;
pub use models::{
    ConfidenceLevel, DependencyType, Task, TaskDependency, TaskStatus, MAX_SCHEDULE_DAYS,
};
pub use propagation::{DelayPropagation, DelayPropagationEngine, ProjectScheduleIntelligence};

fn value_error(e: ScheduleError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Load tasks and dependencies into a fresh analyzer.
///
/// Later records replace earlier ones with the same id.
pub fn build_analyzer(
    tasks: Vec<Task>,
    dependencies: Vec<TaskDependency>,
    risk_config: RiskConfig,
    project_start: Option<NaiveDate>,
    verbosity: u8,
) -> Result<ScheduleAnalyzer, ScheduleError> {
    let mut analyzer = ScheduleAnalyzer::new()
        .with_risk_config(risk_config)
        .with_verbosity(verbosity);
    if let Some(start) = project_start {
        analyzer = analyzer.with_project_start(start);
    }
    for task in tasks {
        analyzer.add_task(task)?;
    }
    for dependency in dependencies {
        analyzer.add_dependency(dependency)?;
    }
    Ok(analyzer)
}

/// Compute the critical path, slack, and dependency criticality of a task graph.
///
/// # Arguments
/// * `tasks` - Tasks in insertion order (ties on the critical path go to earlier tasks)
/// * `dependencies` - Dependencies between those tasks
/// * `project_start` - Optional calendar date for day offset 0
/// * `verbosity` - Logging level: 0=silent, 1=summary, 2=detail, 3=trace
///
/// # Raises
/// * ValueError on invalid records, unknown task references, or a dependency cycle
#[pyfunction]
#[pyo3(name = "calculate_critical_path", signature = (tasks, dependencies, project_start=None, verbosity=0))]
fn py_calculate_critical_path(
    tasks: Vec<Task>,
    dependencies: Vec<TaskDependency>,
    project_start: Option<NaiveDate>,
    verbosity: u8,
) -> PyResult<CriticalPathAnalysis> {
    let analyzer = build_analyzer(
        tasks,
        dependencies,
        RiskConfig::default(),
        project_start,
        verbosity,
    )
    .map_err(value_error)?;
    analyzer.compute_critical_path().map_err(value_error)
}

/// Propagate a delay injected at one task through its successors.
///
/// # Raises
/// * ValueError on invalid input, a cycle, an unknown task, or a negative delay
#[pyfunction]
#[pyo3(name = "simulate_task_delay", signature = (tasks, dependencies, task_id, delay_days, verbosity=0))]
fn py_simulate_task_delay(
    tasks: Vec<Task>,
    dependencies: Vec<TaskDependency>,
    task_id: &str,
    delay_days: i64,
    verbosity: u8,
) -> PyResult<DelayPropagation> {
    let analyzer = build_analyzer(tasks, dependencies, RiskConfig::default(), None, verbosity)
        .map_err(value_error)?;
    let analysis = analyzer.compute_critical_path().map_err(value_error)?;
    DelayPropagationEngine::new(&analyzer)
        .simulate_delay(&analysis, task_id, delay_days)
        .map_err(value_error)
}

/// Run the full schedule intelligence pipeline for one project.
///
/// Critical path, per-task risk factors, delay scenarios seeded at the
/// critical path and high-risk tasks, and the aggregated project report.
///
/// # Raises
/// * ValueError on invalid records, unknown task references, or a dependency cycle
#[pyfunction]
#[pyo3(
    name = "analyze_project_schedule",
    signature = (
        project_id,
        project_name,
        tasks,
        dependencies,
        risk_config=None,
        propagation_config=None,
        project_start=None
    )
)]
fn py_analyze_project_schedule(
    project_id: String,
    project_name: String,
    tasks: Vec<Task>,
    dependencies: Vec<TaskDependency>,
    risk_config: Option<RiskConfig>,
    propagation_config: Option<PropagationConfig>,
    project_start: Option<NaiveDate>,
) -> PyResult<ProjectScheduleIntelligence> {
    let propagation_config = propagation_config.unwrap_or_default();
    let analyzer = build_analyzer(
        tasks,
        dependencies,
        risk_config.unwrap_or_default(),
        project_start,
        propagation_config.verbosity,
    )
    .map_err(value_error)?;
    DelayPropagationEngine::new(&analyzer)
        .with_config(propagation_config)
        .analyze(project_id, project_name)
        .map_err(value_error)
}

/// The delaycast.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<TaskStatus>()?;
    m.add_class::<DependencyType>()?;
    m.add_class::<ConfidenceLevel>()?;
    m.add_class::<Task>()?;
    m.add_class::<TaskDependency>()?;

    // Results
    m.add_class::<TaskTiming>()?;
    m.add_class::<CriticalPathAnalysis>()?;
    m.add_class::<ScheduleRiskFactors>()?;
    m.add_class::<DelayPropagation>()?;
    m.add_class::<ProjectScheduleIntelligence>()?;

    // Config types
    m.add_class::<RiskConfig>()?;
    m.add_class::<PropagationConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(py_calculate_critical_path, m)?)?;
    m.add_function(wrap_pyfunction!(py_simulate_task_delay, m)?)?;
    m.add_function(wrap_pyfunction!(py_analyze_project_schedule, m)?)?;

    Ok(())
}

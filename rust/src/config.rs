//! Configuration types for risk scoring and delay propagation.

use pyo3::prelude::*;

/// Constants and weights for per-task risk scoring.
///
/// The combined delay probability is
/// `base(status) + weather_weight * weather + resource_weight * resource
///  + dependency_weight * dependency + complexity_weight * complexity`,
/// clamped to [0, 1].
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct RiskConfig {
    /// Base probability for not-started and in-progress tasks
    #[pyo3(get, set)]
    pub base_delay_probability: f64,
    /// Base probability for tasks on hold
    #[pyo3(get, set)]
    pub on_hold_delay_probability: f64,
    /// Base probability for tasks already marked delayed
    #[pyo3(get, set)]
    pub delayed_delay_probability: f64,
    /// Weather sub-score for weather-dependent tasks
    #[pyo3(get, set)]
    pub weather_risk: f64,
    /// Resource sub-score for resource-constrained tasks
    #[pyo3(get, set)]
    pub resource_risk: f64,
    /// Predecessor count at which the count component of dependency risk saturates
    #[pyo3(get, set)]
    pub dependency_saturation: u32,
    /// Complexity above 1.0 that maps to a full complexity sub-score
    #[pyo3(get, set)]
    pub complexity_span: f64,
    #[pyo3(get, set)]
    pub weather_weight: f64,
    #[pyo3(get, set)]
    pub resource_weight: f64,
    #[pyo3(get, set)]
    pub dependency_weight: f64,
    #[pyo3(get, set)]
    pub complexity_weight: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            base_delay_probability: 0.1,
            on_hold_delay_probability: 0.3,
            delayed_delay_probability: 0.5,
            weather_risk: 0.6,
            resource_risk: 0.5,
            dependency_saturation: 4,
            complexity_span: 1.0,
            weather_weight: 0.35,
            resource_weight: 0.3,
            dependency_weight: 0.2,
            complexity_weight: 0.25,
        }
    }
}

#[pymethods]
impl RiskConfig {
    #[new]
    #[pyo3(signature = (
        base_delay_probability=None,
        on_hold_delay_probability=None,
        delayed_delay_probability=None,
        weather_risk=None,
        resource_risk=None,
        dependency_saturation=None,
        complexity_span=None,
        weather_weight=None,
        resource_weight=None,
        dependency_weight=None,
        complexity_weight=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        base_delay_probability: Option<f64>,
        on_hold_delay_probability: Option<f64>,
        delayed_delay_probability: Option<f64>,
        weather_risk: Option<f64>,
        resource_risk: Option<f64>,
        dependency_saturation: Option<u32>,
        complexity_span: Option<f64>,
        weather_weight: Option<f64>,
        resource_weight: Option<f64>,
        dependency_weight: Option<f64>,
        complexity_weight: Option<f64>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            base_delay_probability: base_delay_probability
                .unwrap_or(defaults.base_delay_probability),
            on_hold_delay_probability: on_hold_delay_probability
                .unwrap_or(defaults.on_hold_delay_probability),
            delayed_delay_probability: delayed_delay_probability
                .unwrap_or(defaults.delayed_delay_probability),
            weather_risk: weather_risk.unwrap_or(defaults.weather_risk),
            resource_risk: resource_risk.unwrap_or(defaults.resource_risk),
            dependency_saturation: dependency_saturation
                .unwrap_or(defaults.dependency_saturation),
            complexity_span: complexity_span.unwrap_or(defaults.complexity_span),
            weather_weight: weather_weight.unwrap_or(defaults.weather_weight),
            resource_weight: resource_weight.unwrap_or(defaults.resource_weight),
            dependency_weight: dependency_weight.unwrap_or(defaults.dependency_weight),
            complexity_weight: complexity_weight.unwrap_or(defaults.complexity_weight),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "RiskConfig(weights=[weather={}, resource={}, dependency={}, complexity={}])",
            self.weather_weight, self.resource_weight, self.dependency_weight, self.complexity_weight
        )
    }
}

/// Configuration for scenario generation and the project intelligence report.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct PropagationConfig {
    /// Combined delay probability above which a task counts as high-risk
    #[pyo3(get, set)]
    pub high_risk_threshold: f64,
    /// Also seed scenarios at high-risk tasks that are off the critical path
    #[pyo3(get, set)]
    pub include_high_risk_tasks: bool,
    /// Recommended buffer is rounded up to a multiple of this many days
    #[pyo3(get, set)]
    pub buffer_granularity_days: i64,
    /// Weight of the high-risk task fraction in integration_risk_score (0 = pure 1 - resilience)
    #[pyo3(get, set)]
    pub high_risk_blend: f64,
    /// Verbosity level: 0=silent, 1=summary, 2=detail, 3=trace.
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            high_risk_threshold: 0.5,
            include_high_risk_tasks: true,
            buffer_granularity_days: 1,
            high_risk_blend: 0.2,
            verbosity: 0,
        }
    }
}

#[pymethods]
impl PropagationConfig {
    #[new]
    #[pyo3(signature = (
        high_risk_threshold=None,
        include_high_risk_tasks=None,
        buffer_granularity_days=None,
        high_risk_blend=None,
        verbosity=0
    ))]
    fn new(
        high_risk_threshold: Option<f64>,
        include_high_risk_tasks: Option<bool>,
        buffer_granularity_days: Option<i64>,
        high_risk_blend: Option<f64>,
        verbosity: u8,
    ) -> Self {
        let defaults = Self::default();
        Self {
            high_risk_threshold: high_risk_threshold.unwrap_or(defaults.high_risk_threshold),
            include_high_risk_tasks: include_high_risk_tasks
                .unwrap_or(defaults.include_high_risk_tasks),
            buffer_granularity_days: buffer_granularity_days
                .unwrap_or(defaults.buffer_granularity_days),
            high_risk_blend: high_risk_blend.unwrap_or(defaults.high_risk_blend),
            verbosity,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "PropagationConfig(high_risk_threshold={}, buffer_granularity_days={}, high_risk_blend={})",
            self.high_risk_threshold, self.buffer_granularity_days, self.high_risk_blend
        )
    }
}

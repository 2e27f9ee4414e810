use serde::{Deserialize, Serialize};

use diasim_metric::MetricConfig;
use diasim_simulator::SimulationConfig;

/// Configuration for [`crate::HypothesisEngine`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub simulation: SimulationConfig,
    pub metric: MetricConfig,
}

impl EngineConfig {
    /// Single-threaded runs and comparisons.
    pub fn sequential() -> Self {
        Self {
            simulation: SimulationConfig::sequential(),
            ..Self::default()
        }
    }

    pub fn with_metric(mut self, metric: MetricConfig) -> Self {
        self.metric = metric;
        self
    }
}

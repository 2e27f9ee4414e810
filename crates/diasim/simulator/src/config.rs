use serde::{Deserialize, Serialize};

/// Execution knobs for [`crate::Simulation`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Minimum lexicon size before rules are applied across etyma in
    /// parallel. Only read with the `parallel` feature.
    pub parallel_threshold: usize,
    /// Emit a debug progress event every this many rules; 0 disables.
    pub progress_interval: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 256,
            progress_interval: 100,
        }
    }
}

impl SimulationConfig {
    /// Never parallelize.
    pub fn sequential() -> Self {
        Self {
            parallel_threshold: usize::MAX,
            ..Self::default()
        }
    }
}

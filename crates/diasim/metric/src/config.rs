use serde::{Deserialize, Serialize};

/// Cost configuration for the feature edit distance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    /// Multiplier applied to insertion and deletion costs.
    pub indel_weight: f64,
    /// Per-feature weights; every feature weighs 1.0 when absent.
    pub feature_weights: Option<Vec<f64>>,
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            indel_weight: 0.5,
            feature_weights: None,
        }
    }
}

impl MetricConfig {
    pub fn weighted(feature_weights: Vec<f64>) -> Self {
        Self {
            feature_weights: Some(feature_weights),
            ..Self::default()
        }
    }

    pub fn with_indel_weight(mut self, indel_weight: f64) -> Self {
        self.indel_weight = indel_weight;
        self
    }
}

use serde::{Deserialize, Serialize};

use diasim_types::{Phone, PhonologicalForm};

use crate::config::MetricConfig;
use crate::error::MetricError;

/// Optimal alignment between two phone sequences.
///
/// Both arrays have the length of the longer sequence. `left[i]` is the
/// position in the right-hand sequence aligned with left phone `i`, or `None`
/// for a deletion; entries past the end of the shorter side are always `None`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    left: Vec<Option<usize>>,
    right: Vec<Option<usize>>,
}

impl Alignment {
    pub fn left_to_right(&self) -> &[Option<usize>] {
        &self.left
    }

    pub fn right_to_left(&self) -> &[Option<usize>] {
        &self.right
    }

    /// Aligned `(left, right)` index pairs in order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.left
            .iter()
            .enumerate()
            .filter_map(|(i, j)| j.map(|j| (i, j)))
    }

    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FedOutcome {
    pub distance: f64,
    pub alignment: Alignment,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Origin,
    Diagonal,
    Up,
    Left,
}

/// Feature edit distance: global alignment where substitutions cost the
/// weighted feature difference and indels cost the weighted feature mass.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureEditDistance {
    indel_weight: f64,
    weights: Option<Vec<f64>>,
}

impl Default for FeatureEditDistance {
    fn default() -> Self {
        Self::new(&MetricConfig::default())
    }
}

impl FeatureEditDistance {
    pub fn new(config: &MetricConfig) -> Self {
        Self {
            indel_weight: config.indel_weight,
            weights: config.feature_weights.clone(),
        }
    }

    pub fn indel_weight(&self) -> f64 {
        self.indel_weight
    }

    fn weight(&self, feature: usize) -> f64 {
        self.weights
            .as_ref()
            .and_then(|w| w.get(feature).copied())
            .unwrap_or(1.0)
    }

    /// Half the weighted absolute difference of the two feature vectors.
    pub fn substitution_cost(&self, a: &Phone, b: &Phone) -> f64 {
        a.features()
            .iter()
            .zip(b.features())
            .enumerate()
            .map(|(i, (x, y))| {
                let diff = (x.as_int() as f64 - y.as_int() as f64).abs();
                self.weight(i) * diff / 2.0
            })
            .sum()
    }

    /// Weighted feature mass, unspecified features counting half.
    pub fn indel_cost(&self, phone: &Phone) -> f64 {
        let mass: f64 = phone
            .features()
            .iter()
            .enumerate()
            .map(|(i, v)| {
                if v.is_specified() {
                    self.weight(i)
                } else {
                    self.weight(i) / 2.0
                }
            })
            .sum();
        self.indel_weight * mass
    }

    pub fn distance(&self, a: &PhonologicalForm, b: &PhonologicalForm) -> Result<f64, MetricError> {
        self.compute(a, b).map(|outcome| outcome.distance)
    }

    /// Align the phone sequences of two forms; boundaries carry no cost.
    pub fn compute(
        &self,
        a: &PhonologicalForm,
        b: &PhonologicalForm,
    ) -> Result<FedOutcome, MetricError> {
        if a.is_absent() || b.is_absent() {
            return Err(MetricError::AbsentForm);
        }
        let left: Vec<&Phone> = a.phones().collect();
        let right: Vec<&Phone> = b.phones().collect();
        self.compute_phones(&left, &right)
    }

    pub fn compute_phones(&self, a: &[&Phone], b: &[&Phone]) -> Result<FedOutcome, MetricError> {
        self.check_features(a, b)?;

        let (n, m) = (a.len(), b.len());
        let width = m + 1;
        let mut cost = vec![0.0_f64; (n + 1) * width];
        let mut step = vec![Step::Origin; (n + 1) * width];

        for i in 1..=n {
            cost[i * width] = cost[(i - 1) * width] + self.indel_cost(a[i - 1]);
            step[i * width] = Step::Up;
        }
        for j in 1..=m {
            cost[j] = cost[j - 1] + self.indel_cost(b[j - 1]);
            step[j] = Step::Left;
        }

        for i in 1..=n {
            for j in 1..=m {
                let diagonal = cost[(i - 1) * width + j - 1] + self.substitution_cost(a[i - 1], b[j - 1]);
                let up = cost[(i - 1) * width + j] + self.indel_cost(a[i - 1]);
                let left = cost[i * width + j - 1] + self.indel_cost(b[j - 1]);
                let (value, chosen) = if diagonal <= up && diagonal <= left {
                    (diagonal, Step::Diagonal)
                } else if up <= left {
                    (up, Step::Up)
                } else {
                    (left, Step::Left)
                };
                cost[i * width + j] = value;
                step[i * width + j] = chosen;
            }
        }

        let longest = n.max(m);
        let mut alignment = Alignment {
            left: vec![None; longest],
            right: vec![None; longest],
        };
        let (mut i, mut j) = (n, m);
        while i > 0 || j > 0 {
            match step[i * width + j] {
                Step::Diagonal => {
                    alignment.left[i - 1] = Some(j - 1);
                    alignment.right[j - 1] = Some(i - 1);
                    i -= 1;
                    j -= 1;
                }
                Step::Up => i -= 1,
                Step::Left => j -= 1,
                Step::Origin => panic!("alignment backtrace reached unfilled cell ({i}, {j})"),
            }
        }

        Ok(FedOutcome {
            distance: cost[n * width + m],
            alignment,
        })
    }

    fn check_features(&self, a: &[&Phone], b: &[&Phone]) -> Result<(), MetricError> {
        let mut expected: Option<usize> = None;
        for phone in a.iter().chain(b) {
            let found = phone.features().len();
            match expected {
                None => {
                    if let Some(weights) = &self.weights {
                        if weights.len() != found {
                            return Err(MetricError::WeightCountMismatch {
                                expected: found,
                                found: weights.len(),
                            });
                        }
                    }
                    expected = Some(found);
                }
                Some(expected) if expected != found => {
                    return Err(MetricError::FeatureCountMismatch { expected, found });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

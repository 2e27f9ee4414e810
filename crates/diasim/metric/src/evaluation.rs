use serde::{Deserialize, Serialize};

use diasim_types::{EtymonId, Lexicon, PhonologicalForm, Segment, Stage};

use crate::distance::phone_edit_distance;
use crate::error::MetricError;
use crate::fed::FeatureEditDistance;

/// Why an etymon could not be scored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Uncomparable {
    AbsentResult,
    AbsentReference,
    BothAbsent,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EtymonScore {
    Compared {
        phone_distance: usize,
        feature_distance: f64,
        reference_phones: usize,
    },
    Uncomparable(Uncomparable),
}

impl EtymonScore {
    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Compared { phone_distance: 0, .. })
    }
}

/// Scores of a result lexicon against a reference lexicon.
///
/// Aggregates cover comparable etyma only and are `None` when there are none.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    scores: Vec<(EtymonId, EtymonScore)>,
}

impl EvaluationReport {
    pub fn scores(&self) -> &[(EtymonId, EtymonScore)] {
        &self.scores
    }

    pub fn score(&self, id: EtymonId) -> Option<&EtymonScore> {
        self.scores
            .binary_search_by_key(&id, |(id, _)| *id)
            .ok()
            .map(|i| &self.scores[i].1)
    }

    fn compared(&self) -> impl Iterator<Item = (EtymonId, usize, f64, usize)> + '_ {
        self.scores.iter().filter_map(|(id, score)| match score {
            EtymonScore::Compared {
                phone_distance,
                feature_distance,
                reference_phones,
            } => Some((*id, *phone_distance, *feature_distance, *reference_phones)),
            EtymonScore::Uncomparable(_) => None,
        })
    }

    pub fn comparable_count(&self) -> usize {
        self.compared().count()
    }

    pub fn uncomparable(&self) -> Vec<(EtymonId, Uncomparable)> {
        self.scores
            .iter()
            .filter_map(|(id, s)| match s {
                EtymonScore::Uncomparable(why) => Some((*id, *why)),
                EtymonScore::Compared { .. } => None,
            })
            .collect()
    }

    fn fraction(&self, pred: impl Fn(usize) -> bool) -> Option<f64> {
        let total = self.comparable_count();
        (total > 0).then(|| {
            let hits = self.compared().filter(|(_, d, _, _)| pred(*d)).count();
            hits as f64 / total as f64
        })
    }

    /// Share of comparable etyma matching their reference exactly.
    pub fn accuracy(&self) -> Option<f64> {
        self.fraction(|d| d == 0)
    }

    /// Share of comparable etyma within `phones` phone edits of the reference.
    pub fn within(&self, phones: usize) -> Option<f64> {
        self.fraction(|d| d <= phones)
    }

    /// Mean phone edit distance normalised by reference length.
    pub fn average_phone_distance(&self) -> Option<f64> {
        let total = self.comparable_count();
        (total > 0).then(|| {
            self.compared()
                .map(|(_, d, _, len)| d as f64 / len.max(1) as f64)
                .sum::<f64>()
                / total as f64
        })
    }

    pub fn average_feature_distance(&self) -> Option<f64> {
        let total = self.comparable_count();
        (total > 0).then(|| self.compared().map(|(_, _, f, _)| f).sum::<f64>() / total as f64)
    }

    /// Comparable etyma that miss their reference.
    pub fn mismatches(&self) -> Vec<EtymonId> {
        self.compared()
            .filter(|(_, d, _, _)| *d > 0)
            .map(|(id, _, _, _)| id)
            .collect()
    }
}

/// Which lexicon a subset query searches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubsetSource {
    Result,
    Reference,
}

fn score_pair(
    got: &PhonologicalForm,
    want: &PhonologicalForm,
    fed: &FeatureEditDistance,
) -> Result<EtymonScore, MetricError> {
    Ok(match (got.is_absent(), want.is_absent()) {
        (true, true) => EtymonScore::Uncomparable(Uncomparable::BothAbsent),
        (true, false) => EtymonScore::Uncomparable(Uncomparable::AbsentResult),
        (false, true) => EtymonScore::Uncomparable(Uncomparable::AbsentReference),
        (false, false) => EtymonScore::Compared {
            phone_distance: phone_edit_distance(got, want)?,
            feature_distance: fed.distance(got, want)?,
            reference_phones: want.phone_count(),
        },
    })
}

fn check_sizes(result: &Lexicon, reference: &Lexicon) -> Result<(), MetricError> {
    if result.len() != reference.len() {
        return Err(MetricError::LexiconSize {
            expected: reference.len(),
            found: result.len(),
        });
    }
    Ok(())
}

/// Score every etymon of `result` against the same id in `reference`.
pub fn evaluate(
    result: &Lexicon,
    reference: &Lexicon,
    fed: &FeatureEditDistance,
) -> Result<EvaluationReport, MetricError> {
    check_sizes(result, reference)?;
    let scores = result
        .iter()
        .zip(reference.forms())
        .map(|((id, got), want)| Ok((id, score_pair(got, want, fed)?)))
        .collect::<Result<Vec<_>, MetricError>>()?;

    let report = EvaluationReport { scores };
    tracing::debug!(
        comparable = report.comparable_count(),
        accuracy = ?report.accuracy(),
        "Lexicon evaluated"
    );
    Ok(report)
}

/// Score only the etyma whose form in `source` contains `sequence`
/// contiguously. Scores keep their original ids.
pub fn evaluate_subset(
    result: &Lexicon,
    reference: &Lexicon,
    sequence: &[Segment],
    source: SubsetSource,
    fed: &FeatureEditDistance,
) -> Result<EvaluationReport, MetricError> {
    if sequence.is_empty() {
        return Err(MetricError::EmptySequence);
    }
    check_sizes(result, reference)?;
    let scores = result
        .iter()
        .zip(reference.forms())
        .filter(|((_, got), want)| match source {
            SubsetSource::Result => got.contains_sequence(sequence),
            SubsetSource::Reference => want.contains_sequence(sequence),
        })
        .map(|((id, got), want)| Ok((id, score_pair(got, want, fed)?)))
        .collect::<Result<Vec<_>, MetricError>>()?;

    let report = EvaluationReport { scores };
    tracing::debug!(
        subset = report.scores().len(),
        source = ?source,
        accuracy = ?report.accuracy(),
        "Lexicon subset evaluated"
    );
    Ok(report)
}

/// Score a stage snapshot against the stage's reference lexicon.
pub fn evaluate_stage(
    stage: &Stage,
    result: &Lexicon,
    fed: &FeatureEditDistance,
) -> Result<EvaluationReport, MetricError> {
    let reference = stage
        .reference()
        .ok_or_else(|| MetricError::NoReference(stage.name().to_string()))?;
    evaluate(result, reference, fed)
}

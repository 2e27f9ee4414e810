/// Errors from distance computation and evaluation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricError {
    #[error("cannot measure distance to an absent form")]
    AbsentForm,
    #[error("phone has {found} features, expected {expected}")]
    FeatureCountMismatch { expected: usize, found: usize },
    #[error("{found} feature weights configured for {expected} features")]
    WeightCountMismatch { expected: usize, found: usize },
    #[error("result lexicon has {found} etyma, reference has {expected}")]
    LexiconSize { expected: usize, found: usize },
    #[error("stage {0} has no reference lexicon")]
    NoReference(String),
    #[error("cannot select etyma by an empty sequence")]
    EmptySequence,
}

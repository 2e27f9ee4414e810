/// Errors raised while building forms, inventories and stage declarations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypesError {
    #[error("unknown phone symbol: {0}")]
    UnknownSymbol(String),
    #[error("unknown feature: {0}")]
    UnknownFeature(String),
    #[error("invalid feature mark '{0}' (expected '+', '-' or '0')")]
    InvalidFeatureMark(char),
    #[error("symbol {symbol} specifies {found} features, inventory has {expected}")]
    FeatureCountMismatch {
        symbol: String,
        expected: usize,
        found: usize,
    },
    #[error("malformed feature matrix: {0}")]
    MalformedMatrix(String),
    #[error("stage {name} at position {position} precedes previous stage position {previous}")]
    StageOrder {
        name: String,
        position: usize,
        previous: usize,
    },
    #[error("stage {name} at position {position} lies past the end of a {cascade_len}-rule cascade")]
    StagePosition {
        name: String,
        position: usize,
        cascade_len: usize,
    },
    #[error("reference lexicon for stage {name} has {found} etyma, input has {expected}")]
    ReferenceSize {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("expected {expected} stage positions, got {found}")]
    StageCount { expected: usize, found: usize },
}

/// Failure reported by a [`crate::RuleCompiler`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("unrecognised rule notation: {0}")]
    Unrecognised(String),
    #[error("rule notation produced no rules: {0}")]
    Empty(String),
}

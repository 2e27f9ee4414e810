#![deny(unsafe_code)]
//! # diasim-metric
//!
//! Distances between word forms and accuracy scoring against reference lexicons.
//!
//! - [`FeatureEditDistance`]: weighted global alignment over tri-valued features
//! - [`phone_edit_distance`]: unweighted edit distance over phones
//! - [`evaluate`] / [`evaluate_stage`]: per-etymon scores and lexicon-level accuracy
//! - [`evaluate_subset`]: the same, restricted to etyma containing a sequence
//! - [`phone_error_profile`]: miss likelihood and mean distances per phone

pub mod config;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod fed;
pub mod phone_errors;

pub use config::MetricConfig;
pub use distance::phone_edit_distance;
pub use error::MetricError;
pub use evaluation::{
    evaluate, evaluate_stage, evaluate_subset, EtymonScore, EvaluationReport, SubsetSource,
    Uncomparable,
};
pub use fed::{Alignment, FeatureEditDistance, FedOutcome};
pub use phone_errors::{phone_error_profile, PhoneErrorProfile, PhoneErrorStats};

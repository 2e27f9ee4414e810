#![deny(unsafe_code)]
//! # diasim-hypothesis
//!
//! Differential hypothesis testing over a sound change cascade.
//!
//! A [`HypothesisEngine`] holds a baseline cascade and a working hypothesis
//! copy. Edits ([`Edit`]) mutate only the hypothesis; a [`RuleIndexMap`]
//! follows rule identity between the two and a [`ProposedChangeLog`] records
//! what changed. [`HypothesisEngine::generate_comparison`] runs both cascades
//! and produces a [`DifferentialReport`]: the merged rule timeline, the
//! divergence point, per-etymon differential derivations and the rule effects
//! gained, lost or blocked by the edits.

pub mod change_log;
pub mod config;
pub mod edit;
pub mod engine;
pub mod error;
pub mod index_map;
pub mod report;
pub mod timeline;

pub use change_log::{ChangeKind, ProposedChange, ProposedChangeLog};
pub use config::EngineConfig;
pub use edit::Edit;
pub use engine::{EngineState, HypothesisEngine};
pub use error::HypothesisError;
pub use index_map::{PositionShift, RuleIndexMap};
pub use report::{AccuracyDelta, ComparisonSummary, DifferentialReport, EffectChanges, Side};
pub use timeline::{GlobalTimeline, Slot, TracePoint};

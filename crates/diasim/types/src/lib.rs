#![deny(unsafe_code)]
//! # diasim-types
//!
//! Core data model for diachronic sound change simulation.
//!
//! - [`PhonologicalForm`]: ordered phones and boundaries, or the absent form
//! - [`Lexicon`]: etyma addressed by stable [`EtymonId`] in insertion order
//! - [`Rule`] / [`RuleRef`]: opaque sound change with identity-based equality
//! - [`Cascade`]: the ordered rule sequence
//! - [`Stage`] / [`Stages`]: gold (reference-bearing) and black checkpoints

pub mod cascade;
pub mod error;
pub mod feature;
pub mod form;
pub mod lexicon;
pub mod rule;
pub mod stage;

pub use cascade::Cascade;
pub use error::{CompileError, TypesError};
pub use feature::{FeatureInventory, FeatureMatrix, FeatureValue};
pub use form::{Boundary, Phone, PhonologicalForm, Segment};
pub use lexicon::{EtymonId, Lexicon};
pub use rule::{Rule, RuleCompiler, RuleRef};
pub use stage::{Stage, StageKind, Stages};

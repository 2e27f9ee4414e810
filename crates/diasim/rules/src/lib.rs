#![deny(unsafe_code)]
//! # diasim-rules
//!
//! Concrete sound changes for DiaSim.
//!
//! [`PhoneRule`] is a closed set of rule shapes (substitution, feature change,
//! deletion, epenthesis, metathesis) with a one-segment context on each side.
//! [`PreparedCompiler`] maps notation to prepared rules and stands in for a
//! full notation parser. [`sample`] builds a small language used by the demo
//! and the integration tests.

pub mod compiler;
pub mod rule;
pub mod sample;

pub use compiler::PreparedCompiler;
pub use rule::{Context, ContextItem, PhoneRule, RuleKind};
pub use sample::SampleLanguage;

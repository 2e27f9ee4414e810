#![deny(unsafe_code)]
//! # diasim-simulator
//!
//! Applies a cascade to a lexicon one rule position at a time. Every etymon
//! receives rule `n` before any etymon receives rule `n + 1`, so stage
//! snapshots are consistent cuts through the cascade.
//!
//! Enable the `parallel` feature to apply each rule across etyma with rayon.

pub mod config;
pub mod derivation;
pub mod error;
pub mod simulation;

pub use config::SimulationConfig;
pub use derivation::{Derivation, DerivationStep, Waypoint};
pub use error::SimulationError;
pub use simulation::Simulation;

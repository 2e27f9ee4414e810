use diasim_simulator::SimulationError;
use diasim_types::{CompileError, TypesError};

/// Rejections from the hypothesis engine. A rejected operation leaves the
/// engine exactly as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HypothesisError {
    #[error("{operation} position {position} out of range for a {len}-rule hypothesis cascade")]
    PositionOutOfRange {
        operation: &'static str,
        position: usize,
        len: usize,
    },
    #[error("{0} requires at least one rule")]
    NoRules(&'static str),
    #[error("relocating rule {0} onto its own position")]
    NoOpRelocation(usize),
    #[error("rule compilation failed: {0}")]
    Compile(#[from] CompileError),
    #[error("simulation failed: {0}")]
    Simulation(#[from] SimulationError),
    #[error("stage update failed: {0}")]
    Stage(#[from] TypesError),
}

use diasim_types::TypesError;

/// Errors from setting up or driving a simulation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("invalid stage declaration: {0}")]
    Stage(#[from] TypesError),
    #[error("all {rules} rules already applied")]
    AlreadyComplete { rules: usize },
}

use thiserror::Error;

/// Errors surfaced by a simulation call.
///
/// The same type is returned whether the core ran inline or on the
/// dispatcher's background thread.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Malformed or out-of-range input. Raised before any trial runs.
    #[error("invalid simulation parameters: {0}")]
    InvalidParameters(String),
    /// Unexpected fault while trials were executing
    #[error("simulation failed: {0}")]
    ComputationFailure(String),
    /// The run was superseded or cancelled before it finished
    #[error("simulation cancelled")]
    Cancelled,
}

impl SimulationError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SimulationError::InvalidParameters(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;

use std::io;

use fireplan_core::error::SimulationError;
use thiserror::Error;

/// Failures of the dispatcher itself, as opposed to the simulation it runs
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to spawn simulation worker: {0}")]
    Spawn(#[source] io::Error),
    #[error("simulation worker is not running")]
    WorkerUnavailable,
}

/// Callers handle one failure type whether the core ran inline or in the
/// background.
impl From<DispatchError> for SimulationError {
    fn from(err: DispatchError) -> Self {
        SimulationError::ComputationFailure(err.to_string())
    }
}

/// Errors reading or writing scenario files
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario file I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid scenario YAML: {0}")]
    Parse(#[from] serde_saphyr::Error),
    #[error("failed to write scenario YAML: {0}")]
    Write(#[from] serde_saphyr::ser::Error),
    #[error("failed to encode scenario record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no saved scenario named {0:?}")]
    NotFound(String),
}

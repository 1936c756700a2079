//! Host-side layer over `fireplan_core`
//!
//! - [`worker`]: background dispatcher that keeps the caller responsive and
//!   delivers only the newest request's outcome
//! - [`scenario`]: saved-scenario comparison, persistence records and YAML files
//! - [`logging`]: file-based `tracing` setup
//!
//! ```ignore
//! use fireplan::worker::SimulationDispatcher;
//! use fireplan_core::model::SimulationParams;
//!
//! let dispatcher = SimulationDispatcher::new()?;
//! dispatcher.submit(SimulationParams::default())?;
//! // ... keep the UI loop going, polling:
//! if let Some(outcome) = dispatcher.try_recv() {
//!     let result = outcome.result?;
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod logging;
pub mod scenario;
pub mod worker;

#[cfg(test)]
mod tests;

pub use config::{DispatcherConfig, LoggingConfig};
pub use error::{DispatchError, ScenarioError};
pub use logging::init_logging;
pub use scenario::{ComparisonRow, SavedScenario, ScenarioBook, ScenarioFile, ScenarioRecord};
pub use worker::{DispatchOutcome, DispatchState, RequestId, SimulationDispatcher};

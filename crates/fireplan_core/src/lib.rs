//! Monte Carlo retirement projection engine
//!
//! This crate projects a household portfolio forward under random annual
//! returns and summarizes thousands of simulated paths. It supports:
//! - A two-asset (equity/bond) normal return model
//! - Life events (quit, layoff, college, purchase, windfall, expense) matched by calendar year
//! - Inflation-indexed pre-retirement spending and a fixed retirement baseline
//! - Nearest-rank percentile bands (p10..p90) and a success rate
//! - Seeded, thread-count independent reproducibility
//!
//! ```ignore
//! use fireplan_core::model::{LifeEvent, LifeEventKind, SimulationParams};
//! use fireplan_core::simulation::simulate_seeded;
//!
//! let params = SimulationParams {
//!     life_events: vec![LifeEvent::new(LifeEventKind::Quit, 2032)],
//!     ..Default::default()
//! };
//! let result = simulate_seeded(&params, 42)?;
//! println!("success rate: {:.1}%", result.success_rate * 100.0);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod error;
pub mod market;
pub mod metrics;
pub mod percentiles;
pub mod simulation;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use error::SimulationError;
pub use model::{
    LifeEvent, LifeEventKind, PercentileBands, SimulationParams, SimulationProgress,
    SimulationResult,
};
pub use simulation::{simulate, simulate_seeded};

//! Tests for the fireplan simulation engine
//!
//! Tests are organized by topic:
//! - `basic` - Trial mechanics, failure handling, determinism, progress
//! - `life_events` - Event application rules and calendar matching
//! - `properties` - Randomized invariants over valid parameter sets

mod life_events;

use crate::market::FixedShock;
use crate::model::SimulationParams;
use crate::simulation::simulate_with_sampler;

/// Parameters with zero returns, zero inflation and a single trial, so the
/// p50 band is exactly the one simulated path.
pub(crate) fn flat_params(years: u32) -> SimulationParams {
    SimulationParams {
        starting_portfolio: 500_000.0,
        annual_contribution: 0.0,
        annual_spend: 0.0,
        retirement_spend: 0.0,
        equity_pct: 0.0,
        bond_pct: 0.0,
        inflation_rate: 0.0,
        years,
        fire_number: 1_000_000.0,
        life_events: vec![],
        num_simulations: 1,
        start_calendar_year: 2026,
        seed: None,
    }
}

/// The single path produced with a fixed shock for every draw
pub(crate) fn fixed_path(params: &SimulationParams, z: f64) -> Vec<f64> {
    simulate_with_sampler(params, |_| FixedShock(z))
        .unwrap()
        .percentiles
        .p50
}

pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

pub(crate) fn assert_path(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "path length mismatch");
    for (a, e) in actual.iter().zip(expected) {
        assert_close(*a, *e);
    }
}

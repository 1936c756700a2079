//! Derived metrics computed from a finished simulation.
//!
//! These use `fire_number` and the calendar anchor, neither of which affect
//! the percentile math itself.

use serde::{Deserialize, Serialize};

use crate::model::{SimulationParams, SimulationResult};

/// First calendar year whose value in `band` reaches `target`
fn first_year_reaching(band: &[f64], target: f64, start_calendar_year: i32) -> Option<i32> {
    band.iter()
        .position(|v| *v >= target)
        .and_then(|idx| i32::try_from(idx).ok())
        .and_then(|idx| start_calendar_year.checked_add(idx))
}

/// Calendar year the median path first reaches the FIRE number
pub fn fire_year(result: &SimulationResult, params: &SimulationParams) -> Option<i32> {
    first_year_reaching(
        &result.percentiles.p50,
        params.fire_number,
        params.start_calendar_year,
    )
}

/// Calendar year the 25th percentile path first reaches the FIRE number
pub fn conservative_fire_year(result: &SimulationResult, params: &SimulationParams) -> Option<i32> {
    first_year_reaching(
        &result.percentiles.p25,
        params.fire_number,
        params.start_calendar_year,
    )
}

/// Compact summary of a run, as stored alongside saved scenarios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub success_rate: f64,
    pub median_final_value: f64,
    pub p10_final_value: f64,
    pub fire_year: Option<i32>,
    pub conservative_fire_year: Option<i32>,
}

impl ResultSummary {
    pub fn new(result: &SimulationResult, params: &SimulationParams) -> Self {
        Self {
            success_rate: result.success_rate,
            median_final_value: result.median_final_value,
            p10_final_value: result.p10_final_value(),
            fire_year: fire_year(result, params),
            conservative_fire_year: conservative_fire_year(result, params),
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

use super::events::LifeEvent;

/// Calendar year that simulated year 0 corresponds to when none is given
pub const DEFAULT_START_CALENDAR_YEAR: i32 = 2026;

/// Input to a simulation run.
///
/// `equity_pct + bond_pct` is expected to equal 1. This is the caller's
/// responsibility; the core only checks that each weight lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParams {
    pub starting_portfolio: f64,
    /// Yearly net savings while still employed
    pub annual_contribution: f64,
    /// Pre-retirement withdrawal baseline, grown by `inflation_rate` every year
    pub annual_spend: f64,
    /// Post-retirement withdrawal baseline. Not inflation adjusted.
    pub retirement_spend: f64,
    pub equity_pct: f64,
    pub bond_pct: f64,
    pub inflation_rate: f64,
    pub years: u32,
    /// Target portfolio value. Only used by derived metrics.
    pub fire_number: f64,
    #[serde(default)]
    pub life_events: Vec<LifeEvent>,
    pub num_simulations: u32,
    /// Calendar year of simulated year 0; events match `start_calendar_year + year`
    #[serde(default = "default_start_calendar_year")]
    pub start_calendar_year: i32,
    /// Master seed for reproducible runs (None = fresh entropy per call)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_start_calendar_year() -> i32 {
    DEFAULT_START_CALENDAR_YEAR
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            starting_portfolio: 3_360_000.0,
            annual_contribution: 85_000.0,
            annual_spend: 120_000.0,
            retirement_spend: 96_000.0,
            equity_pct: 0.8,
            bond_pct: 0.2,
            inflation_rate: 0.03,
            years: 25,
            fire_number: 3_000_000.0,
            life_events: vec![],
            num_simulations: 2_000,
            start_calendar_year: DEFAULT_START_CALENDAR_YEAR,
            seed: None,
        }
    }
}

impl SimulationParams {
    /// Calendar year for a simulated year index (0 = start)
    #[inline]
    pub fn calendar_year(&self, year_index: u32) -> i32 {
        self.start_calendar_year.saturating_add_unsigned(year_index)
    }

    /// Life events that fire in the given calendar year, in list order
    pub fn events_in(&self, calendar_year: i32) -> impl Iterator<Item = &LifeEvent> {
        self.life_events
            .iter()
            .filter(move |e| e.year == calendar_year)
    }

    /// Check preconditions. Runs before any trial so a bad input never
    /// produces partial output.
    pub fn validate(&self) -> Result<()> {
        if self.years < 1 {
            return Err(SimulationError::invalid("years must be at least 1"));
        }
        if self.num_simulations < 1 {
            return Err(SimulationError::invalid(
                "num_simulations must be at least 1",
            ));
        }

        let money = [
            ("starting_portfolio", self.starting_portfolio),
            ("annual_contribution", self.annual_contribution),
            ("annual_spend", self.annual_spend),
            ("retirement_spend", self.retirement_spend),
            ("inflation_rate", self.inflation_rate),
            ("fire_number", self.fire_number),
        ];
        for (name, value) in money {
            if !value.is_finite() {
                return Err(SimulationError::invalid(format!(
                    "{name} must be finite (got {value})"
                )));
            }
        }

        if self.starting_portfolio < 0.0 {
            return Err(SimulationError::invalid(format!(
                "starting_portfolio must be non-negative (got {})",
                self.starting_portfolio
            )));
        }

        for (name, weight) in [("equity_pct", self.equity_pct), ("bond_pct", self.bond_pct)] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(SimulationError::invalid(format!(
                    "{name} must be within [0, 1] (got {weight})"
                )));
            }
        }

        for event in &self.life_events {
            if let Some((key, value)) = event.params.iter().find(|(_, v)| !v.is_finite()) {
                return Err(SimulationError::invalid(format!(
                    "life event {} has non-finite parameter {key} = {value}",
                    event.id
                )));
            }
        }

        Ok(())
    }
}

//! Life events: one-time or state-changing cash-flow shocks
//!
//! Events are matched against the simulated calendar year and applied in the
//! order they appear in [`SimulationParams::life_events`](super::SimulationParams).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of life event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifeEventKind {
    /// Voluntary retirement. Switches the trial to retirement spending.
    Quit,
    /// Involuntary job loss. Same policy switch as `Quit`.
    Layoff,
    /// Tuition for the year, net of 529 plan money
    College,
    /// Large one-time purchase (down payment)
    Purchase,
    /// One-time inflow
    Windfall,
    /// One-time outflow
    Expense,
}

impl LifeEventKind {
    pub const ALL: [LifeEventKind; 6] = [
        LifeEventKind::Quit,
        LifeEventKind::College,
        LifeEventKind::Layoff,
        LifeEventKind::Windfall,
        LifeEventKind::Expense,
        LifeEventKind::Purchase,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LifeEventKind::Quit => "quit",
            LifeEventKind::Layoff => "layoff",
            LifeEventKind::College => "college",
            LifeEventKind::Purchase => "purchase",
            LifeEventKind::Windfall => "windfall",
            LifeEventKind::Expense => "expense",
        }
    }

    /// Human-readable label used when an event has none of its own
    pub fn label(self) -> &'static str {
        match self {
            LifeEventKind::Quit => "Quit / Retire",
            LifeEventKind::Layoff => "Layoff",
            LifeEventKind::College => "Child College",
            LifeEventKind::Purchase => "Home Purchase",
            LifeEventKind::Windfall => "Windfall",
            LifeEventKind::Expense => "Major Expense",
        }
    }

    /// Starting parameters for a newly created event of this kind
    pub fn default_params(self) -> BTreeMap<String, f64> {
        let pairs: &[(&str, f64)] = match self {
            LifeEventKind::College => &[("annualCost", 55_000.0), ("plan529", 20_000.0)],
            LifeEventKind::Windfall => &[("amount", 100_000.0)],
            LifeEventKind::Expense => &[("amount", 50_000.0)],
            LifeEventKind::Purchase => &[("downPayment", 200_000.0)],
            LifeEventKind::Quit => &[("severance", 0.0)],
            LifeEventKind::Layoff => &[("severance", 50_000.0)],
        };
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }
}

impl fmt::Display for LifeEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-authored shock applied in a specific calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LifeEventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Calendar year the event fires in
    pub year: i32,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

impl LifeEvent {
    /// Create an event with the kind's default parameters
    pub fn new(kind: LifeEventKind, year: i32) -> Self {
        Self {
            id: format!("{kind}-{year}"),
            kind,
            label: None,
            year,
            params: kind.default_params(),
        }
    }

    /// Create an event with no parameters; every lookup falls back to its default
    pub fn bare(kind: LifeEventKind, year: i32) -> Self {
        Self {
            params: BTreeMap::new(),
            ..Self::new(kind, year)
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: f64) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    pub fn param(&self, key: &str) -> Option<f64> {
        self.params.get(key).copied()
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.kind.label())
    }
}

//! Saved scenarios: side-by-side comparison and the persistence record.
//!
//! Storing records is the job of an external endpoint that accepts
//! `{name, params, resultSummary}`; this module only builds and (de)serializes
//! them, plus a YAML scenario file for local use.

use std::fs;
use std::path::Path;

use fireplan_core::metrics::ResultSummary;
use fireplan_core::model::{LifeEvent, SimulationParams, SimulationResult};
use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;

/// A named snapshot of parameters and their simulated outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedScenario {
    pub name: String,
    pub params: SimulationParams,
    pub result: SimulationResult,
    pub saved_at: jiff::Timestamp,
}

impl SavedScenario {
    /// Record shape accepted by the scenario persistence endpoint
    pub fn record(&self) -> ScenarioRecord {
        ScenarioRecord {
            name: self.name.clone(),
            params: self.params.clone(),
            result_summary: ResultSummary::new(&self.result, &self.params),
        }
    }
}

/// Payload for the external save operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRecord {
    pub name: String,
    pub params: SimulationParams,
    pub result_summary: ResultSummary,
}

impl ScenarioRecord {
    pub fn to_json(&self) -> Result<String, ScenarioError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// One row of the scenario comparison table
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub name: String,
    pub success_rate: f64,
    pub median_final_value: f64,
    pub p10_final_value: f64,
}

impl ComparisonRow {
    fn new(name: impl Into<String>, result: &SimulationResult) -> Self {
        Self {
            name: name.into(),
            success_rate: result.success_rate,
            median_final_value: result.median_final_value,
            p10_final_value: result.p10_final_value(),
        }
    }
}

/// Ordered collection of saved scenarios
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBook {
    #[serde(default)]
    scenarios: Vec<SavedScenario>,
}

impl ScenarioBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scenarios(&self) -> &[SavedScenario] {
        &self.scenarios
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Name the next saved scenario would get: `Scenario N`, followed by the
    /// event labels in parentheses when there are any.
    pub fn next_name(&self, events: &[LifeEvent]) -> String {
        let n = self.scenarios.len() + 1;
        if events.is_empty() {
            format!("Scenario {n}")
        } else {
            let labels: Vec<&str> = events.iter().map(LifeEvent::display_label).collect();
            format!("Scenario {n} ({})", labels.join(", "))
        }
    }

    /// Save the current parameters and result under an auto-generated name
    pub fn save(&mut self, params: SimulationParams, result: SimulationResult) -> &SavedScenario {
        let name = self.next_name(&params.life_events);
        tracing::info!(scenario = %name, success_rate = result.success_rate, "Saving scenario");
        let idx = self.scenarios.len();
        self.scenarios.push(SavedScenario {
            name,
            params,
            result,
            saved_at: jiff::Timestamp::now(),
        });
        &self.scenarios[idx]
    }

    pub fn get(&self, name: &str) -> Option<&SavedScenario> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    pub fn remove(&mut self, name: &str) -> Result<SavedScenario, ScenarioError> {
        let idx = self
            .scenarios
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| ScenarioError::NotFound(name.to_string()))?;
        Ok(self.scenarios.remove(idx))
    }

    /// Rows for every saved scenario, followed by a `Current` row when given
    pub fn comparison(&self, current: Option<&SimulationResult>) -> Vec<ComparisonRow> {
        self.scenarios
            .iter()
            .map(|s| ComparisonRow::new(s.name.clone(), &s.result))
            .chain(current.map(|r| ComparisonRow::new("Current", r)))
            .collect()
    }
}

/// On-disk scenario file: the working parameters and the saved scenarios
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub params: SimulationParams,
    #[serde(default)]
    pub book: ScenarioBook,
}

impl ScenarioFile {
    pub fn from_yaml(yaml: &str) -> Result<Self, ScenarioError> {
        Ok(serde_saphyr::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> Result<String, ScenarioError> {
        Ok(serde_saphyr::to_string(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content = fs::read_to_string(path)?;
        let file = Self::from_yaml(&content)?;
        tracing::debug!(path = %path.display(), scenarios = file.book.len(), "Loaded scenario file");
        Ok(file)
    }

    pub fn save(&self, path: &Path) -> Result<(), ScenarioError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }
}

//! Dispatcher configuration

use serde::{Deserialize, Serialize};

/// Settings for a [`SimulationDispatcher`](crate::worker::SimulationDispatcher)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Name given to the background thread
    pub thread_name: String,
    /// Seed used when a request carries none (None = fresh entropy per run)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_seed: Option<u64>,
    /// Largest trial count the worker will accept
    pub max_simulations: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            thread_name: "fireplan-sim".to_string(),
            default_seed: None,
            max_simulations: 100_000,
        }
    }
}

impl DispatcherConfig {
    /// Load from YAML string. Missing fields take their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_saphyr::ser::Error> {
        serde_saphyr::to_string(self)
    }
}

/// Settings for the file log installed by [`init_logging`](crate::logging::init_logging)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for the `fireplan` target when `RUST_LOG` is unset
    pub level: String,
    /// Log size that triggers trimming at startup
    pub max_bytes: u64,
    /// Tail kept after trimming
    pub keep_bytes: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            max_bytes: 5 * 1024 * 1024,
            keep_bytes: 1024 * 1024,
        }
    }
}

impl LoggingConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }
}

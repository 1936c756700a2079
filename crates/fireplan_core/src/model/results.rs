//! Simulation results and progress tracking

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

/// Per-year percentile bands across all trials.
///
/// Every series has one entry per year index `0..=years`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PercentileBands {
    pub p10: Vec<f64>,
    pub p25: Vec<f64>,
    pub p50: Vec<f64>,
    pub p75: Vec<f64>,
    pub p90: Vec<f64>,
}

impl PercentileBands {
    pub fn with_capacity(len: usize) -> Self {
        Self {
            p10: Vec::with_capacity(len),
            p25: Vec::with_capacity(len),
            p50: Vec::with_capacity(len),
            p75: Vec::with_capacity(len),
            p90: Vec::with_capacity(len),
        }
    }

    /// Number of year entries in each band
    pub fn len(&self) -> usize {
        self.p50.len()
    }

    pub fn is_empty(&self) -> bool {
        self.p50.is_empty()
    }

    /// The five bands in ascending percentile order
    pub fn series(&self) -> [(f64, &[f64]); 5] {
        [
            (0.10, self.p10.as_slice()),
            (0.25, self.p25.as_slice()),
            (0.50, self.p50.as_slice()),
            (0.75, self.p75.as_slice()),
            (0.90, self.p90.as_slice()),
        ]
    }
}

/// Summary of a Monte Carlo run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub percentiles: PercentileBands,
    /// Share of trials whose balance never dropped to zero or below
    pub success_rate: f64,
    /// Median balance at the horizon (`percentiles.p50[years]`)
    pub median_final_value: f64,
}

impl SimulationResult {
    /// Final-year value of the 10th percentile band
    pub fn p10_final_value(&self) -> f64 {
        self.percentiles.p10.last().copied().unwrap_or(0.0)
    }

    pub fn years(&self) -> usize {
        self.percentiles.len().saturating_sub(1)
    }
}

/// Progress tracking and cooperative cancellation for a running simulation.
///
/// Clones share the same counters, so a caller can hold one while the
/// simulation thread holds another.
#[derive(Debug, Clone, Default)]
pub struct SimulationProgress {
    completed: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
}

impl SimulationProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from existing atomics (for dispatcher integration)
    pub fn from_atomics(completed: Arc<AtomicUsize>, cancelled: Arc<AtomicBool>) -> Self {
        Self {
            completed,
            cancelled,
        }
    }

    /// Number of finished trials
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

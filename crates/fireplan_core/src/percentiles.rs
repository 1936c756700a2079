//! Nearest-rank percentile aggregation across trials
//!
//! Rank is `floor(n * p)`, zero-indexed into the ascending-sorted values.
//! No interpolation is performed.

use crate::model::PercentileBands;

/// Percentiles reported for every simulated year
pub const PERCENTILES: [f64; 5] = [0.10, 0.25, 0.50, 0.75, 0.90];

/// Zero-based nearest-rank index for `n` sorted values
#[inline]
pub fn rank_index(n: usize, p: f64) -> usize {
    let rank = (n as f64 * p).floor() as usize;
    rank.min(n.saturating_sub(1))
}

/// Value at percentile `p` of an ascending-sorted slice
#[inline]
pub fn nearest_rank(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    Some(sorted[rank_index(sorted.len(), p)])
}

/// Year-indexed collection of trial values, filled one trial path at a time.
#[derive(Debug, Clone)]
pub struct YearColumns {
    columns: Vec<Vec<f64>>,
}

impl YearColumns {
    /// `years + 1` columns, each with room for `trials` values
    pub fn new(years: usize, trials: usize) -> Self {
        Self {
            columns: (0..=years).map(|_| Vec::with_capacity(trials)).collect(),
        }
    }

    /// Fold one trial's path into the columns. The path must cover every year.
    pub fn push_path(&mut self, path: &[f64]) {
        debug_assert_eq!(path.len(), self.columns.len());
        for (column, value) in self.columns.iter_mut().zip(path) {
            column.push(*value);
        }
    }

    /// Sort each year and read off the standard bands
    pub fn into_bands(mut self) -> PercentileBands {
        let mut bands = PercentileBands::with_capacity(self.columns.len());
        for column in &mut self.columns {
            column.sort_unstable_by(f64::total_cmp);
            let sorted: &[f64] = column;
            let [p10, p25, p50, p75, p90] =
                PERCENTILES.map(|p| nearest_rank(sorted, p).unwrap_or(0.0));
            bands.p10.push(p10);
            bands.p25.push(p25);
            bands.p50.push(p50);
            bands.p75.push(p75);
            bands.p90.push(p90);
        }
        bands
    }
}

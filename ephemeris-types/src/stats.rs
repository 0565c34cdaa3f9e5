use serde::{Deserialize, Serialize};

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of tracked entities
    pub entity_count: usize,
    /// Total number of samples across all entities
    pub sample_count: usize,
    /// Sample count of the largest series
    pub largest_series: usize,
    /// Entities whose mean sampling interval is currently memoized
    pub memoized_intervals: usize,
    /// Entities whose sample index currently violates the height bound
    pub unbalanced_series: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one series into the totals.
    pub fn record_series(&mut self, len: usize, interval_memoized: bool, balanced: bool) {
        self.entity_count += 1;
        self.sample_count += len;
        self.largest_series = self.largest_series.max(len);
        if interval_memoized {
            self.memoized_intervals += 1;
        }
        if !balanced {
            self.unbalanced_series += 1;
        }
    }

    /// Mean samples per entity, 0 when nothing is tracked.
    pub fn mean_series_len(&self) -> f64 {
        if self.entity_count == 0 {
            0.0
        } else {
            self.sample_count as f64 / self.entity_count as f64
        }
    }
}

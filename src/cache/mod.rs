//! Time-windowed sample cache.
//!
//! Answers "what was entity E doing at time T" from a stream of timestamped
//! samples. Each entity gets its own [`IntervalIndex`](crate::IntervalIndex)
//! keyed by time, so a query between two samples is answered with the earlier
//! one. Past the last sample the answer is held only for a staleness window,
//! by default the entity's mean sampling interval.

mod series;

use crate::config::{CacheConfig, StalenessPolicy};
use crate::error::{CacheError, IndexError, Result};
use ephemeris_types::{CacheStats, Epoch, Timestamped};
use rustc_hash::FxHashMap;
use series::Series;

/// Per-entity store of timestamped samples.
///
/// Single-threaded: interval memoization uses interior mutability, so the
/// cache is `!Sync`. Wrap it in a lock to share it between threads.
///
/// # Examples
///
/// ```
/// use ephemeris::SampleCache;
///
/// let mut cache = SampleCache::new();
/// cache.add("G01", 1.5, "first")?;
/// cache.add("G01", 3.0, "second")?;
///
/// assert_eq!(cache.get("G01", 1.7), Some(&"first"));
/// assert_eq!(cache.data_interval("G01"), 1.5);
/// assert_eq!(cache.get("G01", 3.5), Some(&"second"));
/// assert_eq!(cache.get("G01", 20.0), None);
/// # Ok::<(), ephemeris::CacheError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SampleCache<S> {
    series: FxHashMap<String, Series<S>>,
    config: CacheConfig,
}

impl<S> SampleCache<S> {
    /// Create an empty cache with default configuration.
    pub fn new() -> Self {
        Self::from_validated(CacheConfig::default())
    }

    /// Create an empty cache with the given configuration.
    ///
    /// Fails with [`CacheError::InvalidConfig`] when the configuration does
    /// not validate, e.g. a NaN staleness tolerance.
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        config.validate().map_err(CacheError::InvalidConfig)?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: CacheConfig) -> Self {
        Self {
            series: FxHashMap::with_capacity_and_hasher(
                config.entity_capacity,
                Default::default(),
            ),
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Store `sample` for `entity` at `timestamp` seconds.
    ///
    /// The entity's series is created on first use. A second sample at the
    /// same timestamp is rejected and the first one kept.
    pub fn add(&mut self, entity: &str, timestamp: f64, sample: S) -> Result<()> {
        if !timestamp.is_finite() {
            log::warn!(
                "Rejecting sample for '{}' with non-finite timestamp {}",
                entity,
                timestamp
            );
            return Err(CacheError::InvalidTimestamp(timestamp));
        }

        let series = self.series.entry(entity.to_string()).or_insert_with(|| {
            log::debug!("Tracking new entity '{}'", entity);
            Series::new()
        });

        series
            .insert(Epoch::from_seconds(timestamp), sample)
            .map_err(|e| match e {
                IndexError::DuplicateKey => CacheError::DuplicateTimestamp {
                    entity: entity.to_string(),
                    timestamp,
                },
                other => other.into(),
            })
    }

    /// Store a sample keyed by its own timestamp.
    pub fn add_sample(&mut self, entity: &str, sample: S) -> Result<()>
    where
        S: Timestamped,
    {
        let timestamp = sample.epoch().seconds();
        self.add(entity, timestamp, sample)
    }

    /// Sample describing `entity` at `time`.
    ///
    /// Returns the latest sample at or before `time`. Beyond the entity's
    /// last sample, that sample is returned only while `time` stays within
    /// the staleness window; see [`StalenessPolicy`].
    pub fn get(&self, entity: &str, time: f64) -> Option<&S> {
        if time.is_nan() {
            return None;
        }
        let series = self.series.get(entity)?;
        let at = Epoch::from_seconds(time);
        let last = series.last()?;

        if at <= last {
            return series.floor(at).map(|(_, sample)| sample);
        }

        let (found, sample) = series.floor(at)?;
        match self.staleness_window(series) {
            Some(window) if time > found.seconds() + window => None,
            _ => Some(sample),
        }
    }

    /// Mean sampling interval of `entity` in seconds.
    ///
    /// Computed on the first request after a change and memoized; 0 for an
    /// unknown entity or one with fewer than two samples.
    pub fn data_interval(&self, entity: &str) -> f64 {
        self.series.get(entity).map_or(0.0, Series::mean_interval)
    }

    /// Names of all tracked entities, in no particular order.
    pub fn satellite_names(&self) -> Vec<&str> {
        self.series.keys().map(String::as_str).collect()
    }

    pub fn contains_entity(&self, entity: &str) -> bool {
        self.series.contains_key(entity)
    }

    /// Samples of `entity` with `start <= timestamp <= end`, oldest first.
    pub fn find_range(&self, entity: &str, start: f64, end: f64) -> Vec<(Epoch, &S)> {
        match self.series.get(entity) {
            Some(series) => series
                .range(Epoch::from_seconds(start), Epoch::from_seconds(end))
                .map(|(at, sample)| (*at, sample))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Earliest and latest stored timestamps of `entity`.
    pub fn span(&self, entity: &str) -> Option<(Epoch, Epoch)> {
        let series = self.series.get(entity)?;
        Some((series.first()?, series.last()?))
    }

    /// Remove the sample stored at exactly `timestamp`.
    ///
    /// The entity stays tracked even when its last sample goes.
    pub fn remove(&mut self, entity: &str, timestamp: f64) -> Option<S> {
        self.series
            .get_mut(entity)?
            .remove(Epoch::from_seconds(timestamp))
    }

    /// Rebalance every entity's index; worth doing after many removals.
    pub fn rebalance_all(&mut self) {
        for series in self.series.values_mut() {
            series.rebalance();
        }
    }

    /// Number of tracked entities.
    pub fn entity_count(&self) -> usize {
        self.series.len()
    }

    /// Number of samples stored for `entity`.
    pub fn sample_count(&self, entity: &str) -> usize {
        self.series.get(entity).map_or(0, Series::len)
    }

    /// Total number of samples across all entities.
    pub fn len(&self) -> usize {
        self.series.values().map(Series::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series.values().all(|series| series.len() == 0)
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::new();
        for series in self.series.values() {
            stats.record_series(
                series.len(),
                series.interval_memoized(),
                series.is_balanced(),
            );
        }
        stats
    }

    fn staleness_window(&self, series: &Series<S>) -> Option<f64> {
        match self.config.staleness {
            StalenessPolicy::MeanInterval { tolerance } => {
                Some(series.mean_interval() * tolerance)
            }
            StalenessPolicy::Fixed { seconds } => Some(seconds),
            StalenessPolicy::Unbounded => None,
        }
    }
}

impl<S> Default for SampleCache<S> {
    fn default() -> Self {
        Self::new()
    }
}

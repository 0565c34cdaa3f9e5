//! One entity's samples, keyed by time.

use crate::error::IndexError;
use crate::index::{IntervalIndex, Iter};
use ephemeris_types::Epoch;
use std::cell::Cell;

/// Samples for a single entity plus its memoized mean sampling interval.
///
/// The interval is computed on first request and cached until the next
/// insert or removal, so repeated reads cost nothing while a stream of
/// inserts never pays for a scan it does not use.
#[derive(Debug, Clone)]
pub(crate) struct Series<S> {
    samples: IntervalIndex<Epoch, S>,
    mean_interval: Cell<Option<f64>>,
}

impl<S> Series<S> {
    pub(crate) fn new() -> Self {
        Self {
            samples: IntervalIndex::new(),
            mean_interval: Cell::new(None),
        }
    }

    pub(crate) fn insert(&mut self, at: Epoch, sample: S) -> Result<(), IndexError> {
        self.samples.insert(at, sample)?;
        self.mean_interval.set(None);
        Ok(())
    }

    pub(crate) fn remove(&mut self, at: Epoch) -> Option<S> {
        let removed = self.samples.remove(&at)?;
        self.mean_interval.set(None);
        Some(removed)
    }

    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }

    /// Latest stored timestamp.
    pub(crate) fn last(&self) -> Option<Epoch> {
        self.samples.last_key_value().map(|(at, _)| *at)
    }

    pub(crate) fn first(&self) -> Option<Epoch> {
        self.samples.first_key_value().map(|(at, _)| *at)
    }

    /// Sample at the greatest timestamp `<= at`.
    pub(crate) fn floor(&self, at: Epoch) -> Option<(Epoch, &S)> {
        self.samples
            .find_entry(&at)
            .map(|(found, sample)| (*found, sample))
    }

    pub(crate) fn range(&self, start: Epoch, end: Epoch) -> Iter<'_, Epoch, S> {
        self.samples.range(&start, &end)
    }

    /// Mean gap between consecutive samples; 0 with fewer than two samples.
    pub(crate) fn mean_interval(&self) -> f64 {
        if let Some(interval) = self.mean_interval.get() {
            return interval;
        }
        let interval = self.compute_mean_interval();
        self.mean_interval.set(Some(interval));
        interval
    }

    pub(crate) fn interval_memoized(&self) -> bool {
        self.mean_interval.get().is_some()
    }

    pub(crate) fn rebalance(&mut self) {
        self.samples.rebalance();
    }

    pub(crate) fn is_balanced(&self) -> bool {
        self.samples.is_balanced()
    }

    fn compute_mean_interval(&self) -> f64 {
        let mut previous: Option<Epoch> = None;
        let mut total = 0.0;
        let mut gaps = 0usize;

        for (at, _) in self.samples.iter() {
            if let Some(prev) = previous {
                total += *at - prev;
                gaps += 1;
            }
            previous = Some(*at);
        }

        if gaps == 0 { 0.0 } else { total / gaps as f64 }
    }
}

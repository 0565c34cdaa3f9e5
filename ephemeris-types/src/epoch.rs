use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Sub;

/// A point in time expressed as floating-point seconds.
///
/// `f64` has no total order, so it cannot key an ordered index directly.
/// `Epoch` orders its seconds with [`f64::total_cmp`] and folds `-0.0`
/// into `0.0` on construction, which makes equality and ordering agree.
///
/// # Examples
///
/// ```
/// use ephemeris_types::Epoch;
///
/// let a = Epoch::from_seconds(1.5);
/// let b = Epoch::from_seconds(3.0);
/// assert!(a < b);
/// assert_eq!(b - a, 1.5);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Epoch(f64);

impl Epoch {
    /// Create an epoch from seconds.
    pub fn from_seconds(seconds: f64) -> Self {
        if seconds == 0.0 {
            Self(0.0)
        } else {
            Self(seconds)
        }
    }

    /// Seconds since whatever reference the producer uses.
    #[inline]
    pub fn seconds(self) -> f64 {
        self.0
    }

    /// True unless the epoch is NaN or infinite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Shift the epoch forward by `seconds`.
    pub fn offset(self, seconds: f64) -> Self {
        Self::from_seconds(self.0 + seconds)
    }
}

impl PartialEq for Epoch {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Epoch {}

impl PartialOrd for Epoch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Epoch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for Epoch {
    fn from(seconds: f64) -> Self {
        Self::from_seconds(seconds)
    }
}

impl From<Epoch> for f64 {
    fn from(epoch: Epoch) -> Self {
        epoch.0
    }
}

impl Sub for Epoch {
    type Output = f64;

    fn sub(self, rhs: Self) -> f64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

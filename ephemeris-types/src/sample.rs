use crate::epoch::Epoch;
use crate::point::Ecef;
use serde::{Deserialize, Serialize};

/// Anything that knows the instant it describes.
///
/// Lets a cache key a sample by its own timestamp instead of a separately
/// supplied one.
pub trait Timestamped {
    /// Instant this value describes.
    fn epoch(&self) -> Epoch;
}

/// One ephemeris point: where a satellite was and how fast it was moving.
///
/// # Examples
///
/// ```
/// use ephemeris_types::{Ecef, EphemerisSample};
///
/// let sample = EphemerisSample::new(Ecef::new(1.0, 2.0, 3.0), Ecef::new(4.0, 5.0, 6.0), 1.5);
/// assert_eq!(sample.velocity.x, 4.0);
/// assert_eq!(sample.time.seconds(), 1.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemerisSample {
    /// Position in meters
    pub position: Ecef,
    /// Velocity in meters per second
    pub velocity: Ecef,
    /// Instant of the measurement
    pub time: Epoch,
}

impl EphemerisSample {
    pub fn new(position: Ecef, velocity: Ecef, seconds: f64) -> Self {
        Self {
            position,
            velocity,
            time: Epoch::from_seconds(seconds),
        }
    }

    /// Linearly extrapolated position at `at`.
    pub fn position_at(&self, at: Epoch) -> Ecef {
        self.position.advance(&self.velocity, at - self.time)
    }
}

impl Timestamped for EphemerisSample {
    fn epoch(&self) -> Epoch {
        self.time
    }
}

impl<T: Timestamped> Timestamped for &T {
    fn epoch(&self) -> Epoch {
        (*self).epoch()
    }
}

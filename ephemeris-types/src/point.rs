use serde::{Deserialize, Serialize};

/// An earth-centred, earth-fixed (ECEF) coordinate triple in meters.
///
/// The same type carries velocities (meters per second) in
/// [`EphemerisSample`](crate::EphemerisSample).
///
/// # Examples
///
/// ```
/// use ephemeris_types::Ecef;
///
/// let p1 = Ecef::new(0.0, 0.0, 0.0);
/// let p2 = Ecef::new(3.0, 4.0, 12.0);
/// assert_eq!(p1.distance(&p2), 13.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Ecef {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Ecef {
    /// Create a coordinate from its three components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Get the x component.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Get the y component.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Get the z component.
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Length of the vector from the earth's centre.
    #[inline]
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Straight-line distance to another coordinate.
    pub fn distance(&self, other: &Ecef) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Advance this position along `velocity` for `seconds`.
    ///
    /// Linear only; good enough for the few seconds between ephemeris
    /// points but not a substitute for orbit propagation.
    pub fn advance(&self, velocity: &Ecef, seconds: f64) -> Ecef {
        Ecef::new(
            self.x + velocity.x * seconds,
            self.y + velocity.y * seconds,
            self.z + velocity.z * seconds,
        )
    }

    /// Components as an array, x first.
    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Ecef {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

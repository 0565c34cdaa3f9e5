//! # ephemeris-types
//!
//! Core temporal and payload types shared by the ephemeris cache and its
//! collaborators.
//!
//! - **Time**: `Epoch`, a totally ordered timestamp in seconds
//! - **Positions**: `Ecef`, an earth-centred earth-fixed coordinate triple
//! - **Samples**: `EphemerisSample` and the `Timestamped` trait
//! - **Statistics**: `CacheStats`
//!
//! All types are serializable with Serde.
//!
//! ## Examples
//!
//! ```rust
//! use ephemeris_types::{Ecef, EphemerisSample, Epoch, Timestamped};
//!
//! let sample = EphemerisSample::new(
//!     Ecef::new(15_600_000.0, 7_540_000.0, 20_140_000.0),
//!     Ecef::new(-1.2, 3.4, 0.7),
//!     1.5,
//! );
//! assert_eq!(sample.epoch(), Epoch::from_seconds(1.5));
//! ```

pub mod epoch;
pub mod point;
pub mod sample;
pub mod stats;

pub use epoch::Epoch;
pub use point::Ecef;
pub use sample::{EphemerisSample, Timestamped};
pub use stats::CacheStats;

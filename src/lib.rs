//! In-memory ephemeris cache built on an arena-backed AVL index.
//!
//! ## Features
//! - **Ordered index**: self-balancing tree with exact lookups, ordered range
//!   extraction and explicit full rebalancing
//! - **Interval index**: the same tree answering floor queries
//! - **Sample cache**: per-entity time series answering "what was E doing at
//!   time T", with a staleness cutoff past the last sample
//!
//! ## Staleness
//! A query after an entity's last sample is answered with that sample only
//! while it stays within a window, by default the entity's mean sampling
//! interval. The interval is computed lazily and memoized until the entity
//! changes.
//!
//! ```rust
//! use ephemeris::{Ecef, EphemerisCache, EphemerisSample};
//!
//! let mut cache = EphemerisCache::new();
//! let first = EphemerisSample::new(Ecef::new(1.0, 2.0, 3.0), Ecef::new(4.0, 5.0, 6.0), 1.5);
//! let second = EphemerisSample::new(Ecef::new(7.0, 8.0, 9.0), Ecef::new(10.0, 11.0, 12.0), 3.0);
//! cache.add_sample("G01", first)?;
//! cache.add_sample("G01", second)?;
//!
//! assert_eq!(cache.get("G01", 1.7).map(|s| s.time.seconds()), Some(1.5));
//! assert_eq!(cache.get("G01", 3.5).map(|s| s.time.seconds()), Some(3.0));
//! assert!(cache.get("G01", 20.0).is_none());
//! # Ok::<(), ephemeris::CacheError>(())
//! ```

pub mod builder;
pub mod cache;
pub mod config;
pub mod error;
pub mod index;

pub use builder::CacheBuilder;
pub use cache::SampleCache;
pub use config::{CacheConfig, StalenessPolicy};
pub use error::{CacheError, IndexError, Result};
pub use index::{IntervalIndex, OrderedIndex};

pub use ephemeris_types::{CacheStats, Ecef, EphemerisSample, Epoch, Timestamped};

/// Cache of ephemeris points keyed by satellite name.
pub type EphemerisCache = SampleCache<EphemerisSample>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{CacheBuilder, CacheError, EphemerisCache, Result, SampleCache};

    pub use crate::{IntervalIndex, OrderedIndex};

    pub use crate::{CacheConfig, StalenessPolicy};

    pub use crate::{Ecef, EphemerisSample, Epoch, Timestamped};
}

//! Arena-backed ordered indexes.
//!
//! [`OrderedIndex`] is an AVL tree over unique keys with exact lookups and
//! ordered range extraction. [`IntervalIndex`] shares its storage and
//! balancing but answers lookups with the greatest key not exceeding the
//! query.

mod arena;
pub mod interval;
pub mod ordered;

pub use interval::IntervalIndex;
pub use ordered::{Iter, OrderedIndex};

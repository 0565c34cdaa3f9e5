//! Floor lookups over an [`OrderedIndex`].
//!
//! Keys mark the start of an interval that runs until the next key, so a
//! lookup answers with the entry whose key is the greatest one not exceeding
//! the query. With 2, 4, 6 and 8 stored, a lookup of 3 finds 2 and a lookup of
//! 5 finds 4. Anything below 2 finds nothing, and anything above 8 finds 8:
//! the last interval never closes, so callers that want it to expire must
//! bound it themselves.

use super::ordered::{Iter, OrderedIndex};
use crate::error::IndexError;
use std::cmp::Ordering;
use std::fmt;

/// Ordered index answering floor queries.
///
/// # Examples
///
/// ```
/// use ephemeris::IntervalIndex;
///
/// let mut index = IntervalIndex::new();
/// for t in [2, 4, 6, 8] {
///     index.insert(t, t)?;
/// }
/// assert_eq!(index.find(&1), None);
/// assert_eq!(index.find(&5), Some(&4));
/// assert_eq!(index.find(&42), Some(&8));
/// # Ok::<(), ephemeris::IndexError>(())
/// ```
#[derive(Clone)]
pub struct IntervalIndex<K, V> {
    inner: OrderedIndex<K, V>,
}

impl<K: Ord + Clone, V> IntervalIndex<K, V> {
    pub fn new() -> Self {
        Self {
            inner: OrderedIndex::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn height(&self) -> usize {
        self.inner.height()
    }

    /// Insert a new entry; see [`OrderedIndex::insert`].
    pub fn insert(&mut self, key: K, value: V) -> Result<(), IndexError> {
        self.inner.insert(key, value)
    }

    /// Remove an entry; see [`OrderedIndex::remove`].
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.remove(key)
    }

    /// Value stored at the greatest key `<= key`.
    pub fn find(&self, key: &K) -> Option<&V> {
        self.find_entry(key).map(|(_, value)| value)
    }

    /// Entry at the greatest key `<= key`, including the key it was found at.
    pub fn find_entry(&self, key: &K) -> Option<(&K, &V)> {
        let mut candidate = None;
        let mut cur = self.inner.root();

        while let Some(id) = cur {
            let node = self.inner.node(id);
            match key.cmp(&node.key) {
                Ordering::Less => cur = node.left,
                Ordering::Equal => return Some((&node.key, &node.value)),
                Ordering::Greater => {
                    // every later candidate lies right of this one, so is closer
                    candidate = Some((&node.key, &node.value));
                    cur = node.right;
                }
            }
        }
        candidate
    }

    /// Exact-match lookup, bypassing floor semantics.
    pub fn find_exact(&self, key: &K) -> Option<&V> {
        self.inner.find(key)
    }

    pub fn find_range(&self, start: &K, end: &K) -> Vec<(&K, &V)> {
        self.inner.find_range(start, end)
    }

    pub fn range(&self, start: &K, end: &K) -> Iter<'_, K, V> {
        self.inner.range(start, end)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.inner.iter()
    }

    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.inner.first_key_value()
    }

    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.inner.last_key_value()
    }

    pub fn lowest(&self) -> Result<&K, IndexError> {
        self.inner.lowest()
    }

    pub fn highest(&self) -> Result<&K, IndexError> {
        self.inner.highest()
    }

    pub fn rebalance(&mut self) {
        self.inner.rebalance();
    }

    pub fn is_balanced(&self) -> bool {
        self.inner.is_balanced()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// The underlying exact-match index.
    pub fn as_ordered(&self) -> &OrderedIndex<K, V> {
        &self.inner
    }
}

impl<K: Ord + Clone, V> Default for IntervalIndex<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone + fmt::Debug, V: fmt::Debug> fmt::Debug for IntervalIndex<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl<'a, K: Ord + Clone, V> IntoIterator for &'a IntervalIndex<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evens() -> IntervalIndex<i32, i32> {
        let mut index = IntervalIndex::new();
        for k in [2, 4, 6, 8] {
            index.insert(k, k).unwrap();
        }
        index
    }

    #[test]
    fn test_floor_find() {
        let index = evens();

        assert_eq!(index.find(&1), None);
        assert_eq!(index.find(&2), Some(&2));
        assert_eq!(index.find(&3), Some(&2));
        assert_eq!(index.find(&4), Some(&4));
        assert_eq!(index.find(&5), Some(&4));
        assert_eq!(index.find(&6), Some(&6));
        assert_eq!(index.find(&7), Some(&6));
        assert_eq!(index.find(&8), Some(&8));
        assert_eq!(index.find(&9), Some(&8));
        assert_eq!(index.find(&42), Some(&8));
    }

    #[test]
    fn test_find_entry_reports_floor_key() {
        let index = evens();
        assert_eq!(index.find_entry(&7), Some((&6, &6)));
        assert_eq!(index.find_entry(&0), None);
    }

    #[test]
    fn test_find_exact_ignores_floor() {
        let index = evens();
        assert_eq!(index.find_exact(&4), Some(&4));
        assert_eq!(index.find_exact(&5), None);
    }

    #[test]
    fn test_empty_index() {
        let index: IntervalIndex<i32, i32> = IntervalIndex::new();
        assert_eq!(index.find(&0), None);
        assert!(index.is_empty());
        assert_eq!(index.lowest(), Err(IndexError::Empty));
    }

    #[test]
    fn test_floor_after_removal() {
        let mut index = evens();
        assert_eq!(index.remove(&4), Some(4));
        assert_eq!(index.find(&5), Some(&2));
        assert_eq!(index.remove(&8), Some(8));
        assert_eq!(index.find(&100), Some(&6));
        assert_eq!(index.highest(), Ok(&8));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut index = evens();
        assert_eq!(index.insert(6, 60), Err(IndexError::DuplicateKey));
        assert_eq!(index.find(&6), Some(&6));
    }
}

//! Self-balancing ordered index.
//!
//! An AVL tree whose nodes live in an [`Arena`] and link to each other by
//! [`NodeId`]. Each node caches the height of its subtree; insertion walks
//! back to the root recomputing heights and rotating wherever the two
//! subtrees of a node differ by more than one.
//!
//! Removal lifts the left subtree into the vacated slot and hangs the right
//! subtree under it. That keeps removal cheap but can leave the tree lopsided,
//! so [`OrderedIndex::rebalance`] exists as an explicit, heavyweight repair.

use super::arena::{Arena, Node, NodeId};
use crate::error::IndexError;
use std::cmp::Ordering;
use std::fmt;

/// Ordered map from unique keys to values.
///
/// # Examples
///
/// ```
/// use ephemeris::OrderedIndex;
///
/// let mut index = OrderedIndex::new();
/// index.insert(2, 30)?;
/// index.insert(1, 20)?;
/// index.insert(3, 40)?;
///
/// assert_eq!(index.find(&2), Some(&30));
/// assert_eq!(index.find(&4), None);
/// assert!(index.is_balanced());
/// # Ok::<(), ephemeris::IndexError>(())
/// ```
#[derive(Clone)]
pub struct OrderedIndex<K, V> {
    arena: Arena<K, V>,
    root: Option<NodeId>,
    len: usize,
    /// Lowest and highest key ever inserted
    bounds: Option<(K, K)>,
}

impl<K: Ord + Clone, V> OrderedIndex<K, V> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            len: 0,
            bounds: None,
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree; 0 when empty.
    pub fn height(&self) -> usize {
        self.height_of(self.root) as usize
    }

    /// Insert a new entry.
    ///
    /// Fails with [`IndexError::DuplicateKey`] if `key` is already present;
    /// the stored value is left untouched.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), IndexError> {
        let mut parent = None;
        let mut go_left = false;
        let mut cur = self.root;

        while let Some(id) = cur {
            let node = &self.arena[id];
            match key.cmp(&node.key) {
                Ordering::Less => {
                    parent = Some(id);
                    go_left = true;
                    cur = node.left;
                }
                Ordering::Greater => {
                    parent = Some(id);
                    go_left = false;
                    cur = node.right;
                }
                Ordering::Equal => return Err(IndexError::DuplicateKey),
            }
        }

        self.track_bounds(&key);
        let id = self.arena.alloc(Node::leaf(key, value, parent));
        match parent {
            None => self.root = Some(id),
            Some(p) if go_left => self.arena[p].left = Some(id),
            Some(p) => self.arena[p].right = Some(id),
        }
        self.len += 1;

        self.retrace(parent);
        Ok(())
    }

    /// Remove `key`, returning its value, or `None` if it was absent.
    ///
    /// The balance invariant is not guaranteed afterwards; call
    /// [`rebalance`](Self::rebalance) after heavy deletion.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.find_node(key)?;
        let (parent, left, right) = {
            let node = &self.arena[id];
            (node.parent, node.left, node.right)
        };

        let retrace_from = match (left, right) {
            (Some(l), Some(r)) => {
                self.replace_child(parent, id, Some(l));
                Some(self.attach_subtree(l, r))
            }
            (Some(child), None) | (None, Some(child)) => {
                self.replace_child(parent, id, Some(child));
                parent
            }
            (None, None) => {
                self.replace_child(parent, id, None);
                parent
            }
        };

        let removed = self.arena.release(id)?;
        self.len -= 1;
        self.retrace(retrace_from);
        Some(removed.value)
    }

    /// Exact-match lookup.
    pub fn find(&self, key: &K) -> Option<&V> {
        self.find_node(key).map(|id| &self.arena[id].value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find_node(key).is_some()
    }

    /// All entries with `start <= key <= end`, in ascending key order.
    pub fn find_range(&self, start: &K, end: &K) -> Vec<(&K, &V)> {
        self.range(start, end).collect()
    }

    /// Lazy form of [`find_range`](Self::find_range).
    pub fn range(&self, start: &K, end: &K) -> Iter<'_, K, V> {
        let mut iter = Iter {
            index: self,
            stack: Vec::new(),
            upper: Some(end.clone()),
        };
        if start <= end {
            iter.descend(self.root, Some(start));
        }
        iter
    }

    /// All entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            index: self,
            stack: Vec::new(),
            upper: None,
        };
        iter.descend(self.root, None);
        iter
    }

    /// Smallest stored entry.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let mut cur = self.root?;
        while let Some(left) = self.arena[cur].left {
            cur = left;
        }
        let node = &self.arena[cur];
        Some((&node.key, &node.value))
    }

    /// Largest stored entry.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let mut cur = self.root?;
        while let Some(right) = self.arena[cur].right {
            cur = right;
        }
        let node = &self.arena[cur];
        Some((&node.key, &node.value))
    }

    /// Lowest key ever inserted. Removal does not move it.
    pub fn lowest(&self) -> Result<&K, IndexError> {
        self.bounds
            .as_ref()
            .map(|(lowest, _)| lowest)
            .ok_or(IndexError::Empty)
    }

    /// Highest key ever inserted. Removal does not move it.
    pub fn highest(&self) -> Result<&K, IndexError> {
        self.bounds
            .as_ref()
            .map(|(_, highest)| highest)
            .ok_or(IndexError::Empty)
    }

    /// Restore the height bound at every node.
    ///
    /// Recomputes every cached height, and if any node is out of bounds
    /// relinks the whole tree through rotations: first into a right-leaning
    /// vine, then folded back into a complete tree. O(n).
    pub fn rebalance(&mut self) {
        self.recompute_heights();
        if self.is_balanced() {
            return;
        }

        log::trace!(
            "rebalancing index of {} entries (height {})",
            self.len,
            self.height()
        );
        self.flatten_to_vine();
        self.fold_vine();
        self.recompute_heights();
    }

    /// Check the height bound at every node.
    ///
    /// Heights are recomputed from the structure rather than read from the
    /// cache, so this is O(n). Meant for diagnostics and tests.
    pub fn is_balanced(&self) -> bool {
        let mut heights = vec![0u32; self.arena.capacity()];
        for id in self.post_order() {
            let node = &self.arena[id];
            let lh = node.left.map_or(0, |l| heights[l.index()]);
            let rh = node.right.map_or(0, |r| heights[r.index()]);
            if lh.abs_diff(rh) > 1 {
                return false;
            }
            heights[id.index()] = 1 + lh.max(rh);
        }
        true
    }

    /// Drop every entry and forget the lowest/highest keys.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.len = 0;
        self.bounds = None;
    }

    pub(super) fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub(super) fn node(&self, id: NodeId) -> &Node<K, V> {
        &self.arena[id]
    }

    fn find_node(&self, key: &K) -> Option<NodeId> {
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = &self.arena[id];
            match key.cmp(&node.key) {
                Ordering::Less => cur = node.left,
                Ordering::Greater => cur = node.right,
                Ordering::Equal => return Some(id),
            }
        }
        None
    }

    fn track_bounds(&mut self, key: &K) {
        let (lowest, highest) = self
            .bounds
            .get_or_insert_with(|| (key.clone(), key.clone()));
        if *key < *lowest {
            *lowest = key.clone();
        }
        if *key > *highest {
            *highest = key.clone();
        }
    }

    /// Hang `subtree` on the empty slot an insert of its root key would
    /// reach when descending from `from`. Returns the new parent.
    fn attach_subtree(&mut self, from: NodeId, subtree: NodeId) -> NodeId {
        let mut cur = from;
        loop {
            let node = &self.arena[cur];
            let go_left = self.arena[subtree].key < node.key;
            let next = if go_left { node.left } else { node.right };
            match next {
                Some(n) => cur = n,
                None => {
                    if go_left {
                        self.arena[cur].left = Some(subtree);
                    } else {
                        self.arena[cur].right = Some(subtree);
                    }
                    self.arena[subtree].parent = Some(cur);
                    return cur;
                }
            }
        }
    }

    /// Point the link that referenced `old` (a child slot of `parent`, or the
    /// root when there is no parent) at `new`.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                let node = &mut self.arena[p];
                if node.left == Some(old) {
                    node.left = new;
                } else {
                    node.right = new;
                }
            }
        }
        if let Some(n) = new {
            self.arena[n].parent = parent;
        }
    }

    #[inline]
    fn height_of(&self, id: Option<NodeId>) -> u32 {
        id.map_or(0, |id| self.arena[id].height)
    }

    fn update_height(&mut self, id: NodeId) {
        let node = &self.arena[id];
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.arena[id].height = height;
    }

    fn balance_factor(&self, id: NodeId) -> i64 {
        let node = &self.arena[id];
        self.height_of(node.left) as i64 - self.height_of(node.right) as i64
    }

    /// Left rotation around `node`; returns the pivot now occupying its slot.
    fn rotate_left(&mut self, node: NodeId) -> NodeId {
        let Some(pivot) = self.arena[node].right else {
            return node;
        };
        let parent = self.arena[node].parent;

        let inner = self.arena[pivot].left;
        self.arena[node].right = inner;
        if let Some(i) = inner {
            self.arena[i].parent = Some(node);
        }

        self.replace_child(parent, node, Some(pivot));
        self.arena[pivot].left = Some(node);
        self.arena[node].parent = Some(pivot);

        // node is now below pivot, so it goes first
        self.update_height(node);
        self.update_height(pivot);
        pivot
    }

    /// Right rotation around `node`; returns the pivot now occupying its slot.
    fn rotate_right(&mut self, node: NodeId) -> NodeId {
        let Some(pivot) = self.arena[node].left else {
            return node;
        };
        let parent = self.arena[node].parent;

        let inner = self.arena[pivot].right;
        self.arena[node].left = inner;
        if let Some(i) = inner {
            self.arena[i].parent = Some(node);
        }

        self.replace_child(parent, node, Some(pivot));
        self.arena[pivot].right = Some(node);
        self.arena[node].parent = Some(pivot);

        self.update_height(node);
        self.update_height(pivot);
        pivot
    }

    /// Refresh `id`'s height and rotate if its subtrees differ by more than
    /// one. Returns the root of the (possibly new) subtree.
    fn restore(&mut self, id: NodeId) -> NodeId {
        self.update_height(id);
        let balance = self.balance_factor(id);

        if balance > 1 {
            if let Some(left) = self.arena[id].left
                && self.balance_factor(left) < 0
            {
                self.rotate_left(left);
            }
            self.rotate_right(id)
        } else if balance < -1 {
            if let Some(right) = self.arena[id].right
                && self.balance_factor(right) > 0
            {
                self.rotate_right(right);
            }
            self.rotate_left(id)
        } else {
            id
        }
    }

    /// Walk from `from` to the root restoring heights and balance.
    fn retrace(&mut self, from: Option<NodeId>) {
        let mut cur = from;
        while let Some(id) = cur {
            let top = self.restore(id);
            cur = self.arena[top].parent;
        }
    }

    fn post_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.len);
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            let node = &self.arena[id];
            stack.extend(node.left);
            stack.extend(node.right);
        }
        order.reverse();
        order
    }

    fn recompute_heights(&mut self) {
        for id in self.post_order() {
            self.update_height(id);
        }
    }

    fn flatten_to_vine(&mut self) {
        let mut cur = self.root;
        while let Some(id) = cur {
            if self.arena[id].left.is_some() {
                cur = Some(self.rotate_right(id));
            } else {
                cur = self.arena[id].right;
            }
        }
    }

    fn fold_vine(&mut self) {
        if self.len == 0 {
            return;
        }
        // largest 2^k - 1 not exceeding len
        let levels = usize::BITS - 1 - (self.len + 1).leading_zeros();
        let mut full = (1usize << levels) - 1;

        self.compress(self.len - full);
        while full > 1 {
            full /= 2;
            self.compress(full);
        }
    }

    /// Left-rotate every other node down the right spine, `count` times.
    fn compress(&mut self, count: usize) {
        let mut cur = self.root;
        for _ in 0..count {
            let Some(id) = cur else { break };
            if self.arena[id].right.is_none() {
                break;
            }
            let pivot = self.rotate_left(id);
            cur = self.arena[pivot].right;
        }
    }
}

impl<K: Ord + Clone, V> Default for OrderedIndex<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone + fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedIndex<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K: Ord + Clone, V> IntoIterator for &'a OrderedIndex<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over an [`OrderedIndex`], optionally bounded.
pub struct Iter<'a, K, V> {
    index: &'a OrderedIndex<K, V>,
    stack: Vec<NodeId>,
    upper: Option<K>,
}

impl<'a, K: Ord, V> Iter<'a, K, V> {
    /// Push the left spine of `cur`, skipping subtrees wholly below `lower`.
    fn descend(&mut self, mut cur: Option<NodeId>, lower: Option<&K>) {
        let index = self.index;
        while let Some(id) = cur {
            let node = &index.arena[id];
            if lower.is_none_or(|lo| node.key >= *lo) {
                self.stack.push(id);
                cur = node.left;
            } else {
                cur = node.right;
            }
        }
    }
}

impl<'a, K: Ord, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let index = self.index;
        let node = &index.arena[id];

        if let Some(upper) = &self.upper
            && node.key > *upper
        {
            self.stack.clear();
            return None;
        }

        self.descend(node.right, None);
        Some((&node.key, &node.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Check parent links, key order and cached heights across the tree.
    fn assert_structure<K: Ord + Clone + fmt::Debug, V>(index: &OrderedIndex<K, V>) {
        let mut seen = 0;
        if let Some(root) = index.root {
            assert_eq!(index.arena[root].parent, None, "root has a parent");
        }
        for id in index.post_order() {
            seen += 1;
            let node = &index.arena[id];
            for child in [node.left, node.right].into_iter().flatten() {
                assert_eq!(index.arena[child].parent, Some(id), "broken parent link");
            }
            if let Some(l) = node.left {
                assert!(index.arena[l].key < node.key);
            }
            if let Some(r) = node.right {
                assert!(index.arena[r].key > node.key);
            }
            let expected = 1 + index.height_of(node.left).max(index.height_of(node.right));
            assert_eq!(node.height, expected, "stale height at {:?}", node.key);
        }
        assert_eq!(seen, index.len());

        let keys: Vec<&K> = index.iter().map(|(k, _)| k).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]), "keys out of order");
    }

    #[test]
    fn test_insert_and_find() {
        let mut index = OrderedIndex::new();
        index.insert(2, 3).unwrap();
        assert_eq!(index.find(&2), Some(&3));
        index.insert(1, 2).unwrap();
        index.insert(3, 4).unwrap();

        assert_eq!(index.find(&1), Some(&2));
        assert_eq!(index.find(&3), Some(&4));
        assert_eq!(index.find(&4), None);
        assert!(index.is_balanced());
        assert_structure(&index);
    }

    #[test]
    fn test_duplicate_insert_keeps_original() {
        let mut index = OrderedIndex::new();
        index.insert(5, "first").unwrap();
        assert_eq!(index.insert(5, "second"), Err(IndexError::DuplicateKey));
        assert_eq!(index.find(&5), Some(&"first"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_ascending_inserts_stay_balanced() {
        let mut index = OrderedIndex::new();
        for k in 1..=6 {
            index.insert(k, 1).unwrap();
        }
        assert!(index.is_balanced());
        assert_eq!(index.height(), 3);
        assert_structure(&index);
    }

    #[test]
    fn test_double_rotation_cases() {
        // left-right
        let mut index = OrderedIndex::new();
        for k in [30, 10, 20] {
            index.insert(k, ()).unwrap();
        }
        assert_eq!(index.node(index.root().unwrap()).key, 20);
        assert_structure(&index);

        // right-left
        let mut index = OrderedIndex::new();
        for k in [10, 30, 20] {
            index.insert(k, ()).unwrap();
        }
        assert_eq!(index.node(index.root().unwrap()).key, 20);
        assert_structure(&index);
    }

    #[test]
    fn test_remove_then_rebalance() {
        let mut index = OrderedIndex::new();
        index.insert(2, 3).unwrap();
        index.insert(1, 2).unwrap();
        index.insert(3, 4).unwrap();
        index.insert(4, 5).unwrap();

        assert_eq!(index.remove(&2), Some(3));
        assert_eq!(index.find(&1), Some(&2));
        assert_eq!(index.find(&2), None);
        assert_eq!(index.find(&3), Some(&4));
        assert_eq!(index.find(&4), Some(&5));
        assert_structure(&index);

        index.rebalance();
        assert!(index.is_balanced());
        assert_structure(&index);
    }

    #[test]
    fn test_remove_missing_and_empty() {
        let mut index: OrderedIndex<i32, i32> = OrderedIndex::new();
        assert_eq!(index.remove(&1), None);
        assert_eq!(index.find(&1), None);

        index.insert(1, 10).unwrap();
        assert_eq!(index.remove(&7), None);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_remove_root_with_two_children_relinks_right_subtree() {
        let mut index = OrderedIndex::new();
        for k in [50, 25, 75, 10, 30, 60, 90] {
            index.insert(k, k * 10).unwrap();
        }
        assert_eq!(index.remove(&50), Some(500));
        assert_structure(&index);
        for k in [25, 75, 10, 30, 60, 90] {
            assert_eq!(index.find(&k), Some(&(k * 10)));
        }
        assert_eq!(index.len(), 6);
    }

    #[test]
    fn test_remove_leaf_and_single_child() {
        let mut index = OrderedIndex::new();
        for k in [4, 2, 6, 1, 7] {
            index.insert(k, ()).unwrap();
        }
        assert_eq!(index.remove(&1), Some(()));
        assert_structure(&index);
        assert_eq!(index.remove(&6), Some(()));
        assert_structure(&index);
        let keys: Vec<i32> = index.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![2, 4, 7]);
    }

    #[test]
    fn test_slot_reuse_after_remove() {
        let mut index = OrderedIndex::new();
        for k in 0..8 {
            index.insert(k, k).unwrap();
        }
        let capacity = index.arena.capacity();
        for k in 0..4 {
            index.remove(&k);
        }
        for k in 100..104 {
            index.insert(k, k).unwrap();
        }
        assert_eq!(index.arena.capacity(), capacity);
        assert_structure(&index);
    }

    #[test]
    fn test_find_range() {
        let mut index = OrderedIndex::new();
        index.insert(2, 3).unwrap();
        index.insert(3, 4).unwrap();
        index.insert(1, 2).unwrap();
        index.insert(4, 5).unwrap();

        let range = index.find_range(&2, &4);
        let keys: Vec<i32> = range.iter().map(|(k, _)| **k).collect();
        assert_eq!(keys, vec![2, 3, 4]);
        assert!(index.is_balanced());

        assert!(index.find_range(&5, &9).is_empty());
        assert!(index.find_range(&4, &2).is_empty());
        assert_eq!(index.find_range(&0, &1).len(), 1);
    }

    #[test]
    fn test_lowest_highest_survive_removal() {
        let mut index = OrderedIndex::new();
        assert_eq!(index.lowest(), Err(IndexError::Empty));
        assert_eq!(index.highest(), Err(IndexError::Empty));

        for k in [5, 1, 9] {
            index.insert(k, ()).unwrap();
        }
        index.remove(&1);
        index.remove(&9);
        assert_eq!(index.lowest(), Ok(&1));
        assert_eq!(index.highest(), Ok(&9));
        assert_eq!(index.first_key_value(), Some((&5, &())));
        assert_eq!(index.last_key_value(), Some((&5, &())));
    }

    /// Link `keys` (ascending) into a right-leaning chain, bypassing insert.
    fn right_chain(keys: &[i32]) -> OrderedIndex<i32, i32> {
        let mut index = OrderedIndex::new();
        let mut parent: Option<NodeId> = None;
        for &k in keys {
            let id = index.arena.alloc(Node::leaf(k, k * 10, parent));
            match parent {
                None => index.root = Some(id),
                Some(p) => index.arena[p].right = Some(id),
            }
            index.track_bounds(&k);
            index.len += 1;
            parent = Some(id);
        }
        index.recompute_heights();
        index
    }

    #[test]
    fn test_rebalance_degenerate_chain() {
        let keys: Vec<i32> = (0..20).collect();
        let mut index = right_chain(&keys);
        assert_structure(&index);
        assert_eq!(index.height(), 20);
        assert!(!index.is_balanced());

        index.rebalance();
        assert!(index.is_balanced());
        assert_eq!(index.height(), 5);
        assert_structure(&index);
        for k in keys {
            assert_eq!(index.find(&k), Some(&(k * 10)));
        }
    }

    #[test]
    fn test_is_balanced_detects_short_chain() {
        let index = right_chain(&[1, 2, 3]);
        assert!(!index.is_balanced());
        let index = right_chain(&[1, 2]);
        assert!(index.is_balanced());
    }

    #[test]
    fn test_rebalance_after_scattered_removal() {
        let mut index = OrderedIndex::new();
        for k in 0..64 {
            index.insert(k, k).unwrap();
        }
        for k in (0..64).step_by(3) {
            index.remove(&k);
        }
        assert_structure(&index);

        index.rebalance();
        assert!(index.is_balanced());
        assert_structure(&index);
        for k in 0..64 {
            assert_eq!(index.find(&k).is_some(), k % 3 != 0);
        }
    }

    #[test]
    fn test_rebalance_is_noop_when_balanced() {
        let mut index = OrderedIndex::new();
        for k in [4, 2, 6, 1, 3, 5, 7] {
            index.insert(k, ()).unwrap();
        }
        let root = index.root();
        index.rebalance();
        assert_eq!(index.root(), root);
    }

    #[test]
    fn test_clear() {
        let mut index = OrderedIndex::new();
        index.insert("a", 1).unwrap();
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert_eq!(index.lowest(), Err(IndexError::Empty));
        index.insert("b", 2).unwrap();
        assert_eq!(index.find(&"b"), Some(&2));
    }

    #[test]
    fn test_debug_lists_entries_in_order() {
        let mut index = OrderedIndex::new();
        index.insert(2, 'b').unwrap();
        index.insert(1, 'a').unwrap();
        assert_eq!(format!("{:?}", index), "{1: 'a', 2: 'b'}");
    }
}

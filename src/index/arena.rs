//! Slot arena holding the nodes of an index.
//!
//! Nodes refer to each other by [`NodeId`] handles. Children are owned
//! structurally (a node is reachable only through its parent's link) while
//! the parent handle is bookkeeping for rotations. Only the arena drops
//! nodes, so there is exactly one destructor path.

use std::ops::{Index, IndexMut};

/// Handle into the node arena. `u32` covers far more nodes than a series
/// ever holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One (key, value) pair plus its links.
#[derive(Debug, Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    /// Height of the subtree rooted here; a leaf is 1.
    pub(crate) height: u32,
}

impl<K, V> Node<K, V> {
    pub(crate) fn leaf(key: K, value: V, parent: Option<NodeId>) -> Self {
        Self {
            key,
            value,
            parent,
            left: None,
            right: None,
            height: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Arena<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free_list: Vec<u32>,
}

impl<K, V> Arena<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Store a node, reusing a released slot when one is available.
    pub(crate) fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        if let Some(idx) = self.free_list.pop() {
            self.slots[idx as usize] = Some(node);
            NodeId(idx)
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Some(node));
            NodeId(idx)
        }
    }

    /// Take a node out of the arena and return its slot to the free list.
    pub(crate) fn release(&mut self, id: NodeId) -> Option<Node<K, V>> {
        let node = self.slots.get_mut(id.index())?.take()?;
        self.free_list.push(id.0);
        Some(node)
    }

    /// Number of slots ever allocated, live or free.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
    }
}

impl<K, V> Index<NodeId> for Arena<K, V> {
    type Output = Node<K, V>;

    #[inline]
    fn index(&self, id: NodeId) -> &Node<K, V> {
        match &self.slots[id.index()] {
            Some(node) => node,
            None => panic!("dangling node handle {:?}", id),
        }
    }
}

impl<K, V> IndexMut<NodeId> for Arena<K, V> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match &mut self.slots[id.index()] {
            Some(node) => node,
            None => panic!("dangling node handle {:?}", id),
        }
    }
}

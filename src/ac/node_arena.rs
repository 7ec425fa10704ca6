//! An append-only arena for automaton nodes.
//!
//! Nodes never hold references to each other. Both kinds of edges, the forward
//! trie edges and the backward failure links, are plain [`NodeId`] indices into
//! this arena, so the graph may contain cycles without any shared ownership.

use std::fmt;
use std::ops::{Index, IndexMut};

/// Index of a node in a [`NodeArena`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The root node. Always the first node allocated.
    pub const ROOT: NodeId = NodeId(0);

    /// Returns the position of this node in the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns true if this is the root node.
    #[inline]
    pub const fn is_root(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A growable arena handing out [`NodeId`]s in allocation order.
#[derive(Clone, Debug)]
pub(crate) struct NodeArena<T> {
    nodes: Vec<T>,
}

impl<T> NodeArena<T> {
    /// Creates an arena that already holds the root node.
    pub fn with_root(root: T) -> Self {
        NodeArena { nodes: vec![root] }
    }

    /// Appends a value to the arena and returns its identifier.
    ///
    /// Returns `None` once the arena has run out of 32-bit identifiers.
    pub fn alloc(&mut self, value: T) -> Option<NodeId> {
        let id = u32::try_from(self.nodes.len()).ok()?;
        self.nodes.push(value);
        Some(NodeId(id))
    }

    /// Returns the number of values allocated in this arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Iterates over all nodes in allocation order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (NodeId, &T)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// Returns the number of bytes used by the node slots.
    pub fn heap_bytes(&self) -> usize {
        self.nodes.capacity() * std::mem::size_of::<T>()
    }
}

impl<T> Index<NodeId> for NodeArena<T> {
    type Output = T;

    #[inline]
    fn index(&self, id: NodeId) -> &T {
        &self.nodes[id.index()]
    }
}

impl<T> IndexMut<NodeId> for NodeArena<T> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.nodes[id.index()]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn root_is_first() {
        let mut arena = NodeArena::with_root("root");
        assert_eq!(arena.len(), 1);
        assert_eq!(arena[NodeId::ROOT], "root");
        let id = arena.alloc("child").unwrap();
        assert_eq!(id.index(), 1);
        assert!(!id.is_root());
        assert_eq!(arena[id], "child");
    }

    #[test]
    fn iter_in_allocation_order() {
        let mut arena = NodeArena::with_root(0);
        for i in 1..5 {
            arena.alloc(i).unwrap();
        }
        let ids: Vec<_> = arena.iter().map(|(id, &v)| (id.index(), v)).collect();
        assert_eq!(ids, vec![(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)]);
    }
}

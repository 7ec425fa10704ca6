use super::node_arena::NodeId;
use super::symbol::Symbol;

/// A compact representation of the forward edges of a node that doesn't allocate until
/// there are at least three children.
///
/// Children are kept in insertion order, which is also the order the failure-link
/// builder visits them in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Children<C: Symbol> {
    /// No children.
    None,
    /// Exactly one child (symbol, node).
    One((C, NodeId)),
    /// Exactly two children (symbol1, node1, symbol2, node2).
    Two((C, NodeId, C, NodeId)),
    /// Three or more children stored in a vector.
    Many(Vec<(C, NodeId)>),
}

impl<C: Symbol> Default for Children<C> {
    fn default() -> Self {
        Children::None
    }
}

impl<C: Symbol> Children<C> {
    /// Gets the child at the specified index.
    ///
    /// Returns `None` if the index is out of bounds.
    #[inline]
    pub fn nth(&self, index: usize) -> Option<(C, NodeId)> {
        match self {
            Children::None => None,
            Children::One(child) => match index {
                0 => Some(*child),
                _ => None,
            },
            Children::Two((c1, n1, c2, n2)) => match index {
                0 => Some((*c1, *n1)),
                1 => Some((*c2, *n2)),
                _ => None,
            },
            Children::Many(children) => children.get(index).copied(),
        }
    }

    /// Returns the node that the `symbol` edge leads to, or None if no such edge exists.
    #[inline]
    pub fn get(&self, symbol: C) -> Option<NodeId> {
        match self {
            Children::None => None,
            Children::One((ch, node)) => (*ch == symbol).then_some(*node),
            Children::Two((c1, n1, c2, n2)) => {
                if symbol == *c1 {
                    Some(*n1)
                } else if symbol == *c2 {
                    Some(*n2)
                } else {
                    None
                }
            }
            Children::Many(children) => {
                // Unrolling by 2 exposes load-level parallelism (multiple loads per cycle)
                // and is faster than a scalar loop on the short lists seen in practice.
                let chunks = children.chunks_exact(2);
                let remainder = chunks.remainder();
                for chunk in chunks {
                    if chunk[0].0 == symbol {
                        return Some(chunk[0].1);
                    }
                    if chunk[1].0 == symbol {
                        return Some(chunk[1].1);
                    }
                }
                for &(ch, node) in remainder {
                    if ch == symbol {
                        return Some(node);
                    }
                }
                None
            }
        }
    }

    /// Adds an edge. The symbol must not already be present.
    pub fn insert(&mut self, symbol: C, node: NodeId) {
        debug_assert!(self.get(symbol).is_none());
        let c = (symbol, node);
        match self {
            Children::None => *self = Children::One(c),
            Children::One((c1, n1)) => *self = Children::Two((*c1, *n1, c.0, c.1)),
            Children::Two((c1, n1, c2, n2)) => {
                *self = Children::Many(vec![(*c1, *n1), (*c2, *n2), c])
            }
            Children::Many(children) => children.push(c),
        };
    }

    /// Returns the number of children.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Children::None => 0,
            Children::One(_) => 1,
            Children::Two(_) => 2,
            Children::Many(children) => children.len(),
        }
    }

    /// Returns true if there are no children.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Children::None)
    }

    /// Returns an iterator over all `(symbol, node)` edges.
    #[inline]
    pub fn iter(&self) -> ChildIter<'_, C> {
        ChildIter {
            children: self,
            index: 0,
        }
    }

    /// Returns the number of heap bytes used by the edge list.
    pub(crate) fn heap_bytes(&self) -> usize {
        match self {
            Children::Many(children) => children.capacity() * std::mem::size_of::<(C, NodeId)>(),
            _ => 0,
        }
    }
}

/// An iterator over the edges of a [`Children`] map.
#[derive(Clone)]
pub struct ChildIter<'a, C: Symbol> {
    children: &'a Children<C>,
    index: usize,
}

impl<C: Symbol> Iterator for ChildIter<'_, C> {
    type Item = (C, NodeId);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let next_child = self.children.nth(self.index)?;
        self.index += 1;
        Some(next_child)
    }

    /// Since we know the exact size, we can do better than the default implementation.
    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.children.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<C: Symbol> ExactSizeIterator for ChildIter<'_, C> {}

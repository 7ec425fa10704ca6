use std::collections::VecDeque;

use smallvec::SmallVec;

use super::automaton::{Automaton, Node, PatternId};
use super::error::{AcError, Result};
use super::node_arena::{NodeArena, NodeId};
use super::symbol::{IntoSymbols, Symbol};

/// Largest number of nodes a trie may hold.
pub const MAX_NODES: usize = u32::MAX as usize;

/// Largest number of entries in the merged output table of a built automaton.
pub const MAX_OUTPUTS: usize = u32::MAX as usize;

/// A trie of patterns that have not been linked into an automaton yet.
///
/// Patterns are inserted one at a time; there is no removal. Calling
/// [`build`](TrieStore::build) consumes the store and computes the failure links,
/// so a store can never be scanned and an [`Automaton`] can never be extended.
/// Adding patterns after the build means starting a new store.
///
/// # Examples
///
/// ```
/// use libacmatch::ac::TrieStore;
///
/// let mut store = TrieStore::new();
/// let he = store.insert("he").unwrap();
/// assert!(store.insert("").is_err());
/// let she = store.insert("she").unwrap();
/// assert_eq!(store.insert("he").unwrap(), he);
///
/// let automaton = store.build();
/// let found: Vec<_> = automaton.find_iter("she".chars()).map(|m| m.pattern()).collect();
/// assert_eq!(found, [he, she]);
/// ```
#[derive(Clone, Debug)]
pub struct TrieStore<C: Symbol> {
    nodes: NodeArena<Node<C>>,
    patterns: Vec<Box<[C]>>,
    // Sum of node depths. A node's merged output set never holds more patterns than
    // its depth, so this bounds the output table `build` will produce.
    depth_sum: usize,
    max_outputs: usize,
}

impl<C: Symbol> Default for TrieStore<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Symbol> TrieStore<C> {
    /// Creates a store holding only the root node.
    pub fn new() -> Self {
        TrieStore {
            nodes: NodeArena::with_root(Node::root()),
            patterns: Vec::new(),
            depth_sum: 0,
            max_outputs: MAX_OUTPUTS,
        }
    }

    /// Inserts a pattern and returns its identifier.
    ///
    /// The pattern can be any type that implements [`IntoSymbols`], including `&str`,
    /// `String`, `&[u8]`, `Vec<u8>`, or fixed-size arrays like `[u8; 3]`.
    /// Inserting a pattern that is already present returns the identifier it was given
    /// the first time and leaves the store unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AcError::InvalidPattern`] if the pattern is empty and
    /// [`AcError::Capacity`] if the trie would outgrow [`MAX_NODES`] or its output
    /// table could outgrow [`MAX_OUTPUTS`]. The store is left unchanged in both cases.
    pub fn insert(&mut self, pattern: impl IntoSymbols<C>) -> Result<PatternId> {
        let symbols = pattern.collect_symbols();
        self.insert_slice(&symbols, None)
    }

    /// Inserts every pattern in order, stopping at the first error.
    ///
    /// Patterns inserted before the failing one stay in the store. The error's index
    /// refers to the position in `patterns`.
    pub fn insert_all<P: IntoSymbols<C>>(
        &mut self,
        patterns: impl IntoIterator<Item = P>,
    ) -> Result<Vec<PatternId>> {
        patterns
            .into_iter()
            .enumerate()
            .map(|(i, pattern)| {
                let symbols = pattern.collect_symbols();
                self.insert_slice(&symbols, Some(i))
            })
            .collect()
    }

    fn insert_slice(&mut self, symbols: &[C], index: Option<usize>) -> Result<PatternId> {
        if symbols.is_empty() {
            return Err(AcError::InvalidPattern { index });
        }

        let (mut node, matched) = self.longest_prefix(symbols);
        if matched == symbols.len() {
            if let Some(existing) = self.nodes[node].own {
                return Ok(existing);
            }
        }

        let missing = symbols.len() - matched;
        if self.nodes.len() + missing > MAX_NODES {
            return Err(nodes_exhausted());
        }
        // Depths matched+1..=len of the new nodes.
        let added = (matched + 1..=symbols.len()).sum::<usize>();
        let depth_sum = self
            .depth_sum
            .checked_add(added)
            .filter(|&sum| sum <= self.max_outputs)
            .ok_or(AcError::Capacity {
                resource: "output entries",
                max: self.max_outputs,
            })?;
        let id = PatternId(u32::try_from(self.patterns.len()).map_err(|_| nodes_exhausted())?);

        for (depth, &symbol) in symbols.iter().enumerate().skip(matched) {
            let child = Node::child_of(node, symbol, depth as u32 + 1);
            let child = self
                .nodes
                .alloc(child)
                .ok_or_else(nodes_exhausted)?;
            self.nodes[node].children.insert(symbol, child);
            node = child;
        }
        self.nodes[node].own = Some(id);
        self.patterns.push(symbols.into());
        self.depth_sum = depth_sum;
        Ok(id)
    }

    /// Follows forward edges as far as `symbols` allows.
    fn longest_prefix(&self, symbols: &[C]) -> (NodeId, usize) {
        let mut node = NodeId::ROOT;
        for (i, &symbol) in symbols.iter().enumerate() {
            match self.nodes[node].children.get(symbol) {
                Some(child) => node = child,
                None => return (node, i),
            }
        }
        (node, symbols.len())
    }

    /// Returns true if the given pattern has been inserted.
    pub fn contains(&self, pattern: impl IntoSymbols<C>) -> bool {
        let symbols = pattern.collect_symbols();
        let (node, matched) = self.longest_prefix(&symbols);
        matched == symbols.len() && self.nodes[node].own.is_some()
    }

    /// Returns the number of distinct patterns.
    pub fn num_patterns(&self) -> usize {
        self.patterns.len()
    }

    /// Returns the number of trie nodes, root included.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no pattern has been inserted.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Computes failure links and merged outputs, producing an immutable automaton.
    ///
    /// Nodes are visited breadth first. The failure target of a node is always shallower
    /// than the node, so it has already been visited and its output set is complete
    /// when the node's own set is merged from it.
    pub fn build(self) -> Automaton<C> {
        let TrieStore {
            mut nodes,
            patterns,
            ..
        } = self;

        let mut outputs: Vec<PatternId> = Vec::with_capacity(patterns.len());
        let mut queue = VecDeque::with_capacity(nodes.len());

        let root_children: SmallVec<[(C, NodeId); 8]> =
            nodes[NodeId::ROOT].children.iter().collect();
        for (_, child) in root_children {
            nodes[child].fail = NodeId::ROOT;
            queue.push_back(child);
        }

        while let Some(u) = queue.pop_front() {
            merge_outputs(&mut nodes, &mut outputs, u);

            let edges: SmallVec<[(C, NodeId); 4]> = nodes[u].children.iter().collect();
            for (symbol, v) in edges {
                let mut f = nodes[u].fail;
                let target = loop {
                    if let Some(next) = nodes[f].children.get(symbol) {
                        break next;
                    }
                    if f.is_root() {
                        break NodeId::ROOT;
                    }
                    f = nodes[f].fail;
                };
                debug_assert!(nodes[target].depth < nodes[v].depth);
                nodes[v].fail = target;
                queue.push_back(v);
            }
        }

        tracing::debug!(
            nodes = nodes.len(),
            patterns = patterns.len(),
            outputs = outputs.len(),
            "built automaton"
        );

        Automaton {
            nodes,
            outputs,
            patterns,
        }
    }
}

fn nodes_exhausted() -> AcError {
    AcError::Capacity {
        resource: "nodes",
        max: MAX_NODES,
    }
}

/// Writes `u`'s output set as its failure target's set followed by its own pattern.
///
/// The table never exceeds the store's depth sum, which insertion keeps within
/// [`MAX_OUTPUTS`], so offsets fit in `u32`.
fn merge_outputs<C: Symbol>(
    nodes: &mut NodeArena<Node<C>>,
    outputs: &mut Vec<PatternId>,
    u: NodeId,
) {
    let fail = &nodes[nodes[u].fail];
    let inherited = fail.output_start as usize..(fail.output_start + fail.output_len) as usize;
    let start = outputs.len();
    outputs.extend_from_within(inherited);
    if let Some(own) = nodes[u].own {
        outputs.push(own);
    }
    let node = &mut nodes[u];
    node.output_start = start as u32;
    node.output_len = (outputs.len() - start) as u32;
}

/// Builds an automaton from a collection of patterns.
///
/// Fails fast on the first empty pattern; nothing is built in that case.
///
/// # Examples
///
/// ```
/// use libacmatch::ac::{build_automaton, AcError};
///
/// let automaton = build_automaton(["apple", "pie"]).unwrap();
/// assert_eq!(automaton.num_patterns(), 2);
///
/// let err = build_automaton(["apple", ""]).unwrap_err();
/// assert_eq!(err, AcError::InvalidPattern { index: Some(1) });
/// ```
pub fn build_automaton<C, P>(patterns: impl IntoIterator<Item = P>) -> Result<Automaton<C>>
where
    C: Symbol,
    P: IntoSymbols<C>,
{
    let mut store = TrieStore::new();
    store.insert_all(patterns)?;
    Ok(store.build())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_pattern_is_rejected_and_store_stays_usable() {
        let mut store = TrieStore::<char>::new();
        assert_eq!(
            store.insert(""),
            Err(AcError::InvalidPattern { index: None })
        );
        assert_eq!(store.num_nodes(), 1);
        assert!(store.is_empty());

        let id = store.insert("abc").unwrap();
        assert_eq!(id.index(), 0);
        assert!(store.contains("abc"));
        assert_eq!(store.num_nodes(), 4);
    }

    #[test]
    fn shared_prefixes_share_nodes() {
        let mut store = TrieStore::new();
        store.insert("ABCDEF").unwrap();
        let before = store.num_nodes();
        store.insert("ABCXY").unwrap();
        assert_eq!(store.num_nodes(), before + 2);
        store.insert("ABC").unwrap();
        assert_eq!(store.num_nodes(), before + 2);
    }

    #[test]
    fn duplicates_count_once() {
        let mut store = TrieStore::new();
        let first = store.insert("dup").unwrap();
        store.insert("other").unwrap();
        let again = store.insert(String::from("dup")).unwrap();
        assert_eq!(first, again);
        assert_eq!(store.num_patterns(), 2);

        let automaton = store.build();
        assert_eq!(automaton.find_iter("dup".chars()).count(), 1);
    }

    #[test]
    fn prefix_of_existing_pattern_becomes_terminal() {
        let mut store = TrieStore::new();
        store.insert("CART").unwrap();
        assert!(!store.contains("CAR"));
        store.insert("CAR").unwrap();
        assert!(store.contains("CAR"));
        assert!(store.contains("CART"));
        assert!(!store.contains("CA"));
    }

    #[test]
    fn insert_all_reports_index_of_empty_pattern() {
        let mut store = TrieStore::new();
        let err = store.insert_all(["one", "two", "", "four"]).unwrap_err();
        assert_eq!(err, AcError::InvalidPattern { index: Some(2) });
        assert!(store.contains("two"));
        assert!(!store.contains("four"));
    }

    #[test]
    fn build_of_empty_store_matches_nothing() {
        let automaton = TrieStore::<char>::new().build();
        assert_eq!(automaton.num_nodes(), 1);
        assert_eq!(automaton.find_iter("anything".chars()).count(), 0);
        assert_eq!(automaton.find_fail_link_violation(), None);
    }

    #[test]
    fn build_is_consistent() {
        let automaton = build_automaton([
            "ASUFFIX",
            "BSUFFIX",
            "SUFFIX",
            "FIX",
            "X",
            "INBETWEEN",
            "BETWEEN",
        ])
        .unwrap();
        assert_eq!(automaton.find_fail_link_violation(), None);
    }

    #[test]
    fn output_table_stays_within_depth_sum() {
        let patterns = ["a", "aa", "aaa", "aaaa", "baaaa"];
        let mut store = TrieStore::new();
        store.insert_all(patterns).unwrap();
        let bound = store.depth_sum;
        assert_eq!(bound, 1 + 2 + 3 + 4 + 1 + 2 + 3 + 4 + 5);
        let automaton = store.build();
        assert!(automaton.outputs.len() <= bound);
        assert_eq!(automaton.find_iter("baaaa".chars()).count(), 11);
    }

    #[test]
    fn output_budget_overflow_is_rejected_atomically() {
        let mut store = TrieStore {
            max_outputs: 10,
            ..TrieStore::new()
        };
        store.insert("abcd").unwrap();
        let err = store.insert("xyzw").unwrap_err();
        assert_eq!(
            err,
            AcError::Capacity {
                resource: "output entries",
                max: 10
            }
        );
        assert_eq!(store.num_nodes(), 5);
        assert_eq!(store.num_patterns(), 1);
        // Reusing existing nodes costs nothing.
        store.insert("abc").unwrap();
        assert_eq!(err.to_string(), "automaton exceeds 10 output entries");
    }

    #[test]
    fn generic_store_with_u16() {
        let mut store = TrieStore::<u16>::new();
        store.insert([1u16, 2, 3]).unwrap();
        store.insert(vec![2u16, 3]).unwrap();
        let automaton = store.build();
        let found: Vec<_> = automaton
            .find_iter([0u16, 1, 2, 3])
            .map(|m| (m.start(), m.end()))
            .collect();
        assert_eq!(found, vec![(2, 4), (1, 4)]);
    }
}

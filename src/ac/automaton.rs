use std::fmt;

use super::builder::{TrieStore, build_automaton};
use super::children::{ChildIter, Children};
use super::error::Result;
use super::node_arena::{NodeArena, NodeId};
use super::symbol::{IntoSymbols, Symbol};

/// Identifier of an inserted pattern: the insertion index of its first insertion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatternId(pub(crate) u32);

impl PatternId {
    /// Returns the insertion index of the pattern.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One state of the automaton.
///
/// `children` are forward trie edges and `fail` is a back-reference; both are indices
/// into the owning arena.
#[derive(Clone, Debug)]
pub struct Node<C: Symbol> {
    pub(crate) children: Children<C>,
    pub(crate) fail: NodeId,
    pub(crate) parent: NodeId,
    pub(crate) label: Option<C>,
    pub(crate) depth: u32,
    pub(crate) own: Option<PatternId>,
    pub(crate) output_start: u32,
    pub(crate) output_len: u32,
}

impl<C: Symbol> Node<C> {
    pub(crate) fn root() -> Self {
        Node {
            children: Children::None,
            fail: NodeId::ROOT,
            parent: NodeId::ROOT,
            label: None,
            depth: 0,
            own: None,
            output_start: 0,
            output_len: 0,
        }
    }

    pub(crate) fn child_of(parent: NodeId, label: C, depth: u32) -> Self {
        Node {
            parent,
            label: Some(label),
            depth,
            ..Node::root()
        }
    }

    /// Returns the node that the `symbol` edge leads to, without following failure links.
    #[inline]
    pub fn get(&self, symbol: C) -> Option<NodeId> {
        self.children.get(symbol)
    }

    /// Returns an iterator over the forward edges of this node.
    #[inline]
    pub fn children(&self) -> ChildIter<'_, C> {
        self.children.iter()
    }

    /// Returns the number of forward edges.
    #[inline]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// The failure target. The root's failure target is the root itself.
    #[inline]
    pub fn fail(&self) -> NodeId {
        self.fail
    }

    /// The node this node was created under, and the root for the root.
    #[inline]
    pub fn parent(&self) -> NodeId {
        self.parent
    }

    /// The symbol on the edge from the parent. `None` for the root.
    #[inline]
    pub fn label(&self) -> Option<C> {
        self.label
    }

    /// Length of the string spelled from the root to this node.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth as usize
    }

    /// True if some inserted pattern ends exactly at this node.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.own.is_some()
    }

    /// The pattern ending exactly at this node, if any.
    #[inline]
    pub fn own_pattern(&self) -> Option<PatternId> {
        self.own
    }

    #[inline]
    fn output_range(&self) -> std::ops::Range<usize> {
        let start = self.output_start as usize;
        start..start + self.output_len as usize
    }
}

/// A finalized, read-only Aho-Corasick automaton.
///
/// Produced by [`TrieStore::build`]. Every node carries its pre-merged output set: the
/// patterns ending at the node itself and at every node on its failure chain, ordered by
/// increasing length. Scanning therefore never walks the failure chain to report matches,
/// which costs one output slot per inherited pattern per node.
///
/// The automaton is immutable and `Send + Sync`; any number of scans may run over it
/// concurrently, each with its own cursor.
///
/// # Examples
///
/// ```
/// use libacmatch::ac::Automaton;
///
/// let automaton = Automaton::new(["he", "she", "hers"]).unwrap();
/// let found: Vec<_> = automaton
///     .find_iter("ushers".chars())
///     .map(|m| (automaton.pattern(m.pattern()).unwrap().iter().collect::<String>(), m.start()))
///     .collect();
/// assert_eq!(
///     found,
///     [("he".to_string(), 2), ("she".to_string(), 1), ("hers".to_string(), 2)]
/// );
/// ```
#[derive(Clone)]
pub struct Automaton<C: Symbol> {
    pub(crate) nodes: NodeArena<Node<C>>,
    pub(crate) outputs: Vec<PatternId>,
    pub(crate) patterns: Vec<Box<[C]>>,
}

impl<C: Symbol> Automaton<C> {
    /// Builds an automaton from a collection of patterns.
    ///
    /// Identifiers are assigned in input order; a repeated pattern keeps the identifier
    /// of its first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`AcError::InvalidPattern`](super::AcError::InvalidPattern) if any pattern
    /// is empty.
    pub fn new<P: IntoSymbols<C>>(patterns: impl IntoIterator<Item = P>) -> Result<Self> {
        build_automaton(patterns)
    }

    /// Starts a new, empty [`TrieStore`].
    pub fn builder() -> TrieStore<C> {
        TrieStore::new()
    }

    /// Returns the root node identifier.
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Returns the node with the given identifier.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this automaton.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node<C> {
        &self.nodes[id]
    }

    /// Iterates over all nodes in creation order.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = (NodeId, &Node<C>)> {
        self.nodes.iter()
    }

    /// Returns the number of nodes, root included.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of distinct patterns.
    pub fn num_patterns(&self) -> usize {
        self.patterns.len()
    }

    /// Returns the symbols of a pattern.
    pub fn pattern(&self, id: PatternId) -> Option<&[C]> {
        self.patterns.get(id.index()).map(|p| &**p)
    }

    /// Returns the length of a pattern in symbols.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this automaton.
    #[inline]
    pub fn pattern_len(&self, id: PatternId) -> usize {
        self.patterns[id.index()].len()
    }

    /// Returns the length of the longest pattern, or zero if there are none.
    pub fn max_pattern_len(&self) -> usize {
        self.patterns.iter().map(|p| p.len()).max().unwrap_or(0)
    }

    /// Returns the merged output set of a node, ordered by increasing pattern length.
    #[inline]
    pub fn outputs(&self, id: NodeId) -> &[PatternId] {
        &self.outputs[self.nodes[id].output_range()]
    }

    /// Follows one symbol from `state`, taking failure links on a miss.
    ///
    /// Returns the root when no suffix of the current path can be extended.
    #[inline]
    pub fn next_state(&self, mut state: NodeId, symbol: C) -> NodeId {
        loop {
            let node = &self.nodes[state];
            if let Some(next) = node.children.get(symbol) {
                return next;
            }
            if state.is_root() {
                return NodeId::ROOT;
            }
            state = node.fail;
        }
    }

    /// Reconstructs the string spelled from the root to `id`.
    pub fn state_string(&self, id: NodeId) -> Vec<C> {
        let mut symbols = Vec::with_capacity(self.nodes[id].depth());
        let mut current = id;
        while let Some(label) = self.nodes[current].label {
            symbols.push(label);
            current = self.nodes[current].parent;
        }
        symbols.reverse();
        symbols
    }

    /// Walks `symbols` along forward edges only.
    pub fn walk_prefix(&self, symbols: &[C]) -> Option<NodeId> {
        symbols
            .iter()
            .try_fold(NodeId::ROOT, |id, &ch| self.nodes[id].children.get(ch))
    }

    /// Checks every failure link and output set against its definition.
    ///
    /// For every non-root node the failure target must spell the longest proper suffix
    /// of the node's string that is also a trie prefix, and the output set must list
    /// exactly the patterns that are suffixes of the node's string, shortest first.
    /// Returns the first node that violates this, or `None` if the automaton is
    /// consistent. Intended for tests and diagnostics; it is quadratic in pattern length.
    pub fn find_fail_link_violation(&self) -> Option<NodeId> {
        let root = &self.nodes[NodeId::ROOT];
        if root.fail != NodeId::ROOT || root.output_len != 0 {
            return Some(NodeId::ROOT);
        }
        self.nodes
            .iter()
            .skip(1)
            .find(|&(id, node)| !self.node_is_consistent(id, node))
            .map(|(id, _)| id)
    }

    fn node_is_consistent(&self, id: NodeId, node: &Node<C>) -> bool {
        let string = self.state_string(id);
        let fail_string = self.state_string(node.fail);
        if fail_string.len() >= string.len() || !string.ends_with(&fail_string) {
            return false;
        }
        if self.walk_prefix(&fail_string) != Some(node.fail) {
            return false;
        }
        let longer_suffix_is_prefix = (fail_string.len() + 1..string.len())
            .any(|k| self.walk_prefix(&string[string.len() - k..]).is_some());
        if longer_suffix_is_prefix {
            return false;
        }
        let mut expected: Vec<PatternId> = (1..=string.len())
            .filter_map(|k| {
                let suffix = &string[string.len() - k..];
                self.walk_prefix(suffix)
                    .and_then(|n| self.nodes[n].own)
            })
            .collect();
        expected.sort_by_key(|&p| self.pattern_len(p));
        self.outputs(id) == expected.as_slice()
    }

    /// Returns the total amount of heap used by this automaton in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.nodes.heap_bytes()
            + self
                .nodes
                .iter()
                .map(|(_, n)| n.children.heap_bytes())
                .sum::<usize>()
            + self.outputs.capacity() * std::mem::size_of::<PatternId>()
            + self
                .patterns
                .iter()
                .map(|p| p.len() * std::mem::size_of::<C>())
                .sum::<usize>()
    }
}

impl<C: Symbol> fmt::Debug for Automaton<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Automaton")
            .field("num_nodes", &self.num_nodes())
            .field("num_patterns", &self.num_patterns())
            .field("num_outputs", &self.outputs.len())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn string(a: &Automaton<char>, id: NodeId) -> String {
        a.state_string(id).into_iter().collect()
    }

    fn node_for(a: &Automaton<char>, s: &str) -> NodeId {
        let symbols: Vec<char> = s.chars().collect();
        a.walk_prefix(&symbols).unwrap()
    }

    #[test]
    fn classic_fail_links() {
        let a = Automaton::new(["he", "she", "his", "hers"]).unwrap();
        let fail_of = |s: &str| string(&a, a.node(node_for(&a, s)).fail());
        assert_eq!(fail_of("h"), "");
        assert_eq!(fail_of("s"), "");
        assert_eq!(fail_of("sh"), "h");
        assert_eq!(fail_of("she"), "he");
        assert_eq!(fail_of("hers"), "s");
        assert_eq!(fail_of("his"), "s");
        assert_eq!(a.find_fail_link_violation(), None);
    }

    #[test]
    fn outputs_are_merged_shortest_first() {
        let a = Automaton::new(["she", "he", "e"]).unwrap();
        let she = node_for(&a, "she");
        let lens: Vec<usize> = a.outputs(she).iter().map(|&p| a.pattern_len(p)).collect();
        assert_eq!(lens, vec![1, 2, 3]);
        assert!(a.outputs(a.root()).is_empty());
    }

    #[test]
    fn root_fails_to_itself() {
        let a = Automaton::new(["abc"]).unwrap();
        assert_eq!(a.node(a.root()).fail(), a.root());
        assert_eq!(a.next_state(a.root(), 'z'), a.root());
    }

    #[test]
    fn next_state_follows_fail_links() {
        let a = Automaton::new(["abcd", "bce"]).unwrap();
        let abc = node_for(&a, "abc");
        let bce = node_for(&a, "bce");
        assert_eq!(a.next_state(abc, 'e'), bce);
        assert_eq!(a.next_state(abc, 'd'), node_for(&a, "abcd"));
        assert_eq!(a.next_state(abc, 'x'), a.root());
    }

    #[test]
    fn state_string_round_trips() {
        let a = Automaton::new(["授人以鱼", "授人以渔"]).unwrap();
        for (id, _) in a.nodes() {
            let s = a.state_string(id);
            assert_eq!(a.walk_prefix(&s), Some(id));
        }
    }

    #[test]
    fn generic_u8() {
        let a: Automaton<u8> = Automaton::new([vec![1, 2, 3], vec![2, 3], vec![3]]).unwrap();
        assert_eq!(a.num_patterns(), 3);
        let n = a.walk_prefix(&[1, 2, 3]).unwrap();
        assert_eq!(a.outputs(n).len(), 3);
        assert_eq!(a.find_fail_link_violation(), None);
    }

    #[test]
    fn pattern_lookup() {
        let a = Automaton::new(["alpha", "beta"]).unwrap();
        assert_eq!(a.pattern(PatternId(1)), Some(&['b', 'e', 't', 'a'][..]));
        assert_eq!(a.pattern(PatternId(2)), None);
        assert_eq!(a.max_pattern_len(), 5);
    }

    #[test]
    fn automaton_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Automaton<char>>();
        assert_send_sync::<Automaton<u8>>();
    }

    #[test]
    fn concurrent_scans_agree_with_a_single_thread() {
        let a = Automaton::new(["he", "she", "his", "hers", "s"]).unwrap();
        let texts: Vec<String> = (0..8)
            .map(|i| format!("{}ushers {} his shes", "s".repeat(i), "he".repeat(i)))
            .collect();
        let expected: Vec<_> = texts.iter().map(|t| a.find_all(t.chars())).collect();

        let shared = &a;
        let found: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = texts
                .iter()
                .map(|t| scope.spawn(move || shared.find_all(t.chars())))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(found, expected);
    }
}

//! A double-array re-encoding of a finalized automaton.
//!
//! Each state is stored as a `BASE`/`CHECK` pair in one flat array: the child of state
//! `s` on symbol code `c` lives at `BASE[s] + c`, and is valid only if its `CHECK`
//! equals `s`. Symbols are first mapped to dense codes, most frequent edge label
//! first, which keeps the array small. The view is built from an [`Automaton`] and
//! never changes it; scanning it reports exactly the same matches.

use hashbrown::HashMap;
use itertools::Itertools;

use super::automaton::{Automaton, PatternId};
use super::node_arena::NodeId;
use super::scan::Match;
use super::symbol::Symbol;

// Base of a state without children.
const BASE_INVALID: i32 = i32::MAX;
// Check of a slot not holding a child, and of the root.
const CHECK_NONE: u32 = u32::MAX;
const ROOT_IDX: u32 = 0;

#[derive(Clone, Copy, Debug)]
struct State {
    base: i32,
    check: u32,
    fail: u32,
    output_start: u32,
    output_len: u32,
}

impl Default for State {
    fn default() -> Self {
        State {
            base: BASE_INVALID,
            check: CHECK_NONE,
            fail: ROOT_IDX,
            output_start: 0,
            output_len: 0,
        }
    }
}

/// A read-only, cache-friendly copy of an [`Automaton`].
///
/// # Examples
///
/// ```
/// use libacmatch::ac::{Automaton, CompactAutomaton};
///
/// let automaton = Automaton::new(["bcd", "ab", "a"]).unwrap();
/// let compact = CompactAutomaton::from_automaton(&automaton);
/// assert_eq!(compact.num_states(), 6);
/// assert_eq!(
///     compact.find_all("abcd".chars()),
///     automaton.find_all("abcd".chars()),
/// );
/// ```
#[derive(Clone, Debug)]
pub struct CompactAutomaton<C: Symbol> {
    states: Vec<State>,
    alphabet: HashMap<C, u32>,
    outputs: Vec<PatternId>,
    pattern_lens: Vec<u32>,
    num_states: usize,
}

impl<C: Symbol> CompactAutomaton<C> {
    /// Re-encodes `automaton` as a double array.
    pub fn from_automaton(automaton: &Automaton<C>) -> Self {
        let alphabet = rank_alphabet(automaton);
        let num_nodes = automaton.num_nodes();

        let mut states = vec![State::default(); num_nodes];
        let mut used = vec![false; num_nodes];
        used[ROOT_IDX as usize] = true;
        let mut index_of = vec![ROOT_IDX; num_nodes];
        let mut first_free = 1;

        // Children are placed parent by parent, in breadth-first order.
        let mut order = Vec::with_capacity(num_nodes);
        order.push(NodeId::ROOT);
        let mut next = 0;
        while let Some(&id) = order.get(next) {
            next += 1;
            let node = automaton.node(id);
            if node.child_count() == 0 {
                continue;
            }
            let edges: Vec<(u32, NodeId)> = node
                .children()
                .map(|(symbol, child)| (alphabet[&symbol], child))
                .collect();
            while used.get(first_free).copied().unwrap_or(false) {
                first_free += 1;
            }
            let base = find_base(&used, first_free, &edges);
            let parent_idx = index_of[id.index()];
            states[parent_idx as usize].base = base;
            for &(code, child) in &edges {
                let idx = (base as i64 + code as i64) as usize;
                if idx >= states.len() {
                    states.resize(idx + 1, State::default());
                    used.resize(idx + 1, false);
                }
                used[idx] = true;
                states[idx].check = parent_idx;
                index_of[child.index()] = idx as u32;
                order.push(child);
            }
        }

        for (id, node) in automaton.nodes() {
            let state = &mut states[index_of[id.index()] as usize];
            state.fail = index_of[node.fail().index()];
            state.output_start = node.output_start;
            state.output_len = node.output_len;
        }
        states.shrink_to_fit();

        let pattern_lens = automaton
            .patterns
            .iter()
            .map(|p| p.len() as u32)
            .collect();

        tracing::debug!(
            states = num_nodes,
            elements = states.len(),
            alphabet = alphabet.len(),
            "compacted automaton"
        );

        CompactAutomaton {
            states,
            alphabet,
            outputs: automaton.outputs.clone(),
            pattern_lens,
            num_states: num_nodes,
        }
    }

    /// Returns the number of automaton states encoded.
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Returns the number of slots in the double array, used or not.
    pub fn num_elements(&self) -> usize {
        self.states.len()
    }

    /// Returns the total amount of heap used by this view in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.states.capacity() * std::mem::size_of::<State>()
            + self.alphabet.capacity() * std::mem::size_of::<(C, u32)>()
            + self.outputs.capacity() * std::mem::size_of::<PatternId>()
            + self.pattern_lens.capacity() * std::mem::size_of::<u32>()
    }

    #[inline]
    fn child(&self, state: u32, code: u32) -> Option<u32> {
        let base = self.states[state as usize].base;
        if base == BASE_INVALID {
            return None;
        }
        let idx = usize::try_from(base as i64 + code as i64).ok()?;
        let slot = self.states.get(idx)?;
        (slot.check == state).then_some(idx as u32)
    }

    #[inline]
    fn next_state(&self, mut state: u32, symbol: C) -> u32 {
        let Some(&code) = self.alphabet.get(&symbol) else {
            return ROOT_IDX;
        };
        loop {
            if let Some(next) = self.child(state, code) {
                return next;
            }
            if state == ROOT_IDX {
                return ROOT_IDX;
            }
            state = self.states[state as usize].fail;
        }
    }

    /// Returns an iterator over every occurrence of every pattern in `text`, in the
    /// same order as [`Automaton::find_iter`].
    pub fn find_iter<I>(&self, text: I) -> CompactFindIter<'_, C, I::IntoIter>
    where
        I: IntoIterator<Item = C>,
    {
        CompactFindIter {
            automaton: self,
            text: text.into_iter(),
            state: ROOT_IDX,
            offset: 0,
            pending: 0..0,
        }
    }

    /// Collects [`find_iter`](CompactAutomaton::find_iter) into a vector.
    pub fn find_all<I>(&self, text: I) -> Vec<Match>
    where
        I: IntoIterator<Item = C>,
    {
        self.find_iter(text).collect()
    }
}

/// Iterator over the matches of a [`CompactAutomaton`].
#[derive(Clone, Debug)]
pub struct CompactFindIter<'a, C: Symbol, I> {
    automaton: &'a CompactAutomaton<C>,
    text: I,
    state: u32,
    offset: usize,
    pending: std::ops::Range<usize>,
}

impl<C: Symbol, I: Iterator<Item = C>> Iterator for CompactFindIter<'_, C, I> {
    type Item = Match;

    #[inline]
    fn next(&mut self) -> Option<Match> {
        loop {
            if let Some(i) = self.pending.next() {
                let pattern = self.automaton.outputs[i];
                let len = self.automaton.pattern_lens[pattern.index()] as usize;
                return Some(Match {
                    start: self.offset - len,
                    end: self.offset,
                    pattern,
                });
            }
            let symbol = self.text.next()?;
            self.state = self.automaton.next_state(self.state, symbol);
            self.offset += 1;
            let state = &self.automaton.states[self.state as usize];
            let start = state.output_start as usize;
            self.pending = start..start + state.output_len as usize;
        }
    }
}

/// Assigns dense codes to edge labels, most frequent first.
fn rank_alphabet<C: Symbol>(automaton: &Automaton<C>) -> HashMap<C, u32> {
    automaton
        .nodes()
        .flat_map(|(_, node)| node.children().map(|(symbol, _)| symbol))
        .counts()
        .into_iter()
        .sorted_by(|(s1, n1), (s2, n2)| n2.cmp(n1).then(s1.cmp(s2)))
        .enumerate()
        .map(|(code, (symbol, _))| (symbol, code as u32))
        .collect()
}

/// Finds the smallest base placing every edge on a free slot, with the smallest code
/// landing at or after `first_free`.
fn find_base(used: &[bool], first_free: usize, edges: &[(u32, NodeId)]) -> i32 {
    let is_free = |idx: usize| !used.get(idx).copied().unwrap_or(false);
    let min_code = edges.iter().map(|&(code, _)| code).min().unwrap_or(0) as i64;
    let mut slot = first_free;
    loop {
        if is_free(slot) {
            let base = slot as i64 - min_code;
            let fits = edges
                .iter()
                .all(|&(code, _)| is_free((base + code as i64) as usize));
            if fits {
                return base as i32;
            }
        }
        slot += 1;
    }
}

impl<C: Symbol> Automaton<C> {
    /// Builds a [`CompactAutomaton`] view of this automaton.
    pub fn compact(&self) -> CompactAutomaton<C> {
        CompactAutomaton::from_automaton(self)
    }
}

//! Scanners that tolerate text symbols not belonging to the patterns.
//!
//! [`SkipIter`] elides whole stop words from the stream fed to the automaton.
//! [`BoundedSkipIter`] allows a bounded number of stray symbols inside each occurrence.

use std::collections::VecDeque;
use std::slice;

use hashbrown::{HashMap, HashSet};

use super::automaton::{Automaton, PatternId};
use super::builder::build_automaton;
use super::error::{AcError, Result};
use super::node_arena::NodeId;
use super::scan::Match;
use super::symbol::{IntoSymbols, Symbol, Symbols};

/// Default upper bound for the bounded-skip scanner's `max_skip`.
pub const DEFAULT_MAX_SKIP: usize = 64;

/// Default number of states one bounded-skip scan may explore.
pub const DEFAULT_MAX_STATES: usize = 1 << 24;

/// Resource limits for the bounded-skip scanner.
///
/// One start offset may visit every trie node at each of up to
/// `depth × (max_skip + 1)` offsets, so both the skip bound and the total number of
/// explored states are capped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkipLimits {
    /// Largest `max_skip` accepted.
    pub max_skip: usize,
    /// Largest number of `(node, offset)` states explored over a whole scan.
    pub max_states: usize,
}

impl SkipLimits {
    /// Creates limits accepting skip bounds up to `max_skip`, with the default state
    /// budget.
    pub const fn new(max_skip: usize) -> Self {
        SkipLimits {
            max_skip,
            max_states: DEFAULT_MAX_STATES,
        }
    }

    /// Replaces the state budget.
    pub const fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = max_states;
        self
    }

    fn check(&self, requested: usize) -> Result<()> {
        if requested > self.max_skip {
            return Err(AcError::ResourceBound {
                resource: "max_skip",
                requested,
                limit: self.max_skip,
            });
        }
        Ok(())
    }
}

impl Default for SkipLimits {
    fn default() -> Self {
        SkipLimits::new(DEFAULT_MAX_SKIP)
    }
}

/// Iterator over matches in a text with stop words elided.
///
/// Created by [`Automaton::find_skip_iter`]. Before each text position is consumed,
/// the longest skip word starting there (if any) is stepped over without being fed to
/// the automaton and without resetting its state. Offsets refer to the original text;
/// a match reports the offset of its first symbol actually fed to the automaton.
pub struct SkipIter<'a, C: Symbol> {
    automaton: &'a Automaton<C>,
    skip_words: Automaton<C>,
    text: Symbols<C>,
    pos: usize,
    state: NodeId,
    // Original offsets of the most recently fed symbols, at most one per symbol of
    // the longest pattern.
    fed: VecDeque<usize>,
    window: usize,
    pending: slice::Iter<'a, PatternId>,
}

impl<'a, C: Symbol> SkipIter<'a, C> {
    /// Length of the longest skip word that the text starts with at `pos`.
    fn skip_len_at(&self, pos: usize) -> Option<usize> {
        let mut node = self.skip_words.root();
        let mut longest = None;
        for (len, &symbol) in self.text[pos..].iter().enumerate() {
            match self.skip_words.node(node).get(symbol) {
                Some(next) => node = next,
                None => break,
            }
            if self.skip_words.node(node).is_terminal() {
                longest = Some(len + 1);
            }
        }
        longest
    }

    fn feed(&mut self) -> Option<()> {
        while let Some(len) = self.skip_len_at(self.pos) {
            self.pos += len;
        }
        let automaton = self.automaton;
        let symbol = *self.text.get(self.pos)?;
        self.state = automaton.next_state(self.state, symbol);
        if self.window > 0 {
            if self.fed.len() >= self.window {
                self.fed.pop_front();
            }
            self.fed.push_back(self.pos);
        }
        self.pos += 1;
        self.pending = automaton.outputs(self.state).iter();
        Some(())
    }
}

impl<C: Symbol> Iterator for SkipIter<'_, C> {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        loop {
            if let Some(&pattern) = self.pending.next() {
                let len = self.automaton.pattern_len(pattern);
                return Some(Match {
                    start: self.fed[self.fed.len() - len],
                    end: self.pos,
                    pattern,
                });
            }
            self.feed()?;
        }
    }
}

/// Iterator over matches that may contain up to `max_skip` consecutive stray symbols.
///
/// Created by [`Automaton::find_bounded_skip_iter`]. Start offsets are processed in
/// increasing order; for each one, a breadth-first search runs one text offset at a
/// time over states `(node, consecutive skips)`, following forward trie edges only. A
/// skip is only possible once an occurrence has begun, and each successful step resets
/// the skip count. A node appears at most once per offset, with the fewest skips that
/// reach it. Each pattern is reported once per start offset, with its smallest end
/// offset.
///
/// Items are `Err(AcError::ResourceBound)` once the scan has explored more states than
/// [`SkipLimits::max_states`]; the iterator is finished after that.
pub struct BoundedSkipIter<'a, C: Symbol> {
    automaton: &'a Automaton<C>,
    text: Symbols<C>,
    max_skip: usize,
    max_states: usize,
    explored: usize,
    start: usize,
    exhausted: bool,
    pending: VecDeque<Match>,
    reported: HashSet<PatternId>,
    layer: Vec<(NodeId, usize)>,
    next_layer: HashMap<NodeId, usize>,
}

impl<C: Symbol> BoundedSkipIter<'_, C> {
    fn explore(&mut self, start: usize) -> Result<()> {
        self.reported.clear();
        self.layer.clear();
        self.layer.push((NodeId::ROOT, 0));

        let automaton = self.automaton;
        let before = self.explored;
        let mut found = Vec::new();

        for (offset, &symbol) in self.text.iter().enumerate().skip(start) {
            if self.layer.is_empty() {
                break;
            }
            self.next_layer.clear();
            for &(id, skips) in &self.layer {
                let node = automaton.node(id);
                if let Some(child) = node.get(symbol) {
                    self.next_layer.insert(child, 0);
                }
                if !id.is_root() && skips < self.max_skip {
                    let entry = self.next_layer.entry(id).or_insert(skips + 1);
                    *entry = (*entry).min(skips + 1);
                }
            }

            self.explored += self.next_layer.len();
            if self.explored > self.max_states {
                return Err(AcError::ResourceBound {
                    resource: "explored states",
                    requested: self.explored,
                    limit: self.max_states,
                });
            }

            self.layer.clear();
            self.layer.extend(self.next_layer.drain());
            for &(id, skips) in &self.layer {
                if skips > 0 {
                    continue;
                }
                if let Some(pattern) = automaton.node(id).own_pattern() {
                    if self.reported.insert(pattern) {
                        found.push(Match {
                            start,
                            end: offset + 1,
                            pattern,
                        });
                    }
                }
            }
        }

        tracing::trace!(
            start,
            states = self.explored - before,
            matches = found.len(),
            "explored start offset"
        );

        found.sort_by_key(|m| (m.end, automaton.pattern_len(m.pattern), m.pattern));
        self.pending.extend(found);
        Ok(())
    }
}

impl<C: Symbol> Iterator for BoundedSkipIter<'_, C> {
    type Item = Result<Match>;

    fn next(&mut self) -> Option<Result<Match>> {
        loop {
            if let Some(m) = self.pending.pop_front() {
                return Some(Ok(m));
            }
            if self.exhausted || self.start >= self.text.len() {
                return None;
            }
            let start = self.start;
            self.start += 1;
            if let Err(err) = self.explore(start) {
                tracing::debug!(start, %err, "bounded-skip scan stopped");
                self.exhausted = true;
                return Some(Err(err));
            }
        }
    }
}

impl<C: Symbol> Automaton<C> {
    /// Scans `text` while stepping over any of `skip_words`.
    ///
    /// # Errors
    ///
    /// Returns [`AcError::InvalidPattern`] if a skip word is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use libacmatch::ac::Automaton;
    ///
    /// let automaton = Automaton::new(["apple"]).unwrap();
    /// let found: Vec<_> = automaton
    ///     .find_skip_iter("the apple", ["the "])
    ///     .unwrap()
    ///     .map(|m| m.start())
    ///     .collect();
    /// assert_eq!(found, [4]);
    /// ```
    pub fn find_skip_iter<T, W>(
        &self,
        text: T,
        skip_words: impl IntoIterator<Item = W>,
    ) -> Result<SkipIter<'_, C>>
    where
        T: IntoSymbols<C>,
        W: IntoSymbols<C>,
    {
        let skip_words = build_automaton(skip_words)?;
        tracing::debug!(skip_words = skip_words.num_patterns(), "indexed skip words");
        let window = self.max_pattern_len();
        Ok(SkipIter {
            automaton: self,
            skip_words,
            text: text.collect_symbols(),
            pos: 0,
            state: NodeId::ROOT,
            fed: VecDeque::with_capacity(window),
            window,
            pending: slice::Iter::default(),
        })
    }

    /// Scans `text` allowing up to `max_skip` consecutive stray symbols inside a match,
    /// with the [default limits](SkipLimits::default).
    ///
    /// With `max_skip == 0` this reports exactly the matches of
    /// [`find_iter`](Automaton::find_iter), ordered by start offset instead.
    ///
    /// # Errors
    ///
    /// Returns [`AcError::ResourceBound`] if `max_skip` exceeds [`DEFAULT_MAX_SKIP`].
    /// The iterator itself yields `ResourceBound` once the scan explores more than
    /// [`DEFAULT_MAX_STATES`] states.
    ///
    /// # Examples
    ///
    /// ```
    /// use libacmatch::ac::Automaton;
    ///
    /// let automaton = Automaton::new(["abc"]).unwrap();
    /// let found: Vec<_> = automaton
    ///     .find_bounded_skip_iter("a-b--c", 2)
    ///     .unwrap()
    ///     .map(|m| m.map(|m| m.range()))
    ///     .collect::<Result<_, _>>()
    ///     .unwrap();
    /// assert_eq!(found, [0..6]);
    /// assert!(automaton.find_bounded_skip_iter("a-b--c", 1).unwrap().next().is_none());
    /// ```
    pub fn find_bounded_skip_iter<T>(&self, text: T, max_skip: usize) -> Result<BoundedSkipIter<'_, C>>
    where
        T: IntoSymbols<C>,
    {
        self.find_bounded_skip_with(text, max_skip, &SkipLimits::default())
    }

    /// Like [`find_bounded_skip_iter`](Automaton::find_bounded_skip_iter) with explicit
    /// limits.
    ///
    /// # Errors
    ///
    /// Returns [`AcError::ResourceBound`] if `max_skip` exceeds `limits.max_skip`, and
    /// yields it from the iterator once more than `limits.max_states` states are explored.
    pub fn find_bounded_skip_with<T>(
        &self,
        text: T,
        max_skip: usize,
        limits: &SkipLimits,
    ) -> Result<BoundedSkipIter<'_, C>>
    where
        T: IntoSymbols<C>,
    {
        limits.check(max_skip)?;
        Ok(BoundedSkipIter {
            automaton: self,
            text: text.collect_symbols(),
            max_skip,
            max_states: limits.max_states,
            explored: 0,
            start: 0,
            exhausted: false,
            pending: VecDeque::new(),
            reported: HashSet::new(),
            layer: Vec::new(),
            next_layer: HashMap::new(),
        })
    }
}

//! Exact multi-pattern scanning over a finalized [`Automaton`].
//!
//! All scanners report offsets in symbols of the original text. Text is pulled one
//! symbol at a time and never revisited, and results are produced lazily.

use std::ops::Range;
use std::slice;

use super::automaton::{Automaton, PatternId};
use super::node_arena::NodeId;
use super::symbol::Symbol;

/// One occurrence of a pattern in a text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Match {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) pattern: PatternId,
}

impl Match {
    /// Offset of the first symbol of the occurrence.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Offset one past the last symbol of the occurrence.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// The pattern that was found.
    #[inline]
    pub fn pattern(&self) -> PatternId {
        self.pattern
    }

    /// Number of text symbols covered, skipped symbols included.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false: patterns are never empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The covered span as a range.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A scan cursor that is fed one symbol at a time.
///
/// The cursor keeps the current state and offset between calls, so a text may be
/// delivered in pieces or as an unbounded stream.
///
/// # Examples
///
/// ```
/// use libacmatch::ac::Automaton;
///
/// let automaton = Automaton::new(["hers"]).unwrap();
/// let mut scanner = automaton.stream();
/// for ch in "he".chars() {
///     assert_eq!(scanner.feed(ch).count(), 0);
/// }
/// // ... later, the rest of the stream arrives.
/// scanner.feed('r');
/// let m = scanner.feed('s').next().unwrap();
/// assert_eq!((m.start(), m.end()), (0, 4));
/// ```
#[derive(Clone, Debug)]
pub struct StreamScanner<'a, C: Symbol> {
    automaton: &'a Automaton<C>,
    state: NodeId,
    offset: usize,
}

impl<'a, C: Symbol> StreamScanner<'a, C> {
    /// Creates a cursor at the root, at offset zero.
    pub fn new(automaton: &'a Automaton<C>) -> Self {
        StreamScanner {
            automaton,
            state: NodeId::ROOT,
            offset: 0,
        }
    }

    /// Consumes one symbol and returns the matches ending at it.
    ///
    /// The returned matches are ordered by increasing pattern length.
    #[inline]
    pub fn feed(&mut self, symbol: C) -> Outputs<'a, C> {
        self.state = self.automaton.next_state(self.state, symbol);
        self.offset += 1;
        Outputs::new(self.automaton, self.state, self.offset)
    }

    /// Number of symbols consumed so far.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The current automaton state.
    #[inline]
    pub fn state(&self) -> NodeId {
        self.state
    }

    /// Returns the cursor to the root at offset zero.
    pub fn reset(&mut self) {
        self.state = NodeId::ROOT;
        self.offset = 0;
    }
}

/// The matches ending at one text position, shortest pattern first.
#[derive(Clone, Debug)]
pub struct Outputs<'a, C: Symbol> {
    automaton: &'a Automaton<C>,
    patterns: slice::Iter<'a, PatternId>,
    end: usize,
}

impl<'a, C: Symbol> Outputs<'a, C> {
    fn new(automaton: &'a Automaton<C>, state: NodeId, end: usize) -> Self {
        Outputs {
            automaton,
            patterns: automaton.outputs(state).iter(),
            end,
        }
    }

    fn empty(automaton: &'a Automaton<C>) -> Self {
        Outputs {
            automaton,
            patterns: slice::Iter::default(),
            end: 0,
        }
    }

    #[inline]
    fn to_match(&self, pattern: PatternId) -> Match {
        Match {
            start: self.end - self.automaton.pattern_len(pattern),
            end: self.end,
            pattern,
        }
    }
}

impl<C: Symbol> Iterator for Outputs<'_, C> {
    type Item = Match;

    #[inline]
    fn next(&mut self) -> Option<Match> {
        let pattern = *self.patterns.next()?;
        Some(self.to_match(pattern))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.patterns.size_hint()
    }
}

impl<C: Symbol> DoubleEndedIterator for Outputs<'_, C> {
    #[inline]
    fn next_back(&mut self) -> Option<Match> {
        let pattern = *self.patterns.next_back()?;
        Some(self.to_match(pattern))
    }
}

impl<C: Symbol> ExactSizeIterator for Outputs<'_, C> {}

/// Iterator over all, possibly overlapping, matches in a text.
///
/// Created by [`Automaton::find_iter`]. Matches are ordered by end offset, then by
/// increasing pattern length.
#[derive(Clone, Debug)]
pub struct FindIter<'a, C: Symbol, I> {
    scanner: StreamScanner<'a, C>,
    text: I,
    pending: Outputs<'a, C>,
}

impl<C: Symbol, I: Iterator<Item = C>> Iterator for FindIter<'_, C, I> {
    type Item = Match;

    #[inline]
    fn next(&mut self) -> Option<Match> {
        loop {
            if let Some(m) = self.pending.next() {
                return Some(m);
            }
            let symbol = self.text.next()?;
            self.pending = self.scanner.feed(symbol);
        }
    }
}

impl<C: Symbol> Automaton<C> {
    /// Returns a cursor for incremental scanning.
    pub fn stream(&self) -> StreamScanner<'_, C> {
        StreamScanner::new(self)
    }

    /// Returns an iterator over every occurrence of every pattern in `text`.
    ///
    /// Overlapping occurrences are all reported. For a `&str`, pass `text.chars()`;
    /// offsets are then `char` indices.
    ///
    /// # Examples
    ///
    /// ```
    /// use libacmatch::ac::Automaton;
    ///
    /// let automaton = Automaton::new(["aa"]).unwrap();
    /// let starts: Vec<_> = automaton.find_iter("aaaa".chars()).map(|m| m.start()).collect();
    /// assert_eq!(starts, [0, 1, 2]);
    /// ```
    pub fn find_iter<I>(&self, text: I) -> FindIter<'_, C, I::IntoIter>
    where
        I: IntoIterator<Item = C>,
    {
        FindIter {
            scanner: self.stream(),
            text: text.into_iter(),
            pending: Outputs::empty(self),
        }
    }

    /// Collects [`find_iter`](Automaton::find_iter) into a vector.
    pub fn find_all<I>(&self, text: I) -> Vec<Match>
    where
        I: IntoIterator<Item = C>,
    {
        self.find_iter(text).collect()
    }

    /// Returns the longest match in the whole text.
    ///
    /// Among matches of equal length, the one found first wins, which is the one with
    /// the smallest end offset. Returns `None` if nothing matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use libacmatch::ac::Automaton;
    ///
    /// let automaton = Automaton::new(["ab", "cd", "bcd"]).unwrap();
    /// let m = automaton.find_longest("abcd".chars()).unwrap();
    /// assert_eq!((m.start(), m.end()), (1, 4));
    /// ```
    pub fn find_longest<I>(&self, text: I) -> Option<Match>
    where
        I: IntoIterator<Item = C>,
    {
        let mut scanner = self.stream();
        let mut best: Option<Match> = None;
        for symbol in text {
            if let Some(m) = scanner.feed(symbol).next_back() {
                if best.is_none_or(|b| m.len() > b.len()) {
                    best = Some(m);
                }
            }
        }
        best
    }

    /// Returns, for every end offset with at least one match, the longest pattern
    /// ending there.
    ///
    /// # Examples
    ///
    /// ```
    /// use libacmatch::ac::Automaton;
    ///
    /// let automaton = Automaton::new(["he", "she", "hers"]).unwrap();
    /// let spans: Vec<_> = automaton
    ///     .find_longest_per_end_iter("ushers".chars())
    ///     .map(|m| m.range())
    ///     .collect();
    /// assert_eq!(spans, [1..4, 2..6]);
    /// ```
    pub fn find_longest_per_end_iter<I>(&self, text: I) -> impl Iterator<Item = Match>
    where
        I: IntoIterator<Item = C>,
    {
        let mut scanner = self.stream();
        text.into_iter()
            .filter_map(move |symbol| scanner.feed(symbol).next_back())
    }
}

use super::automaton::{Automaton, PatternId};
use super::builder::TrieStore;
use super::error::{AcError, Result};
use super::scan::{FindIter, Match};
use super::skip::{BoundedSkipIter, SkipIter};
use super::symbol::{IntoSymbols, Symbol};

#[derive(Clone, Debug)]
enum Stage<C: Symbol> {
    Building(TrieStore<C>),
    Ready(Automaton<C>),
}

/// A single handle that goes from collecting patterns to scanning.
///
/// [`TrieStore`] and [`Automaton`] make lifecycle mistakes unrepresentable. `Matcher`
/// is for callers that keep one long-lived value instead, such as a pattern supplier
/// and a text supplier sharing a field: misuse is reported at runtime as
/// [`AcError::AlreadyBuilt`] or [`AcError::NotBuilt`], and the matcher is left as it was.
///
/// # Examples
///
/// ```
/// use libacmatch::ac::{AcError, Matcher};
///
/// let mut matcher = Matcher::new();
/// matcher.insert("apple").unwrap();
/// assert_eq!(matcher.find_all("apple pie".chars()).unwrap_err(), AcError::NotBuilt);
///
/// matcher.build().unwrap();
/// assert_eq!(matcher.find_all("apple pie".chars()).unwrap().len(), 1);
/// assert_eq!(matcher.insert("pie").unwrap_err(), AcError::AlreadyBuilt);
/// ```
#[derive(Clone, Debug)]
pub struct Matcher<C: Symbol> {
    stage: Stage<C>,
}

impl<C: Symbol> Default for Matcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Symbol> From<TrieStore<C>> for Matcher<C> {
    fn from(store: TrieStore<C>) -> Self {
        Matcher {
            stage: Stage::Building(store),
        }
    }
}

impl<C: Symbol> From<Automaton<C>> for Matcher<C> {
    fn from(automaton: Automaton<C>) -> Self {
        Matcher {
            stage: Stage::Ready(automaton),
        }
    }
}

impl<C: Symbol> Matcher<C> {
    /// Creates a matcher with no patterns, ready for insertion.
    pub fn new() -> Self {
        TrieStore::new().into()
    }

    /// Inserts a pattern.
    ///
    /// # Errors
    ///
    /// [`AcError::AlreadyBuilt`] once [`build`](Matcher::build) has run, and the errors
    /// of [`TrieStore::insert`] otherwise.
    pub fn insert(&mut self, pattern: impl IntoSymbols<C>) -> Result<PatternId> {
        match &mut self.stage {
            Stage::Building(store) => store.insert(pattern),
            Stage::Ready(_) => Err(AcError::AlreadyBuilt),
        }
    }

    /// Computes failure links, making the matcher ready to scan.
    ///
    /// # Errors
    ///
    /// [`AcError::AlreadyBuilt`] if called a second time.
    pub fn build(&mut self) -> Result<&Automaton<C>> {
        let Stage::Building(store) = &mut self.stage else {
            return Err(AcError::AlreadyBuilt);
        };
        let store = std::mem::take(store);
        self.stage = Stage::Ready(store.build());
        self.automaton()
    }

    /// True once [`build`](Matcher::build) has run.
    pub fn is_built(&self) -> bool {
        matches!(self.stage, Stage::Ready(_))
    }

    /// Returns the finalized automaton.
    ///
    /// # Errors
    ///
    /// [`AcError::NotBuilt`] before [`build`](Matcher::build) has run.
    pub fn automaton(&self) -> Result<&Automaton<C>> {
        match &self.stage {
            Stage::Ready(automaton) => Ok(automaton),
            Stage::Building(_) => Err(AcError::NotBuilt),
        }
    }

    /// Consumes the matcher and returns the finalized automaton.
    ///
    /// # Errors
    ///
    /// [`AcError::NotBuilt`] before [`build`](Matcher::build) has run.
    pub fn into_automaton(self) -> Result<Automaton<C>> {
        match self.stage {
            Stage::Ready(automaton) => Ok(automaton),
            Stage::Building(_) => Err(AcError::NotBuilt),
        }
    }

    /// See [`Automaton::find_iter`].
    pub fn find_iter<I>(&self, text: I) -> Result<FindIter<'_, C, I::IntoIter>>
    where
        I: IntoIterator<Item = C>,
    {
        Ok(self.automaton()?.find_iter(text))
    }

    /// See [`Automaton::find_all`].
    pub fn find_all<I>(&self, text: I) -> Result<Vec<Match>>
    where
        I: IntoIterator<Item = C>,
    {
        Ok(self.automaton()?.find_all(text))
    }

    /// See [`Automaton::find_longest`].
    pub fn find_longest<I>(&self, text: I) -> Result<Option<Match>>
    where
        I: IntoIterator<Item = C>,
    {
        Ok(self.automaton()?.find_longest(text))
    }

    /// See [`Automaton::find_skip_iter`].
    pub fn find_skip_iter<T, W>(
        &self,
        text: T,
        skip_words: impl IntoIterator<Item = W>,
    ) -> Result<SkipIter<'_, C>>
    where
        T: IntoSymbols<C>,
        W: IntoSymbols<C>,
    {
        self.automaton()?.find_skip_iter(text, skip_words)
    }

    /// See [`Automaton::find_bounded_skip_iter`].
    pub fn find_bounded_skip_iter<T>(
        &self,
        text: T,
        max_skip: usize,
    ) -> Result<BoundedSkipIter<'_, C>>
    where
        T: IntoSymbols<C>,
    {
        self.automaton()?.find_bounded_skip_iter(text, max_skip)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn search_before_build_is_rejected() {
        let mut matcher = Matcher::new();
        matcher.insert("abc").unwrap();
        assert_eq!(matcher.find_all("abc".chars()), Err(AcError::NotBuilt));
        assert_eq!(matcher.find_longest("abc".chars()), Err(AcError::NotBuilt));
        assert!(matches!(
            matcher.find_skip_iter("abc", ["x"]),
            Err(AcError::NotBuilt)
        ));
        assert!(matches!(
            matcher.find_bounded_skip_iter("abc", 1),
            Err(AcError::NotBuilt)
        ));
        assert!(!matcher.is_built());
        // Still accepts patterns afterwards.
        matcher.insert("bc").unwrap();
        matcher.build().unwrap();
        assert_eq!(matcher.find_all("abc".chars()).unwrap().len(), 2);
    }

    #[test]
    fn insert_and_rebuild_after_build_are_rejected() {
        let mut matcher = Matcher::new();
        matcher.insert("abc").unwrap();
        let nodes = matcher.build().unwrap().num_nodes();
        assert_eq!(matcher.insert("xyz"), Err(AcError::AlreadyBuilt));
        assert!(matches!(matcher.build(), Err(AcError::AlreadyBuilt)));
        let automaton = matcher.automaton().unwrap();
        assert_eq!(automaton.num_nodes(), nodes);
        assert_eq!(automaton.num_patterns(), 1);
    }

    #[test]
    fn empty_pattern_leaves_matcher_usable() {
        let mut matcher = Matcher::new();
        assert_eq!(
            matcher.insert(""),
            Err(AcError::InvalidPattern { index: None })
        );
        matcher.insert("ok").unwrap();
        matcher.build().unwrap();
        assert_eq!(matcher.find_iter("ok".chars()).unwrap().count(), 1);
    }

    #[test]
    fn conversions() {
        let automaton = Automaton::new(["abc"]).unwrap();
        let matcher = Matcher::from(automaton);
        assert!(matcher.is_built());
        assert!(matcher.into_automaton().is_ok());

        let matcher = Matcher::<char>::from(TrieStore::new());
        assert_eq!(matcher.into_automaton().err(), Some(AcError::NotBuilt));
    }
}

/// Errors reported while building or scanning with an automaton.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum AcError {
    /// An empty pattern or skip word was supplied.
    ///
    /// `index` is the position of the offending item in the input collection, when the
    /// item came from one.
    #[error("empty pattern{}", .index.map(|i| format!(" at index {i}")).unwrap_or_default())]
    InvalidPattern {
        /// Position of the empty item in its input collection.
        index: Option<usize>,
    },

    /// An insertion or rebuild was attempted after the automaton was finalized.
    #[error("automaton is already built")]
    AlreadyBuilt,

    /// A search was attempted before the automaton was finalized.
    #[error("automaton is not built yet")]
    NotBuilt,

    /// The bounded-skip scanner was asked for more skips, or needed more states, than
    /// its configured limits allow.
    #[error("{resource} {requested} exceeds the limit of {limit}")]
    ResourceBound {
        /// Which limit was hit: `"max_skip"` or `"explored states"`.
        resource: &'static str,
        /// The amount that was asked for or reached.
        requested: usize,
        /// The largest amount allowed.
        limit: usize,
    },

    /// The trie grew past what a 32-bit index can address, either in nodes or in
    /// merged output entries.
    #[error("automaton exceeds {max} {resource}")]
    Capacity {
        /// Which table overflowed: `"nodes"` or `"output entries"`.
        resource: &'static str,
        /// The largest supported size of that table.
        max: usize,
    },
}

/// A specialized result type for this crate.
pub type Result<T, E = AcError> = std::result::Result<T, E>;

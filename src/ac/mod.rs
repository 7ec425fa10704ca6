/// The finalized automaton, its nodes and pattern identifiers.
pub mod automaton;
/// Trie store and failure-link construction.
pub mod builder;
/// Compact child maps for trie nodes.
pub mod children;
/// Double-array view of a finalized automaton.
pub mod compact;
/// Error type shared by all operations.
pub mod error;
/// Arena and node identifiers.
pub mod node_arena;
/// Exact scanners: all matches, stream cursor and longest match.
pub mod scan;
/// Skip-keyword and bounded-skip scanners.
pub mod skip;
/// Runtime-checked build-then-scan handle.
pub mod staged;
/// Trait for types that can serve as edge labels.
pub mod symbol;

pub use automaton::{Automaton, Node, PatternId};
pub use builder::{MAX_NODES, MAX_OUTPUTS, TrieStore, build_automaton};
pub use compact::{CompactAutomaton, CompactFindIter};
pub use error::{AcError, Result};
pub use node_arena::NodeId;
pub use scan::{FindIter, Match, Outputs, StreamScanner};
pub use skip::{BoundedSkipIter, DEFAULT_MAX_SKIP, DEFAULT_MAX_STATES, SkipIter, SkipLimits};
pub use staged::Matcher;
pub use symbol::{IntoSymbols, Symbol, Symbols};

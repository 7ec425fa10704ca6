//! # libacmatch
//!
//! Multi-pattern string matching with the
//! [Aho-Corasick](https://en.wikipedia.org/wiki/Aho%E2%80%93Corasick_algorithm) automaton:
//! a trie of patterns augmented with failure links that finds every occurrence of every
//! pattern in a single left-to-right pass over the text.
//!
//! ## Features
//!
//! - **Generic over symbol type**: works with `char`, `u8`, `u16`, or any type implementing
//!   [`Symbol`](ac::Symbol)
//! - **Arena-allocated**: trie edges and failure links are integer indices into one arena
//! - **Build once, scan many**: [`TrieStore::build`](ac::TrieStore::build) consumes the
//!   store and yields an immutable, `Send + Sync` [`Automaton`](ac::Automaton)
//! - **Lazy scanners**: all overlapping matches, an incremental stream cursor, longest
//!   match, stop-word skipping and bounded-skip matching
//! - **Compact view**: an optional double-array re-encoding for cache locality
//!
//! ## Quick Start
//!
//! ```
//! use libacmatch::ac::Automaton;
//!
//! let automaton = Automaton::new(["he", "she", "hers"]).unwrap();
//! let matches: Vec<_> = automaton
//!     .find_iter("ushers".chars())
//!     .map(|m| (m.pattern().index(), m.start()))
//!     .collect();
//! assert_eq!(matches, [(0, 2), (1, 1), (2, 2)]);
//! ```
//!
//! Offsets count symbols, so for a `&str` they are `char` indices.
//!
//! ## Building Incrementally
//!
//! ```
//! use libacmatch::ac::{AcError, TrieStore};
//!
//! let mut store = TrieStore::new();
//! store.insert("apple").unwrap();
//! assert_eq!(store.insert(""), Err(AcError::InvalidPattern { index: None }));
//! store.insert("pie").unwrap();
//!
//! let automaton = store.build();
//! let found = automaton.find_skip_iter("the apple pie", ["the "]).unwrap();
//! assert_eq!(found.map(|m| m.start()).collect::<Vec<_>>(), [4, 10]);
//! ```
//!
//! ## Generic Usage
//!
//! ```
//! use libacmatch::ac::Automaton;
//!
//! let automaton: Automaton<u8> = Automaton::new([vec![1, 2, 3], vec![2, 3]]).unwrap();
//! let ends: Vec<_> = automaton.find_iter([9u8, 1, 2, 3]).map(|m| m.end()).collect();
//! assert_eq!(ends, [4, 4]);
//! ```

#![warn(missing_docs)]

/// Aho-Corasick automaton: node types, builder, scanners and symbol trait.
pub mod ac;

#[cfg(test)]
mod test {
    use itertools::Itertools;
    use proptest::prelude::*;

    use super::ac::{Automaton, Match, PatternId, TrieStore};

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    /// Every occurrence of every distinct pattern, checked position by position.
    fn brute_force(patterns: &[String], text: &str) -> Vec<Match> {
        let text = chars(text);
        let mut store = TrieStore::new();
        let ids = store.insert_all(patterns).unwrap();
        let mut distinct: Vec<(PatternId, Vec<char>)> = ids
            .into_iter()
            .zip(patterns.iter().map(|p| chars(p)))
            .collect();
        distinct.sort();
        distinct.dedup();

        let mut found = Vec::new();
        for (id, pattern) in &distinct {
            for start in 0..text.len() {
                if text[start..].starts_with(pattern) {
                    found.push(Match {
                        start,
                        end: start + pattern.len(),
                        pattern: *id,
                    });
                }
            }
        }
        found.sort();
        found
    }

    fn sorted(mut matches: Vec<Match>) -> Vec<Match> {
        matches.sort();
        matches
    }

    fn pattern_set() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[abc]{1,5}", 1..8)
    }

    fn text() -> impl Strategy<Value = String> {
        "[abcd]{0,40}"
    }

    proptest! {
        #[test]
        fn baseline_equals_brute_force(patterns in pattern_set(), text in text()) {
            let automaton = Automaton::new(&patterns).unwrap();
            let found = automaton.find_all(text.chars());
            prop_assert_eq!(sorted(found.clone()), brute_force(&patterns, &text));
            prop_assert!(found.iter().map(|m| (m.end(), m.len())).is_sorted());
        }

        #[test]
        fn fail_links_are_consistent(patterns in pattern_set()) {
            let automaton = Automaton::new(&patterns).unwrap();
            prop_assert_eq!(automaton.find_fail_link_violation(), None);
        }

        #[test]
        fn fresh_builds_agree(patterns in pattern_set(), text in text()) {
            let first = Automaton::new(&patterns).unwrap();
            let second = Automaton::new(&patterns).unwrap();
            prop_assert_eq!(first.find_all(text.chars()), second.find_all(text.chars()));
        }

        #[test]
        fn bounded_skip_zero_equals_baseline(patterns in pattern_set(), text in text()) {
            let automaton = Automaton::new(&patterns).unwrap();
            let bounded: Vec<_> = automaton
                .find_bounded_skip_iter(text.as_str(), 0)
                .unwrap()
                .collect::<Result<_, _>>()
                .unwrap();
            prop_assert_eq!(sorted(bounded), sorted(automaton.find_all(text.chars())));
        }

        #[test]
        fn bounded_skip_finds_a_superset(patterns in pattern_set(), text in text()) {
            let automaton = Automaton::new(&patterns).unwrap();
            let relaxed: Vec<_> = automaton
                .find_bounded_skip_iter(text.as_str(), 2)
                .unwrap()
                .map(|m| m.map(|m| (m.start(), m.pattern())))
                .collect::<Result<_, _>>()
                .unwrap();
            for m in automaton.find_all(text.chars()) {
                prop_assert!(relaxed.contains(&(m.start(), m.pattern())));
            }
        }

        #[test]
        fn compact_equals_baseline(patterns in pattern_set(), text in text()) {
            let automaton = Automaton::new(&patterns).unwrap();
            let compact = automaton.compact();
            prop_assert_eq!(compact.find_all(text.chars()), automaton.find_all(text.chars()));
        }

        #[test]
        fn longest_is_at_least_everything_at_its_end(patterns in pattern_set(), text in text()) {
            let automaton = Automaton::new(&patterns).unwrap();
            let all = automaton.find_all(text.chars());
            match automaton.find_longest(text.chars()) {
                None => prop_assert!(all.is_empty()),
                Some(best) => {
                    for m in &all {
                        prop_assert!(best.len() >= m.len());
                    }
                    let first_of_len = all.iter().find(|m| m.len() == best.len());
                    prop_assert_eq!(first_of_len, Some(&best));
                }
            }
        }

        #[test]
        fn absent_skip_words_change_nothing(patterns in pattern_set(), text in text()) {
            let automaton = Automaton::new(&patterns).unwrap();
            let skipped: Vec<_> = automaton.find_skip_iter(text.as_str(), ["zz", "x"]).unwrap().collect();
            prop_assert_eq!(skipped, automaton.find_all(text.chars()));
        }

        #[test]
        fn skipping_equals_scanning_the_stripped_text(patterns in pattern_set(), text in "[abcd]{0,40}") {
            // "d" is never part of a pattern, so skipping it is the same as deleting it
            // and mapping offsets back.
            let automaton = Automaton::new(&patterns).unwrap();
            let kept: Vec<(usize, char)> = text.chars().enumerate().filter(|&(_, c)| c != 'd').collect();
            let stripped: Vec<char> = kept.iter().map(|&(_, c)| c).collect();
            let expected: Vec<_> = automaton
                .find_iter(stripped)
                .map(|m| (kept[m.start()].0, kept[m.end() - 1].0 + 1, m.pattern()))
                .collect();
            let skipped: Vec<_> = automaton
                .find_skip_iter(text.as_str(), ["d"])
                .unwrap()
                .map(|m| (m.start(), m.end(), m.pattern()))
                .collect();
            prop_assert_eq!(skipped, expected);
        }
    }

    #[test]
    fn insertion_order_does_not_change_what_is_found() {
        const PATTERNS: [&str; 5] = ["he", "she", "his", "hers", "e"];
        let text = "ushers and his shes";
        let reference: Vec<(usize, usize)> = Automaton::new(PATTERNS)
            .unwrap()
            .find_iter(text.chars())
            .map(|m| (m.start(), m.end()))
            .collect();
        for order in PATTERNS.iter().permutations(PATTERNS.len()) {
            let automaton = Automaton::new(order.iter().map(|p| **p)).unwrap();
            assert_eq!(automaton.find_fail_link_violation(), None);
            let found: Vec<(usize, usize)> = automaton
                .find_iter(text.chars())
                .map(|m| (m.start(), m.end()))
                .collect();
            assert_eq!(found, reference, "{order:?}");
        }
    }

    #[test]
    fn ushers_scenario() {
        let automaton = Automaton::new(["he", "she", "hers"]).unwrap();
        let found: Vec<(String, usize, usize)> = automaton
            .find_iter("ushers".chars())
            .map(|m| {
                let p: String = automaton.pattern(m.pattern()).unwrap().iter().collect();
                (p, m.start(), m.end())
            })
            .collect();
        assert_eq!(
            found,
            vec![
                ("he".to_string(), 2, 4),
                ("she".to_string(), 1, 4),
                ("hers".to_string(), 2, 6),
            ]
        );
    }
}

use std::fmt::Debug;
use std::hash::Hash;

use smallvec::SmallVec;

/// Trait for types that can serve as edge labels in the automaton.
///
/// This trait is automatically implemented for any type satisfying all the
/// required bounds (`char`, `u8`, `u16`, `u32`, etc.).
///
/// - `Copy`: edges and texts store symbols by value
/// - `Eq + Ord`: comparing edge labels
/// - `Hash`: alphabet mapping in the compact view and skip-state deduplication
/// - `Debug`: debug printing of nodes
pub trait Symbol: Copy + Eq + Ord + Hash + Debug {}

impl<T: Copy + Eq + Ord + Hash + Debug> Symbol for T {}

/// Inline capacity of a collected symbol sequence before it spills to the heap.
pub const INLINE_SYMBOLS: usize = 32;

/// Collected symbols of one pattern, skip word or text.
pub type Symbols<C> = SmallVec<[C; INLINE_SYMBOLS]>;

/// Trait for types that can be turned into a sequence of symbols.
///
/// Implemented for common string and sequence types so that
/// [`TrieStore::insert`](super::builder::TrieStore::insert) and the scanners accept them
/// directly without manual conversion. Strings are split into `char`s.
pub trait IntoSymbols<C: Symbol> {
    /// Collects this value into a symbol buffer.
    fn collect_symbols(self) -> Symbols<C>;
}

macro_rules! impl_into_symbols_for_strings {
    ($($ty:ty),*) => {$(
        impl IntoSymbols<char> for $ty {
            fn collect_symbols(self) -> Symbols<char> {
                self.chars().collect()
            }
        }
    )*};
}

impl_into_symbols_for_strings!(&str, String, &String);

impl<C: Symbol> IntoSymbols<C> for &[C] {
    fn collect_symbols(self) -> Symbols<C> {
        Symbols::from_slice(self)
    }
}

impl<C: Symbol> IntoSymbols<C> for Vec<C> {
    fn collect_symbols(self) -> Symbols<C> {
        Symbols::from_vec(self)
    }
}

impl<C: Symbol, const N: usize> IntoSymbols<C> for [C; N] {
    fn collect_symbols(self) -> Symbols<C> {
        self.into_iter().collect()
    }
}

impl<C: Symbol, const N: usize> IntoSymbols<C> for &[C; N] {
    fn collect_symbols(self) -> Symbols<C> {
        Symbols::from_slice(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn str_splits_into_chars() {
        let symbols: Symbols<char> = "授人以鱼".collect_symbols();
        assert_eq!(symbols.as_slice(), &['授', '人', '以', '鱼']);
    }

    #[test]
    fn byte_slices_keep_their_values() {
        let symbols: Symbols<u8> = b"abc".collect_symbols();
        assert_eq!(symbols.as_slice(), b"abc");
        let symbols: Symbols<u8> = vec![1u8, 2, 3].collect_symbols();
        assert_eq!(symbols.as_slice(), &[1, 2, 3]);
        let symbols: Symbols<u8> = [7u8, 8][..].collect_symbols();
        assert_eq!(symbols.as_slice(), &[7, 8]);
    }
}

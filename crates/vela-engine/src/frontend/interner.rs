//! String interning for identifier and literal storage.
//!
//! The front end interns every name once; the lowering core works with
//! copyable `Symbol` handles and resolves them back to text only at emission
//! time.

use rustc_hash::FxHashMap;
use std::num::NonZeroU32;

/// An interned string handle (4 bytes, cheap to copy and compare).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(NonZeroU32);

impl Symbol {
    #[inline]
    fn from_index(index: usize) -> Self {
        // Offset by 1: NonZeroU32 cannot hold 0
        Symbol(NonZeroU32::new(index as u32 + 1).unwrap())
    }

    #[inline]
    fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Deduplicating string store.
///
/// Interning the same string twice returns the same `Symbol`, so name
/// comparison during lowering is an integer compare.
#[derive(Clone, Default)]
pub struct Interner {
    map: FxHashMap<Box<str>, Symbol>,
    strings: Vec<Box<str>>,
}

impl Interner {
    /// Create an empty interner
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its symbol (existing or freshly allocated)
    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&sym) = self.map.get(s) {
            return sym;
        }
        let sym = Symbol::from_index(self.strings.len());
        self.strings.push(s.into());
        self.map.insert(s.into(), sym);
        sym
    }

    /// Look up a string without interning it
    pub fn get(&self, s: &str) -> Option<Symbol> {
        self.map.get(s).copied()
    }

    /// Resolve a symbol back to its text.
    ///
    /// # Panics
    ///
    /// Panics if `sym` did not come from this interner.
    #[inline]
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.index()]
    }

    /// Number of distinct interned strings
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// True if nothing has been interned yet
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_deduplicates() {
        let mut interner = Interner::new();
        let a = interner.intern("value");
        let b = interner.intern("other");
        let c = interner.intern("value");
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn test_resolve_round_trip() {
        let mut interner = Interner::new();
        let sym = interner.intern("greet");
        assert_eq!(interner.resolve(sym), "greet");
        assert_eq!(interner.get("greet"), Some(sym));
        assert_eq!(interner.get("missing"), None);
    }
}

//! Name interner for identifier deduplication.
//!
//! Every declaration name flows through the interner once; descriptors,
//! scopes and calls then carry `u32` handles (`Atom`s). Name comparison in
//! scope lookups becomes an integer comparison.
//!
//! The interner is only mutated while syntax trees are built. Analysis reads
//! it through `&Interner`, so a frozen program can share it across threads.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;

/// An interned name.
///
/// Atoms are cheap to copy (just a u32) and can be compared with == in O(1).
/// To get the actual string, use `Interner::resolve(atom)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// A sentinel value representing no atom / empty string.
    pub const NONE: Atom = Atom(0);

    /// Check if this is the empty/none atom.
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Get the raw index value.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Names the analyzer looks up by string: builtin classifiers, operator
/// convention names and special names. Pre-interned by `Interner::new`.
const COMMON_NAMES: &[&str] = &[
    // Builtin classifiers
    "Any",
    "Nothing",
    "Unit",
    "Boolean",
    "Char",
    "Int",
    "String",
    "Array",
    "T",
    // Builtin members
    "equals",
    "hashCode",
    "toString",
    "other",
    "index",
    "value",
    "length",
    "size",
    // Operator conventions
    "plus",
    "minus",
    "times",
    "div",
    "rem",
    "rangeTo",
    "compareTo",
    "contains",
    "get",
    "set",
    "invoke",
    "not",
    "unaryMinus",
    "unaryPlus",
    "inc",
    "dec",
    "arrayOf",
    // Special names
    "<root>",
    "<builtins>",
    "<init>",
    "<get>",
    "<set>",
    "<this>",
    "<anonymous>",
    "Companion",
    "it",
];

/// Name interner that deduplicates strings and returns Atom handles.
///
/// # Example
/// ```
/// use jetc_common::Interner;
/// let mut interner = Interner::new();
/// let a1 = interner.intern("hello");
/// let a2 = interner.intern("hello");
/// assert_eq!(a1, a2); // Same atom for same string
/// assert_eq!(interner.resolve(a1), "hello");
/// ```
#[derive(Clone, Debug)]
pub struct Interner {
    /// Map from string to atom index
    map: FxHashMap<Arc<str>, Atom>,
    /// Vector of all interned strings (index 0 is empty string)
    strings: Vec<Arc<str>>,
}

impl Interner {
    /// Create a new interner with the empty string at index 0 and the
    /// common names pre-interned.
    pub fn new() -> Self {
        let mut interner = Interner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };
        // Index 0 is reserved for empty/none
        let empty: Arc<str> = Arc::from("");
        interner.strings.push(empty.clone());
        interner.map.insert(empty, Atom::NONE);
        for name in COMMON_NAMES {
            interner.intern(name);
        }
        interner
    }

    /// Intern a string, returning its Atom handle.
    /// If the string was already interned, returns the existing Atom.
    #[inline]
    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(&atom) = self.map.get(s) {
            return atom;
        }
        let atom = Atom(self.strings.len() as u32);
        let owned: Arc<str> = Arc::from(s);
        self.strings.push(owned.clone());
        self.map.insert(owned, atom);
        atom
    }

    /// Look up a string without interning it.
    #[inline]
    pub fn lookup(&self, s: &str) -> Option<Atom> {
        self.map.get(s).copied()
    }

    /// Resolve an Atom back to its string value.
    /// Returns empty string if atom is out of bounds.
    #[inline]
    pub fn resolve(&self, atom: Atom) -> &str {
        self.strings
            .get(atom.0 as usize)
            .map(|s| s.as_ref())
            .unwrap_or("")
    }

    /// Try to resolve an Atom, returning None if invalid.
    #[inline]
    pub fn try_resolve(&self, atom: Atom) -> Option<&str> {
        self.strings.get(atom.0 as usize).map(|s| s.as_ref())
    }

    /// Get the number of interned strings.
    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the interner is empty (only has the empty string).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

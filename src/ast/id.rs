use std::fmt;
use std::hash::{Hash, Hasher};

/// A stable identity for a declaration in the syntax tree.
///
/// Ids are assigned once, when the tree is constructed, and are unique across the
/// whole tree. They are monotonic in declaration order and never negative: negative
/// values are reserved for the synthetic call graph nodes, which must sort before
/// every real declaration.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AstId(pub i64);

impl AstId {
    /// Creates a new id from a raw value
    #[must_use]
    pub const fn new(value: i64) -> Self {
        AstId(value)
    }

    /// Returns the raw id value
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Returns the arena slot of this id, or `None` for reserved (negative) values
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl From<i64> for AstId {
    fn from(value: i64) -> Self {
        AstId(value)
    }
}

impl From<AstId> for i64 {
    fn from(id: AstId) -> Self {
        id.0
    }
}

impl fmt::Debug for AstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AstId({})", self.0)
    }
}

impl fmt::Display for AstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Hash for AstId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

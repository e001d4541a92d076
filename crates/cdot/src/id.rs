//! Per-traversal node identifiers.

use std::fmt;

/// Opaque identifier of one emitted graph node.
///
/// Identifiers are issued by an [`IdAllocator`] in traversal pre-order and
/// are only meaningful within the traversal that issued them. They render
/// without a prefix; the output buffer adds the configured one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic counter issuing [`NodeId`]s.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    first: u64,
    next: u64,
}

impl IdAllocator {
    /// Create an allocator whose first identifier is `first`.
    pub fn new(first: u64) -> Self {
        Self { first, next: first }
    }

    /// Issue the next identifier.
    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Number of identifiers issued so far.
    pub fn issued(&self) -> u64 {
        self.next - self.first
    }

    /// Start over from the first identifier.
    pub(crate) fn reset(&mut self) {
        self.next = self.first;
    }
}

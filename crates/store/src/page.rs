//! Cursor-based pagination types
//!
//! A page walk proceeds through opaque cursors: each page reports either
//! `Next(cursor)` or `End`. Reaching the end exactly once per walk, even on
//! an empty table, is what lets snapshot reads loop until `End` without a
//! separate emptiness probe.

use crate::StoredRecord;

/// Opaque continuation point inside a table walk.
///
/// Backed by the sequence number of the last row already returned. Only
/// stores mint cursors; callers pass them back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor(u64);

impl Cursor {
    /// Create a cursor from the last returned sequence number.
    ///
    /// For store implementations; callers never build cursors themselves.
    pub fn new(last_seq: u64) -> Self {
        Cursor(last_seq)
    }

    /// The sequence number of the last row already returned.
    pub fn last_seq(&self) -> u64 {
        self.0
    }
}

/// Continuation token of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageToken {
    /// More rows remain; pass this cursor to fetch the next page.
    Next(Cursor),
    /// The walk is complete.
    End,
}

/// One page of rows in stable insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// The rows of this page.
    pub items: Vec<StoredRecord>,
    /// How to continue the walk.
    pub next: PageToken,
}

impl Page {
    /// Whether this is the last page of the walk.
    pub fn is_final(&self) -> bool {
        matches!(self.next, PageToken::End)
    }

    /// Number of rows in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page carries no rows.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

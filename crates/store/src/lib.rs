//! Record store abstraction for the Tessella catalog
//!
//! This crate defines the [`RecordStore`] trait the engines are written
//! against, plus the in-memory backend used in tests and single-process
//! deployments. The trait works on loose JSON documents so one adapter
//! serves all four catalog tables; typed records convert at the engine
//! boundary.

#![warn(clippy::all)]

pub mod memory;
pub mod page;

pub use memory::MemoryStore;
pub use page::{Cursor, Page, PageToken};

use std::fmt;

use tessella_core::document::field_str;
use tessella_core::{Document, Error, Result, Table};

/// Identity of a stored row: its table plus a store-assigned sequence number.
///
/// Sequence numbers are monotonically increasing per table and never reused,
/// which is what makes cursor-based pagination stable across deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    /// Table the row lives in.
    pub table: Table,
    /// Store-assigned sequence number, unique within the table.
    pub seq: u64,
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.table, self.seq)
    }
}

/// A row read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    /// Identity of the row.
    pub id: RecordId,
    /// The stored document.
    pub doc: Document,
}

impl StoredRecord {
    /// Read a string field from the stored document.
    pub fn field_str(&self, field: &str) -> Option<&str> {
        field_str(&self.doc, field)
    }
}

/// What a conditional upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertKind {
    /// No row matched the key; a new row was inserted.
    Inserted,
    /// Exactly one row matched the key; its document was replaced.
    Replaced,
}

/// Storage abstraction for the catalog tables.
///
/// Implementations must be safe to call concurrently (`Send + Sync`).
/// All methods are synchronous; an adapter over a remote database is expected
/// to block internally.
pub trait RecordStore: Send + Sync {
    /// Look up the single row whose `field` equals `value`.
    ///
    /// Returns `None` when no row matches. Returns
    /// [`Error::MultipleMatches`] when more than one row matches: that means
    /// the uniqueness invariant was violated upstream, which callers treat as
    /// a data-integrity fault rather than healing it silently.
    fn query_by_unique_key(
        &self,
        table: Table,
        field: &str,
        value: &str,
    ) -> Result<Option<StoredRecord>>;

    /// Return every row whose `field` equals `value`, oldest first.
    ///
    /// Used where uniqueness is not store-enforced (embedding dedup); the
    /// first row in the result is the one reconciliation keeps as primary.
    fn query_by_field(&self, table: Table, field: &str, value: &str) -> Result<Vec<StoredRecord>>;

    /// Insert a new row, returning its assigned id.
    ///
    /// Fails with [`Error::UniqueViolation`] when the table enforces a
    /// unique key and the document's key value is already present.
    fn insert(&self, table: Table, doc: Document) -> Result<RecordId>;

    /// Replace the document of an existing row.
    ///
    /// Fails with [`Error::RecordNotFound`] when the id does not resolve.
    fn replace(&self, id: RecordId, doc: Document) -> Result<()>;

    /// Delete a row.
    ///
    /// Fails with [`Error::RecordNotFound`] when the id does not resolve.
    fn delete(&self, id: RecordId) -> Result<()>;

    /// Read one page of a table in stable (insertion) order.
    ///
    /// `page_size` is normalized with
    /// [`tessella_core::normalize_page_size`] before use, so any value,
    /// including `None`, NaN, or a negative number, yields a valid page
    /// rather than an error. Pass the cursor from the previous page's
    /// [`PageToken::Next`] to continue; an empty table yields an empty final
    /// page.
    fn paginate(
        &self,
        table: Table,
        page_size: Option<f64>,
        cursor: Option<Cursor>,
    ) -> Result<Page>;

    /// Insert or replace the single row matching a unique key, in one call.
    ///
    /// This is the primitive the idempotent upsert engine builds on. The
    /// default implementation is check-then-write and therefore only safe
    /// where callers serialize writes per key; backends that can should
    /// override it with a conditional write under one lock or transaction so
    /// racing writers cannot create a second row for the same key.
    fn upsert_by_unique_key(
        &self,
        table: Table,
        field: &str,
        value: &str,
        doc: Document,
    ) -> Result<UpsertKind> {
        match self.query_by_unique_key(table, field, value)? {
            Some(existing) => {
                self.replace(existing.id, doc)?;
                Ok(UpsertKind::Replaced)
            }
            None => {
                self.insert(table, doc)?;
                Ok(UpsertKind::Inserted)
            }
        }
    }
}

/// A store where every operation fails.
///
/// Used in tests to verify that backend errors propagate unchanged through
/// the engines instead of being swallowed or reclassified.
#[derive(Debug, Default)]
pub struct FailingStore;

impl FailingStore {
    /// Create a failing store.
    pub fn new() -> Self {
        FailingStore
    }

    fn fail<T>(op: &str) -> Result<T> {
        Err(Error::Store {
            message: format!("injected failure: {op}"),
        })
    }
}

impl RecordStore for FailingStore {
    fn query_by_unique_key(
        &self,
        _table: Table,
        _field: &str,
        _value: &str,
    ) -> Result<Option<StoredRecord>> {
        Self::fail("query_by_unique_key")
    }

    fn query_by_field(&self, _table: Table, _field: &str, _value: &str) -> Result<Vec<StoredRecord>> {
        Self::fail("query_by_field")
    }

    fn insert(&self, _table: Table, _doc: Document) -> Result<RecordId> {
        Self::fail("insert")
    }

    fn replace(&self, _id: RecordId, _doc: Document) -> Result<()> {
        Self::fail("replace")
    }

    fn delete(&self, _id: RecordId) -> Result<()> {
        Self::fail("delete")
    }

    fn paginate(
        &self,
        _table: Table,
        _page_size: Option<f64>,
        _cursor: Option<Cursor>,
    ) -> Result<Page> {
        Self::fail("paginate")
    }
}

//! Idempotent upsert engine for the entity tables
//!
//! One keyed write path for metadata, code, and search records: look up the
//! row by unique key, insert when absent, replace when present. The engine
//! leans on the store's conditional upsert primitive so the check and the
//! write happen under one guard.
//!
//! Unlike the embedding engine, this path performs no value-equality
//! short-circuit: a repeat call with identical content still replaces the
//! row and reports `Updated`. Downstream consumers rely on the write
//! happening (timestamp bumps, triggers), so the behavior is preserved
//! rather than optimized away.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use tessella_core::{Document, Result, Table, TableRecord};
use tessella_store::{RecordStore, UpsertKind};

/// What an idempotent upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No row existed for the key; one was created.
    Inserted,
    /// A row existed; its document was replaced.
    Updated,
}

impl UpsertOutcome {
    /// Stable lowercase name for logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertOutcome::Inserted => "inserted",
            UpsertOutcome::Updated => "updated",
        }
    }
}

impl fmt::Display for UpsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keyed upsert engine over a record store.
#[derive(Clone)]
pub struct Upserter {
    store: Arc<dyn RecordStore>,
}

impl Upserter {
    /// Create an upserter over the given store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Upserter { store }
    }

    /// Upsert a typed record into its table, keyed by its unique key.
    ///
    /// First call for a key reports [`UpsertOutcome::Inserted`]; every later
    /// call reports [`UpsertOutcome::Updated`], including calls that carry
    /// byte-identical content. Exactly one store mutation happens per call.
    pub fn upsert<R: TableRecord>(&self, record: &R) -> Result<UpsertOutcome> {
        let doc = record.to_document()?;
        self.upsert_document(R::TABLE, record.unique_key(), doc)
    }

    /// Upsert a raw document, keyed by the table's key field.
    pub fn upsert_document(&self, table: Table, key: &str, doc: Document) -> Result<UpsertOutcome> {
        let kind = self
            .store
            .upsert_by_unique_key(table, table.key_field(), key, doc)?;
        let outcome = match kind {
            UpsertKind::Inserted => UpsertOutcome::Inserted,
            UpsertKind::Replaced => UpsertOutcome::Updated,
        };
        debug!(target: "tessella::upsert", table = %table, key, outcome = %outcome, "record upserted");
        Ok(outcome)
    }
}

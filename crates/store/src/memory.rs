//! In-memory record store
//!
//! Per-table `RwLock<BTreeMap>` keyed by sequence number, with a secondary
//! index over each table's key field. The BTreeMap gives stable insertion
//! order for pagination; the index makes key lookups cheap and backs the
//! unique-key constraint on the entity tables.
//!
//! ## Design
//!
//! - Sequence numbers are per table, monotonically increasing, never reused.
//!   Deletes leave gaps, which cursor-based pagination tolerates.
//! - `upsert_by_unique_key` is overridden to run under a single write lock,
//!   so two racing writers cannot both observe "no row" and insert twice.
//! - `unconstrained()` disables the unique-key backstop. Tests use it to
//!   stage the duplicate-row states the engines must detect or heal.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use tracing::warn;

use tessella_core::document::field_str;
use tessella_core::{normalize_page_size, Document, Error, Result, Table};

use crate::page::{Cursor, Page, PageToken};
use crate::{RecordId, RecordStore, StoredRecord, UpsertKind};

#[derive(Debug, Default)]
struct TableState {
    rows: BTreeMap<u64, Document>,
    key_index: HashMap<String, Vec<u64>>,
    next_seq: u64,
}

impl TableState {
    fn index_insert(&mut self, key: String, seq: u64) {
        let ids = self.key_index.entry(key).or_default();
        match ids.binary_search(&seq) {
            Ok(_) => {}
            Err(pos) => ids.insert(pos, seq),
        }
    }

    fn index_remove(&mut self, key: &str, seq: u64) {
        if let Some(ids) = self.key_index.get_mut(key) {
            ids.retain(|&s| s != seq);
            if ids.is_empty() {
                self.key_index.remove(key);
            }
        }
    }

    fn key_of(doc: &Document, table: Table) -> Option<String> {
        field_str(doc, table.key_field()).map(str::to_owned)
    }

    /// Seqs of rows whose `field` equals `value`, ascending.
    fn matching_seqs(&self, table: Table, field: &str, value: &str) -> Vec<u64> {
        if field == table.key_field() {
            self.key_index.get(value).cloned().unwrap_or_default()
        } else {
            self.rows
                .iter()
                .filter(|(_, doc)| field_str(doc, field) == Some(value))
                .map(|(&seq, _)| seq)
                .collect()
        }
    }

    fn insert(&mut self, table: Table, doc: Document, enforce_unique: bool) -> Result<RecordId> {
        let key = Self::key_of(&doc, table);
        if enforce_unique && table.enforces_unique_key() {
            if let Some(key) = &key {
                if self.key_index.get(key).is_some_and(|ids| !ids.is_empty()) {
                    return Err(Error::UniqueViolation {
                        table,
                        key: key.clone(),
                    });
                }
            }
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        if let Some(key) = key {
            self.index_insert(key, seq);
        }
        self.rows.insert(seq, doc);
        Ok(RecordId { table, seq })
    }

    fn replace(
        &mut self,
        table: Table,
        seq: u64,
        doc: Document,
        enforce_unique: bool,
    ) -> Result<()> {
        let Some(old) = self.rows.get(&seq) else {
            return Err(Error::RecordNotFound {
                id: RecordId { table, seq }.to_string(),
            });
        };
        let old_key = Self::key_of(old, table);
        let new_key = Self::key_of(&doc, table);

        if enforce_unique && table.enforces_unique_key() {
            if let Some(key) = &new_key {
                let taken_by_other = self
                    .key_index
                    .get(key)
                    .is_some_and(|ids| ids.iter().any(|&s| s != seq));
                if taken_by_other {
                    return Err(Error::UniqueViolation {
                        table,
                        key: key.clone(),
                    });
                }
            }
        }

        if old_key != new_key {
            if let Some(key) = &old_key {
                self.index_remove(key, seq);
            }
            if let Some(key) = new_key {
                self.index_insert(key, seq);
            }
        }
        self.rows.insert(seq, doc);
        Ok(())
    }

    fn delete(&mut self, table: Table, seq: u64) -> Result<()> {
        let Some(doc) = self.rows.remove(&seq) else {
            return Err(Error::RecordNotFound {
                id: RecordId { table, seq }.to_string(),
            });
        };
        if let Some(key) = Self::key_of(&doc, table) {
            self.index_remove(&key, seq);
        }
        Ok(())
    }
}

/// In-memory [`RecordStore`] backend.
pub struct MemoryStore {
    tables: [RwLock<TableState>; 4],
    enforce_unique: bool,
}

impl MemoryStore {
    /// Create a store with the unique-key constraint active on entity tables.
    pub fn new() -> Self {
        MemoryStore {
            tables: Default::default(),
            enforce_unique: true,
        }
    }

    /// Create a store without the unique-key backstop.
    ///
    /// Models backends that cannot enforce uniqueness themselves, and lets
    /// tests stage duplicate rows on entity tables.
    pub fn unconstrained() -> Self {
        MemoryStore {
            tables: Default::default(),
            enforce_unique: false,
        }
    }

    fn state(&self, table: Table) -> &RwLock<TableState> {
        let slot = match table {
            Table::Components => 0,
            Table::Code => 1,
            Table::Search => 2,
            Table::Embeddings => 3,
        };
        &self.tables[slot]
    }

    /// Total rows stored in a table.
    pub fn table_len(&self, table: Table) -> usize {
        self.state(table).read().rows.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryStore {
    fn query_by_unique_key(
        &self,
        table: Table,
        field: &str,
        value: &str,
    ) -> Result<Option<StoredRecord>> {
        let state = self.state(table).read();
        let seqs = state.matching_seqs(table, field, value);
        match seqs.as_slice() {
            [] => Ok(None),
            [seq] => Ok(state.rows.get(seq).map(|doc| StoredRecord {
                id: RecordId { table, seq: *seq },
                doc: doc.clone(),
            })),
            _ => {
                warn!(
                    target: "tessella::store",
                    table = %table,
                    field,
                    value,
                    matches = seqs.len(),
                    "unique key lookup matched multiple rows"
                );
                Err(Error::MultipleMatches {
                    table,
                    field: field.to_string(),
                    key: value.to_string(),
                })
            }
        }
    }

    fn query_by_field(&self, table: Table, field: &str, value: &str) -> Result<Vec<StoredRecord>> {
        let state = self.state(table).read();
        let records = state
            .matching_seqs(table, field, value)
            .into_iter()
            .filter_map(|seq| {
                state.rows.get(&seq).map(|doc| StoredRecord {
                    id: RecordId { table, seq },
                    doc: doc.clone(),
                })
            })
            .collect();
        Ok(records)
    }

    fn insert(&self, table: Table, doc: Document) -> Result<RecordId> {
        self.state(table).write().insert(table, doc, self.enforce_unique)
    }

    fn replace(&self, id: RecordId, doc: Document) -> Result<()> {
        self.state(id.table)
            .write()
            .replace(id.table, id.seq, doc, self.enforce_unique)
    }

    fn delete(&self, id: RecordId) -> Result<()> {
        self.state(id.table).write().delete(id.table, id.seq)
    }

    fn paginate(
        &self,
        table: Table,
        page_size: Option<f64>,
        cursor: Option<Cursor>,
    ) -> Result<Page> {
        let size = normalize_page_size(page_size);
        let start = cursor.map_or(0, |c| c.last_seq().saturating_add(1));

        let state = self.state(table).read();
        let mut items = Vec::new();
        let mut iter = state.rows.range(start..);
        for (&seq, doc) in iter.by_ref() {
            items.push(StoredRecord {
                id: RecordId { table, seq },
                doc: doc.clone(),
            });
            if items.len() == size {
                break;
            }
        }

        let next = match (items.last(), iter.next()) {
            (Some(last), Some(_)) => PageToken::Next(Cursor::new(last.id.seq)),
            _ => PageToken::End,
        };
        Ok(Page { items, next })
    }

    fn upsert_by_unique_key(
        &self,
        table: Table,
        field: &str,
        value: &str,
        doc: Document,
    ) -> Result<UpsertKind> {
        // One lock for the whole check-then-write: racing writers serialize
        // here instead of both observing "no row" and inserting twice.
        let mut state = self.state(table).write();
        let seqs = state.matching_seqs(table, field, value);
        match seqs.as_slice() {
            [] => {
                state.insert(table, doc, self.enforce_unique)?;
                Ok(UpsertKind::Inserted)
            }
            [seq] => {
                state.replace(table, *seq, doc, self.enforce_unique)?;
                Ok(UpsertKind::Replaced)
            }
            _ => Err(Error::MultipleMatches {
                table,
                field: field.to_string(),
                key: value.to_string(),
            }),
        }
    }
}

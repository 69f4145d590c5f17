//! Embedding de-duplication engine
//!
//! Embedding rows are keyed by component id but the store does not enforce
//! uniqueness for them, so concurrent or replayed writes can leave several
//! rows for one key. This engine reconciles on every write: it lists all
//! rows for the key, keeps the first as primary, deletes the rest, and then
//! compares the primary against the incoming value to decide between a
//! replace and a no-op.
//!
//! ## Design
//!
//! - Validation happens before any store access: key shape, vector length,
//!   finiteness. Batch calls validate every entry before mutating anything,
//!   so a bad entry never leaves a batch half-applied.
//! - The value comparison is exact equality, not epsilon comparison.
//!   Embeddings from the same model run are expected to be reproducible
//!   bit-for-bit, and a near-miss means the model output changed.
//! - Healing is observable: deleted duplicates are counted in the returned
//!   stats rather than hidden inside reads.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tessella_core::{
    to_document, ComponentId, EmbeddingRecord, Error, Result, Table, TableRecord,
    EMBEDDING_DIMENSIONS,
};
use tessella_store::RecordStore;

/// One entry of a batch embedding upsert, as carried on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingEntry {
    /// Key of the component the vector belongs to.
    pub component_id: String,
    /// Model that produced the vector.
    pub model: String,
    /// The vector itself.
    pub embedding: Vec<f32>,
}

/// What a (batch of) embedding upsert(s) did, batch-summed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingWriteStats {
    /// Rows created for keys that had none.
    pub inserted: u64,
    /// Primary rows replaced because their value differed.
    pub updated: u64,
    /// Keys whose primary already carried the incoming value.
    pub unchanged: u64,
    /// Duplicate rows deleted while reconciling.
    pub duplicate_rows_deleted: u64,
}

impl EmbeddingWriteStats {
    /// Fold another stats value into this one.
    pub fn merge(&mut self, other: EmbeddingWriteStats) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.duplicate_rows_deleted += other.duplicate_rows_deleted;
    }
}

/// Validate an embedding vector against the catalog's fixed dimensions.
///
/// Checks length first, then finiteness, reporting the index of the first
/// non-finite element.
pub fn validate_embedding_vector(vector: &[f32]) -> Result<()> {
    if vector.len() != EMBEDDING_DIMENSIONS {
        return Err(Error::DimensionMismatch {
            expected: EMBEDDING_DIMENSIONS,
            got: vector.len(),
        });
    }
    if let Some(index) = vector.iter().position(|v| !v.is_finite()) {
        return Err(Error::NonFiniteValue { index });
    }
    Ok(())
}

// Exact equality, not epsilon comparison.
fn vectors_equal(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}

/// De-duplicating upsert engine for the embeddings table.
#[derive(Clone)]
pub struct EmbeddingEngine {
    store: Arc<dyn RecordStore>,
}

impl EmbeddingEngine {
    /// Create an engine over the given store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        EmbeddingEngine { store }
    }

    /// Upsert one embedding, reconciling any duplicate rows for its key.
    ///
    /// Fails with [`Error::InvalidKey`], [`Error::DimensionMismatch`], or
    /// [`Error::NonFiniteValue`] before touching the store.
    pub fn upsert_embedding(
        &self,
        component_id: &str,
        model: &str,
        vector: &[f32],
    ) -> Result<EmbeddingWriteStats> {
        let id = ComponentId::new(component_id)?;
        validate_embedding_vector(vector)?;
        self.upsert_validated(&id, model, vector)
    }

    /// Upsert a batch of embeddings, summing the per-entry stats.
    ///
    /// The whole batch is validated before any store mutation: an empty key
    /// fails with [`Error::InvalidKey`] and two entries resolving to the
    /// same trimmed key fail with [`Error::DuplicateKeyInBatch`]. Either
    /// rejection leaves the store untouched.
    pub fn upsert_many(&self, entries: &[EmbeddingEntry]) -> Result<EmbeddingWriteStats> {
        let mut seen: HashSet<String> = HashSet::with_capacity(entries.len());
        let mut validated: Vec<(ComponentId, &EmbeddingEntry)> = Vec::with_capacity(entries.len());

        for entry in entries {
            let id = ComponentId::new(&entry.component_id)?;
            validate_embedding_vector(&entry.embedding)?;
            if !seen.insert(id.as_str().to_string()) {
                return Err(Error::DuplicateKeyInBatch {
                    key: id.into_string(),
                });
            }
            validated.push((id, entry));
        }

        let mut stats = EmbeddingWriteStats::default();
        for (id, entry) in validated {
            stats.merge(self.upsert_validated(&id, &entry.model, &entry.embedding)?);
        }
        Ok(stats)
    }

    /// Delete every embedding row for the given component ids.
    ///
    /// Blank ids are skipped and repeated ids collapse to one key. Returns
    /// the number of rows deleted, duplicates included.
    pub fn delete_many(&self, component_ids: &[String]) -> Result<usize> {
        let mut keys: Vec<&str> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for raw in component_ids {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            if seen.insert(trimmed) {
                keys.push(trimmed);
            }
        }

        let mut deleted = 0;
        for key in keys {
            let rows = self
                .store
                .query_by_field(Table::Embeddings, Table::Embeddings.key_field(), key)?;
            for row in rows {
                self.store.delete(row.id)?;
                deleted += 1;
            }
        }
        debug!(target: "tessella::embedding", deleted, "embedding rows deleted");
        Ok(deleted)
    }

    /// Read the primary embedding row for a component, if one exists.
    pub fn get(&self, component_id: &str) -> Result<Option<EmbeddingRecord>> {
        let id = ComponentId::new(component_id)?;
        let rows = self
            .store
            .query_by_field(Table::Embeddings, Table::Embeddings.key_field(), id.as_str())?;
        match rows.first() {
            Some(primary) => Ok(Some(EmbeddingRecord::from_document(&primary.doc)?)),
            None => Ok(None),
        }
    }

    fn upsert_validated(
        &self,
        id: &ComponentId,
        model: &str,
        vector: &[f32],
    ) -> Result<EmbeddingWriteStats> {
        let mut stats = EmbeddingWriteStats::default();
        let rows = self
            .store
            .query_by_field(Table::Embeddings, Table::Embeddings.key_field(), id.as_str())?;

        let Some((primary, extras)) = rows.split_first() else {
            let record = EmbeddingRecord::new(id.as_str(), model, vector.to_vec());
            self.store.insert(Table::Embeddings, to_document(&record)?)?;
            stats.inserted = 1;
            debug!(target: "tessella::embedding", component_id = %id, "embedding inserted");
            return Ok(stats);
        };

        // First row wins as primary; every extra is a duplicate to heal.
        for extra in extras {
            self.store.delete(extra.id)?;
            stats.duplicate_rows_deleted += 1;
        }
        if stats.duplicate_rows_deleted > 0 {
            warn!(
                target: "tessella::embedding",
                component_id = %id,
                deleted = stats.duplicate_rows_deleted,
                "healed duplicate embedding rows"
            );
        }

        // A primary that no longer parses cannot be compared and is
        // replaced wholesale.
        let existing = EmbeddingRecord::from_document(&primary.doc).ok();
        let matches = existing
            .as_ref()
            .is_some_and(|row| row.model == model && vectors_equal(&row.vector, vector));

        if matches {
            stats.unchanged = 1;
            debug!(target: "tessella::embedding", component_id = %id, "embedding unchanged");
        } else {
            let record = EmbeddingRecord::new(id.as_str(), model, vector.to_vec());
            self.store.replace(primary.id, to_document(&record)?)?;
            stats.updated = 1;
            debug!(target: "tessella::embedding", component_id = %id, "embedding updated");
        }
        Ok(stats)
    }
}

//! High-level typed surface over the reconciliation pipeline.
//!
//! The [`Catalog`] struct wires a record store to the changeset pipeline and
//! the embedding engine, exposing one method per catalog operation.
//!
//! # Example
//!
//! ```ignore
//! use tessella::Catalog;
//!
//! let catalog = Catalog::in_memory();
//!
//! let report = catalog.validate(&changeset);
//! if report.can_apply() {
//!     let summary = catalog.diff(&changeset)?;
//!     let applied = catalog.apply(&changeset)?;
//! }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use tessella_changeset::{
    apply_changeset, diff_against_snapshot, fetch_catalog_snapshot, resolve_operations,
    validate_changeset, ApplyReport, CatalogSnapshot, DiffSummary, ValidationReport,
};
use tessella_core::{
    from_document, CatalogConfig, Changeset, CodeRecord, ComponentAggregate, ComponentId,
    ComponentRecord, EmbeddingRecord, Error, Result, Table,
};
use tessella_engine::{join_component, EmbeddingEngine, EmbeddingEntry, EmbeddingWriteStats};
use tessella_store::{Cursor, MemoryStore, PageToken, RecordStore};

/// One page of component metadata, in stable insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentPage {
    /// Parsed metadata records of this page.
    pub items: Vec<ComponentRecord>,
    /// How to continue the walk.
    pub next: PageToken,
}

impl ComponentPage {
    /// Whether this is the last page of the walk.
    pub fn is_final(&self) -> bool {
        matches!(self.next, PageToken::End)
    }

    /// Number of records in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page carries no records.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Per-table row counts from a component removal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedComponent {
    /// Rows deleted from the components table.
    pub components: usize,
    /// Rows deleted from the code table.
    pub code: usize,
    /// Rows deleted from the search table.
    pub search: usize,
    /// Rows deleted from the embeddings table, duplicates included.
    pub embeddings: usize,
}

impl RemovedComponent {
    /// Total rows deleted across all tables.
    pub fn total(&self) -> usize {
        self.components + self.code + self.search + self.embeddings
    }
}

/// Typed entry point for catalog operations.
///
/// `Catalog` owns a shared handle to the record store and routes every
/// operation through the pipeline crates:
///
/// 1. Changesets go through validate, resolve, snapshot, diff, and apply.
/// 2. Embeddings go through the de-duplicating embedding engine.
/// 3. Reads resolve unique keys against the live tables.
pub struct Catalog {
    store: Arc<dyn RecordStore>,
    config: CatalogConfig,
    embeddings: EmbeddingEngine,
}

impl Catalog {
    /// Create a catalog over the given store with the default configuration.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_config(store, CatalogConfig::default())
    }

    /// Create a catalog over the given store and configuration.
    pub fn with_config(store: Arc<dyn RecordStore>, config: CatalogConfig) -> Self {
        let embeddings = EmbeddingEngine::new(store.clone());
        Catalog {
            store,
            config,
            embeddings,
        }
    }

    /// Create a catalog backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// The underlying record store.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// The active configuration.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    // =========================================================================
    // Changeset Pipeline
    // =========================================================================

    /// Validate a changeset without touching the store.
    pub fn validate(&self, changeset: &Changeset) -> ValidationReport {
        validate_changeset(changeset)
    }

    /// Read the full live state of the entity tables.
    pub fn snapshot(&self) -> Result<CatalogSnapshot> {
        fetch_catalog_snapshot(self.store.as_ref(), &self.config)
    }

    /// Preview what applying a changeset would do.
    ///
    /// Rejects invalid changesets exactly like [`Catalog::apply`], so a
    /// summary is always the preview of an applicable changeset.
    pub fn diff(&self, changeset: &Changeset) -> Result<DiffSummary> {
        let validation = self.validate(changeset);
        if !validation.can_apply() {
            return Err(Error::ChangesetRejected {
                errors: validation.errors().cloned().collect(),
            });
        }
        let operations = resolve_operations(changeset)?;
        let snapshot = self.snapshot()?;
        Ok(diff_against_snapshot(&operations, &snapshot))
    }

    /// Validate and apply a changeset.
    pub fn apply(&self, changeset: &Changeset) -> Result<ApplyReport> {
        apply_changeset(self.store.clone(), changeset)
    }

    // =========================================================================
    // Component Reads
    // =========================================================================

    /// Fetch one component as a joined aggregate.
    ///
    /// Joins the metadata and code rows; a component without a code row
    /// comes back with empty `files`. Returns `Ok(None)` when no metadata
    /// row exists for the id.
    pub fn get_component(&self, component_id: &str) -> Result<Option<ComponentAggregate>> {
        let id = ComponentId::new(component_id)?;
        let table = Table::Components;
        let Some(row) = self
            .store
            .query_by_unique_key(table, table.key_field(), id.as_str())?
        else {
            return Ok(None);
        };
        let metadata: ComponentRecord = from_document(&row.doc)?;

        let code = match self
            .store
            .query_by_unique_key(Table::Code, Table::Code.key_field(), id.as_str())?
        {
            Some(code_row) => from_document(&code_row.doc)?,
            None => CodeRecord {
                component_id: metadata.component_id.clone(),
                files: Vec::new(),
            },
        };

        Ok(Some(join_component(&metadata, &code)))
    }

    /// List component metadata one page at a time.
    ///
    /// Rows that fail to parse as metadata records are logged and skipped;
    /// the continuation token still advances past them, so a page can carry
    /// fewer records than the requested size without being final.
    pub fn list_components(
        &self,
        page_size: Option<f64>,
        cursor: Option<Cursor>,
    ) -> Result<ComponentPage> {
        let page = self.store.paginate(Table::Components, page_size, cursor)?;
        let mut items = Vec::with_capacity(page.len());
        for row in &page.items {
            match from_document::<ComponentRecord>(&row.doc) {
                Ok(record) => items.push(record),
                Err(err) => {
                    warn!(
                        target: "tessella::catalog",
                        row = %row.id,
                        error = %err,
                        "skipping unparseable metadata row"
                    );
                }
            }
        }
        Ok(ComponentPage {
            items,
            next: page.next,
        })
    }

    // =========================================================================
    // Embedding Operations
    // =========================================================================

    /// Upsert a batch of embeddings, de-duplicating per key.
    pub fn upsert_embeddings(&self, entries: &[EmbeddingEntry]) -> Result<EmbeddingWriteStats> {
        self.embeddings.upsert_many(entries)
    }

    /// Delete every embedding row for the given component ids.
    pub fn delete_embeddings(&self, component_ids: &[String]) -> Result<usize> {
        self.embeddings.delete_many(component_ids)
    }

    /// Read the primary embedding row for a component, if one exists.
    pub fn get_embedding(&self, component_id: &str) -> Result<Option<EmbeddingRecord>> {
        self.embeddings.get(component_id)
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Delete every row for a component across all four tables.
    ///
    /// Removal is always this explicit call; the differ never infers
    /// deletions. Deletes every row found for the key, so duplicate
    /// embedding rows (and corrupt duplicate entity rows) go too.
    pub fn remove_component(&self, component_id: &str) -> Result<RemovedComponent> {
        let id = ComponentId::new(component_id)?;
        let removed = RemovedComponent {
            components: self.delete_all_rows(Table::Components, id.as_str())?,
            code: self.delete_all_rows(Table::Code, id.as_str())?,
            search: self.delete_all_rows(Table::Search, id.as_str())?,
            embeddings: self.delete_all_rows(Table::Embeddings, id.as_str())?,
        };
        info!(
            target: "tessella::catalog",
            component = %id,
            rows = removed.total(),
            "component removed"
        );
        Ok(removed)
    }

    fn delete_all_rows(&self, table: Table, key: &str) -> Result<usize> {
        let rows = self.store.query_by_field(table, table.key_field(), key)?;
        let count = rows.len();
        for row in rows {
            self.store.delete(row.id)?;
        }
        Ok(count)
    }
}

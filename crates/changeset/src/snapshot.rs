//! Full-table snapshot reads through pagination
//!
//! The differ needs the complete live state of the three entity tables. A
//! snapshot walks each table page by page until the store reports the end,
//! parsing rows into typed records keyed by component id.
//!
//! Rows that fail to parse are reported as warnings and skipped; duplicate
//! keys are reported as errors with the first-encountered row winning. A
//! snapshot read never mutates the store, so these findings surface data
//! problems without deciding what to do about them.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use tessella_core::{
    CatalogConfig, CodeRecord, ComponentRecord, Issue, Result, SearchRecord, TableRecord,
};
use tessella_store::{PageToken, RecordStore};

/// Typed snapshot of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot<R> {
    /// Parsed rows keyed by component id, in key order.
    pub records: BTreeMap<String, R>,
    /// Findings collected while reading (parse failures, duplicate keys).
    pub issues: Vec<Issue>,
}

impl<R: TableRecord> TableSnapshot<R> {
    /// Read the whole table through pagination.
    pub fn from_store(store: &dyn RecordStore, page_size: usize) -> Result<Self> {
        let table = R::TABLE;
        let mut records: BTreeMap<String, R> = BTreeMap::new();
        let mut issues = Vec::new();
        let mut cursor = None;
        let mut rows_read = 0usize;

        loop {
            let page = store.paginate(table, Some(page_size as f64), cursor)?;
            rows_read += page.len();
            for row in &page.items {
                let path = format!("{}/{}", table, row.id.seq);
                match R::from_document(&row.doc) {
                    Ok(record) => {
                        let key = record.unique_key().to_string();
                        if records.contains_key(&key) {
                            warn!(
                                target: "tessella::snapshot",
                                table = %table,
                                key = %key,
                                row = %row.id,
                                "duplicate key in snapshot; keeping the first row"
                            );
                            issues.push(Issue::error(
                                path,
                                format!("duplicate row for key {key:?}; keeping the first row"),
                            ));
                        } else {
                            records.insert(key, record);
                        }
                    }
                    Err(err) => {
                        issues.push(Issue::warning(
                            path,
                            format!("row does not match the expected shape: {err}"),
                        ));
                    }
                }
            }
            match page.next {
                PageToken::Next(next) => cursor = Some(next),
                PageToken::End => break,
            }
        }

        debug!(
            target: "tessella::snapshot",
            table = %table,
            rows = rows_read,
            parsed = records.len(),
            issues = issues.len(),
            "table snapshot read"
        );
        Ok(TableSnapshot { records, issues })
    }

    /// Look up a record by component id.
    pub fn get(&self, key: &str) -> Option<&R> {
        self.records.get(key)
    }

    /// Whether a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Number of parsed records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table held no parseable records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Snapshot of the three entity tables.
///
/// Embeddings are absent on purpose: they reconcile at write time and never
/// participate in the changeset diff.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    /// Metadata table.
    pub components: TableSnapshot<ComponentRecord>,
    /// Code table.
    pub code: TableSnapshot<CodeRecord>,
    /// Search table.
    pub search: TableSnapshot<SearchRecord>,
}

impl CatalogSnapshot {
    /// All findings across the three tables, in table order.
    pub fn issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        issues.extend(self.components.issues.iter().cloned());
        issues.extend(self.code.issues.iter().cloned());
        issues.extend(self.search.issues.iter().cloned());
        issues
    }

    /// Whether every table was empty.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.code.is_empty() && self.search.is_empty()
    }
}

/// Read the full live state of the entity tables.
pub fn fetch_catalog_snapshot(
    store: &dyn RecordStore,
    config: &CatalogConfig,
) -> Result<CatalogSnapshot> {
    let page_size = config.snapshot_page_size;
    Ok(CatalogSnapshot {
        components: TableSnapshot::from_store(store, page_size)?,
        code: TableSnapshot::from_store(store, page_size)?,
        search: TableSnapshot::from_store(store, page_size)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessella_core::{to_document, Document, Table};
    use tessella_store::{FailingStore, MemoryStore};

    fn component(id: &str, name: &str) -> ComponentRecord {
        ComponentRecord {
            component_id: id.to_string(),
            name: name.to_string(),
            framework: "react".to_string(),
            styling: "tailwind".to_string(),
            dependencies: vec![],
            intent: None,
            motion: None,
            primitives: vec![],
            animation_libraries: vec![],
            attribution: None,
            description: None,
        }
    }

    fn seed_component(store: &MemoryStore, id: &str, name: &str) {
        store
            .insert(Table::Components, to_document(&component(id, name)).unwrap())
            .unwrap();
    }

    #[test]
    fn test_empty_store_yields_empty_snapshot() {
        let store = MemoryStore::new();
        let snapshot = fetch_catalog_snapshot(&store, &CatalogConfig::default()).unwrap();
        assert!(snapshot.is_empty());
        assert!(snapshot.issues().is_empty());
    }

    #[test]
    fn test_snapshot_reads_all_rows_keyed_by_component_id() {
        let store = MemoryStore::new();
        seed_component(&store, "hero", "Hero");
        seed_component(&store, "card", "Card");

        let snapshot =
            TableSnapshot::<ComponentRecord>::from_store(&store, 100).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("hero").unwrap().name, "Hero");
        assert!(snapshot.contains_key("card"));
    }

    #[test]
    fn test_snapshot_walks_every_page() {
        let store = MemoryStore::new();
        for i in 0..7 {
            seed_component(&store, &format!("c{i}"), "Row");
        }

        // A page size smaller than the table forces multiple round trips.
        let snapshot = TableSnapshot::<ComponentRecord>::from_store(&store, 2).unwrap();
        assert_eq!(snapshot.len(), 7);
    }

    #[test]
    fn test_malformed_row_warns_and_is_skipped() {
        let store = MemoryStore::new();
        seed_component(&store, "good", "Good");
        let mut corrupt = Document::new();
        corrupt.insert("componentId".to_string(), "bad".into());
        store.insert(Table::Components, corrupt).unwrap();

        let snapshot = TableSnapshot::<ComponentRecord>::from_store(&store, 100).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.issues.len(), 1);
        let issue = &snapshot.issues[0];
        assert!(!issue.is_error());
        assert!(issue.path().starts_with("components/"));
        assert!(issue.message().contains("expected shape"));
    }

    #[test]
    fn test_duplicate_rows_error_and_first_wins() {
        let store = MemoryStore::unconstrained();
        seed_component(&store, "dup", "First");
        seed_component(&store, "dup", "Second");

        let snapshot = TableSnapshot::<ComponentRecord>::from_store(&store, 100).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("dup").unwrap().name, "First");

        assert_eq!(snapshot.issues.len(), 1);
        assert!(snapshot.issues[0].is_error());
        assert!(snapshot.issues[0].message().contains("duplicate row"));

        // Reads never mutate: both rows are still stored.
        assert_eq!(store.table_len(Table::Components), 2);
    }

    #[test]
    fn test_catalog_snapshot_collects_issues_across_tables() {
        let store = MemoryStore::new();
        let mut corrupt = Document::new();
        corrupt.insert("componentId".to_string(), "x".into());
        store.insert(Table::Components, corrupt.clone()).unwrap();
        store.insert(Table::Search, corrupt).unwrap();

        let snapshot = fetch_catalog_snapshot(&store, &CatalogConfig::default()).unwrap();
        assert_eq!(snapshot.issues().len(), 2);
    }

    #[test]
    fn test_store_errors_propagate() {
        let err =
            fetch_catalog_snapshot(&FailingStore::new(), &CatalogConfig::default()).unwrap_err();
        assert!(err.is_store_error());
    }
}

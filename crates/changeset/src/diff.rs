//! Classification of resolved operations against a live snapshot
//!
//! Pure function of its inputs: for every resolved target key, decide
//! whether applying would create a row, update one, or change nothing. The
//! comparison is field-for-field on the typed records, so a difference in
//! any stored field, derived haystack included, counts as an update.
//!
//! The differ is deliberately delete-blind. Keys present in the snapshot
//! but absent from the changeset never appear in the summary: deletions are
//! explicit operations elsewhere, never inferred from a partial changeset.

use std::fmt;

use serde::{Deserialize, Serialize};

use tessella_core::Table;

use crate::resolve::ResolvedOperation;
use crate::snapshot::CatalogSnapshot;

/// What applying one record to one table would do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffClass {
    /// Key absent from the snapshot.
    Create,
    /// Key present, stored record differs field-for-field.
    Update,
    /// Key present, stored record identical.
    Unchanged,
}

impl DiffClass {
    /// Stable lowercase name for reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffClass::Create => "create",
            DiffClass::Update => "update",
            DiffClass::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for DiffClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One classified (table, key) pair, for audit display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffEntry {
    /// Table the record targets.
    pub table: Table,
    /// Target key.
    pub component_id: String,
    /// What applying would do.
    pub class: DiffClass,
}

/// Per-class counts for one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffCounts {
    /// Keys that would be created.
    pub create: u64,
    /// Keys that would be updated.
    pub update: u64,
    /// Keys that would be left untouched.
    pub unchanged: u64,
}

impl DiffCounts {
    fn record(&mut self, class: DiffClass) {
        match class {
            DiffClass::Create => self.create += 1,
            DiffClass::Update => self.update += 1,
            DiffClass::Unchanged => self.unchanged += 1,
        }
    }

    /// Sum of all classes.
    pub fn total(&self) -> u64 {
        self.create + self.update + self.unchanged
    }

    fn merge(&mut self, other: &DiffCounts) {
        self.create += other.create;
        self.update += other.update;
        self.unchanged += other.unchanged;
    }
}

/// The differ's result: per-table counts plus the full classification list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    /// Counts for the components table.
    pub components: DiffCounts,
    /// Counts for the code table.
    pub code: DiffCounts,
    /// Counts for the search table.
    pub search: DiffCounts,
    /// Every classified (table, key) pair, in operation order.
    pub entries: Vec<DiffEntry>,
}

impl DiffSummary {
    /// Counts summed across the three tables.
    pub fn totals(&self) -> DiffCounts {
        let mut totals = self.components;
        totals.merge(&self.code);
        totals.merge(&self.search);
        totals
    }

    /// Whether applying would write nothing.
    pub fn is_noop(&self) -> bool {
        let totals = self.totals();
        totals.create == 0 && totals.update == 0
    }
}

fn classify<R: PartialEq>(existing: Option<&R>, desired: &R) -> DiffClass {
    match existing {
        None => DiffClass::Create,
        Some(current) if current == desired => DiffClass::Unchanged,
        Some(_) => DiffClass::Update,
    }
}

/// Classify every resolved operation against the snapshot.
///
/// Operations are classified independently: two operations targeting the
/// same key both appear in the summary, each compared against the same
/// snapshot state.
pub fn diff_against_snapshot(
    operations: &[ResolvedOperation],
    snapshot: &CatalogSnapshot,
) -> DiffSummary {
    let mut summary = DiffSummary::default();

    for op in operations {
        let key = op.component_id.as_str();

        let class = classify(snapshot.components.get(key), &op.metadata);
        summary.components.record(class);
        summary.entries.push(DiffEntry {
            table: Table::Components,
            component_id: op.component_id.clone(),
            class,
        });

        let class = classify(snapshot.code.get(key), &op.code);
        summary.code.record(class);
        summary.entries.push(DiffEntry {
            table: Table::Code,
            component_id: op.component_id.clone(),
            class,
        });

        let class = classify(snapshot.search.get(key), &op.search);
        summary.search.record(class);
        summary.entries.push(DiffEntry {
            table: Table::Search,
            component_id: op.component_id.clone(),
            class,
        });
    }

    summary
}

//! Changeset application
//!
//! Apply is the only pipeline step that writes. It re-validates, resolves,
//! and then routes every operation's records through the idempotent upsert
//! engine in a fixed order: metadata, then code, then search. Operations
//! run in changeset order, which is what makes the later of two operations
//! on the same key win.
//!
//! There is no cross-operation transaction: a store failure mid-apply
//! leaves earlier operations applied. Re-applying the same changeset after
//! fixing the store is safe because every write is a keyed upsert.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tessella_core::{Changeset, Error, Issue, Result};
use tessella_engine::{UpsertOutcome, Upserter};
use tessella_store::RecordStore;

use crate::resolve::{resolve_operations, ResolvedOperation};
use crate::validate::validate_changeset;

/// Insert/update counts for one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertCounts {
    /// Rows created.
    pub inserted: u64,
    /// Rows replaced.
    pub updated: u64,
}

impl UpsertCounts {
    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
        }
    }

    /// Total writes against the table.
    pub fn total(&self) -> u64 {
        self.inserted + self.updated
    }
}

/// What applying a changeset did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    /// Writes against the components table.
    pub components: UpsertCounts,
    /// Writes against the code table.
    pub code: UpsertCounts,
    /// Writes against the search table.
    pub search: UpsertCounts,
    /// Warning-severity findings from validation, passed through for
    /// callers that skipped the explicit validate step.
    pub warnings: Vec<Issue>,
}

impl ApplyReport {
    /// Total writes across all tables.
    pub fn total_writes(&self) -> u64 {
        self.components.total() + self.code.total() + self.search.total()
    }
}

/// Validate, resolve, and apply a changeset.
///
/// Fails with [`Error::ChangesetRejected`] carrying every error-severity
/// issue when validation finds any; nothing is written in that case.
/// Warning-severity issues never block and are returned in the report.
pub fn apply_changeset(store: Arc<dyn RecordStore>, changeset: &Changeset) -> Result<ApplyReport> {
    let validation = validate_changeset(changeset);
    if !validation.can_apply() {
        return Err(Error::ChangesetRejected {
            errors: validation.errors().cloned().collect(),
        });
    }

    let operations = resolve_operations(changeset)?;
    let mut report = apply_resolved(store, &operations)?;
    report.warnings = validation.warnings().cloned().collect();

    info!(
        target: "tessella::apply",
        changeset = %changeset.id,
        source = %changeset.source,
        operations = operations.len(),
        writes = report.total_writes(),
        "changeset applied"
    );
    Ok(report)
}

/// Apply already-resolved operations, in order.
pub fn apply_resolved(
    store: Arc<dyn RecordStore>,
    operations: &[ResolvedOperation],
) -> Result<ApplyReport> {
    let upserter = Upserter::new(store);
    let mut report = ApplyReport::default();

    for op in operations {
        debug!(target: "tessella::apply", component = %op.component_id, "applying operation");
        report.components.record(upserter.upsert(&op.metadata)?);
        report.code.record(upserter.upsert(&op.code)?);
        report.search.record(upserter.upsert(&op.search)?);
    }

    Ok(report)
}

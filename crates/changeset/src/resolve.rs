//! Expansion of changeset operations into per-table target records
//!
//! Resolution runs the codec once per operation so the differ and the apply
//! step work from the same records instead of re-splitting aggregates. The
//! operation order of the changeset is preserved: with duplicate keys, the
//! later resolved operation is the one apply lets win.

use tessella_core::{Changeset, CodeRecord, ComponentRecord, Result, SearchRecord};
use tessella_engine::split_component;

/// One operation expanded into its per-table target records.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOperation {
    /// Canonical (trimmed) key the operation targets.
    pub component_id: String,
    /// Target metadata row.
    pub metadata: ComponentRecord,
    /// Target code row.
    pub code: CodeRecord,
    /// Target search row.
    pub search: SearchRecord,
}

/// Resolve every operation of a changeset, in order.
///
/// Fails with [`tessella_core::Error::Validation`] on the first aggregate
/// that does not split; run [`crate::validate_changeset`] first to get the
/// full issue list instead of one error.
pub fn resolve_operations(changeset: &Changeset) -> Result<Vec<ResolvedOperation>> {
    changeset
        .operations
        .iter()
        .map(|operation| {
            let split = split_component(operation.component())?;
            Ok(ResolvedOperation {
                component_id: split.metadata.component_id.clone(),
                metadata: split.metadata,
                code: split.code,
                search: split.search,
            })
        })
        .collect()
}

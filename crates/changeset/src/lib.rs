//! Changeset reconciliation pipeline
//!
//! The steps a changeset moves through, each its own module:
//! - `validate`: structural and semantic checks, severity-tagged issues
//! - `resolve`: expand operations into per-table target records
//! - `snapshot`: read the full live state through pagination
//! - `diff`: classify every target key as create, update, or unchanged
//! - `apply`: route resolved records through the upsert engines
//!
//! Validate, resolve, and diff are pure given their inputs; only snapshot
//! reads and apply writes touch the store.

#![warn(clippy::all)]

pub mod apply;
pub mod diff;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use apply::{apply_changeset, apply_resolved, ApplyReport, UpsertCounts};
pub use diff::{diff_against_snapshot, DiffClass, DiffCounts, DiffEntry, DiffSummary};
pub use resolve::{resolve_operations, ResolvedOperation};
pub use snapshot::{fetch_catalog_snapshot, CatalogSnapshot, TableSnapshot};
pub use validate::{validate_changeset, ValidationReport};

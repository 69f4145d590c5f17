//! Tessella - Changeset-driven catalog store for reusable UI components
//!
//! Tessella keeps a catalog of UI components (metadata, source code, search
//! haystacks, embeddings) consistent under repeated, partially-overlapping
//! imports. Every write path is a keyed reconciliation: changesets are
//! validated, diffed against a live snapshot, and applied as idempotent
//! upserts; embedding writes de-duplicate their own rows as they go.
//!
//! # Quick Start
//!
//! ```ignore
//! use tessella::{Catalog, Changeset};
//!
//! let catalog = Catalog::in_memory();
//! let changeset = Changeset::from_json_str(&payload)?;
//!
//! let report = catalog.validate(&changeset);
//! if report.can_apply() {
//!     let preview = catalog.diff(&changeset)?;
//!     let applied = catalog.apply(&changeset)?;
//! }
//! ```
//!
//! # Architecture
//!
//! The workspace splits along the pipeline:
//!
//! - `tessella-core` - records, changesets, issues, errors, limits
//! - `tessella-store` - the [`RecordStore`] trait, pagination, the
//!   in-memory reference store
//! - `tessella-engine` - entity codec/splitter, idempotent upserts,
//!   embedding de-duplication
//! - `tessella-changeset` - validate, resolve, snapshot, diff, apply
//!
//! This crate re-exports all of them and adds the [`Catalog`] facade.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod catalog;

pub use catalog::{Catalog, ComponentPage, RemovedComponent};

pub use tessella_changeset::*;
pub use tessella_core::*;
pub use tessella_engine::*;
pub use tessella_store::*;

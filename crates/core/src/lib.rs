//! Core types for the Tessella catalog
//!
//! This crate defines the foundational types used throughout the system:
//! - ComponentId: Validated unique key for catalog entries
//! - Table: Discriminates between the catalog tables
//! - ComponentAggregate: The inbound component shape and its split records
//! - Changeset: The JSON exchange format for catalog mutations
//! - Issue: Severity-tagged validation findings
//! - Error: Error type hierarchy
//! - Limits: Embedding dimensions, page sizes, schema versions

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
pub mod changeset;
pub mod component;
pub mod document;
pub mod error;
pub mod issue;
pub mod limits;
pub mod types;

// Re-export commonly used types
pub use changeset::{Changeset, ChangesetSource, Operation};
pub use component::{
    CodeFile, CodeRecord, ComponentAggregate, ComponentRecord, EmbeddingRecord, SearchRecord,
    SourceAttribution, TableRecord,
};
pub use document::{from_document, to_document, Document};
pub use error::{Error, Result};
pub use issue::{has_errors, Issue, Severity};
pub use limits::{
    normalize_page_size, CatalogConfig, CHANGESET_SCHEMA_VERSION, DEFAULT_PAGE_SIZE,
    EMBEDDING_DIMENSIONS, EMBEDDING_SCHEMA_VERSION, MAX_PAGE_SIZE,
};
pub use types::{ComponentId, Table};

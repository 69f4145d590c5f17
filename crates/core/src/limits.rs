//! Fixed limits and schema versions for the catalog
//!
//! This module defines the constants enforced by the engines and the page-size
//! normalization applied at the store boundary.
//!
//! ## Contract
//!
//! `EMBEDDING_DIMENSIONS` and the schema versions are FROZEN for a given
//! deployment: every stored vector and changeset document is checked against
//! them, so changing one is a migration, not a config edit. Page sizes are
//! operational knobs and may vary per call.

use serde::{Deserialize, Serialize};

/// Exact length every embedding vector must have.
pub const EMBEDDING_DIMENSIONS: usize = 768;

/// Page size used when the caller passes no usable value.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Largest page a single paginate call may return.
pub const MAX_PAGE_SIZE: usize = 500;

/// Schema version accepted in changeset documents.
pub const CHANGESET_SCHEMA_VERSION: u32 = 1;

/// Schema version stamped on every embedding row.
pub const EMBEDDING_SCHEMA_VERSION: u32 = 1;

/// Normalize a requested page size into the valid range.
///
/// Requests cross a JSON boundary, so the raw value arrives as an optional
/// float. The rules are:
/// - `None`, NaN, or an infinity falls back to [`DEFAULT_PAGE_SIZE`]
/// - fractional values are floored
/// - zero and negative values fall back to [`DEFAULT_PAGE_SIZE`]
/// - anything above [`MAX_PAGE_SIZE`] is clamped to it
pub fn normalize_page_size(requested: Option<f64>) -> usize {
    let Some(raw) = requested else {
        return DEFAULT_PAGE_SIZE;
    };
    if !raw.is_finite() {
        return DEFAULT_PAGE_SIZE;
    }
    let floored = raw.floor();
    if floored < 1.0 {
        return DEFAULT_PAGE_SIZE;
    }
    if floored >= MAX_PAGE_SIZE as f64 {
        return MAX_PAGE_SIZE;
    }
    floored as usize
}

/// Tuning knobs fixed at catalog construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Page size used while scanning tables for a snapshot.
    pub snapshot_page_size: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            // Snapshot reads want the fewest round trips the store allows.
            snapshot_page_size: MAX_PAGE_SIZE,
        }
    }
}

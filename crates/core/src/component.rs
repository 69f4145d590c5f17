//! Component aggregates and the per-table records they split into
//!
//! A changeset carries whole components (metadata, taxonomy, source files in
//! one object). The store keeps them split across four tables. This module
//! defines both shapes plus the [`TableRecord`] trait the upsert engine is
//! generic over.
//!
//! ## Design
//!
//! The aggregate deserializes leniently: missing fields become empty defaults
//! so one malformed operation surfaces as indexed validation issues instead of
//! failing the whole document parse. Split records deserialize strictly, which
//! is how snapshot reads notice rows that no longer match the expected shape.

use crate::document::{self, Document};
use crate::error::Result;
use crate::limits::EMBEDDING_SCHEMA_VERSION;
use crate::types::Table;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One source file inside a component aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFile {
    /// Path of the file relative to the component root.
    #[serde(default)]
    pub path: String,
    /// Full file contents.
    #[serde(default)]
    pub contents: String,
    /// Source language tag, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Provenance of an imported component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAttribution {
    /// Where the component came from.
    #[serde(default)]
    pub source: String,
    /// Link to the original, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// License of the original, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Author of the original, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// The inbound component shape carried by changeset operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentAggregate {
    /// Unique key of the component.
    #[serde(default)]
    pub component_id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// UI framework the component targets.
    #[serde(default)]
    pub framework: String,
    /// Styling system the component uses.
    #[serde(default)]
    pub styling: String,
    /// Package dependencies the component needs.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// What the component is for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Motion character, when the component animates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion: Option<String>,
    /// UI primitives the component is built from.
    #[serde(default)]
    pub primitives: Vec<String>,
    /// Animation libraries the component uses.
    #[serde(default)]
    pub animation_libraries: Vec<String>,
    /// Provenance, when imported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<SourceAttribution>,
    /// Source files of the component.
    #[serde(default)]
    pub files: Vec<CodeFile>,
    /// Longer free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A typed record that lives in exactly one catalog table.
///
/// The upsert engine is generic over this trait: it learns the target table
/// from `TABLE`, the row identity from `unique_key`, and moves the record
/// through the store boundary with the document conversions.
pub trait TableRecord: Serialize + DeserializeOwned {
    /// The table this record type lives in.
    const TABLE: Table;

    /// The unique key value of this record.
    fn unique_key(&self) -> &str;

    /// Serialize into a store document.
    fn to_document(&self) -> Result<Document> {
        document::to_document(self)
    }

    /// Deserialize from a store document.
    fn from_document(doc: &Document) -> Result<Self>
    where
        Self: Sized,
    {
        document::from_document(doc)
    }
}

/// Metadata row: everything about a component except its source files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    /// Unique key of the component.
    pub component_id: String,
    /// Human-readable name.
    pub name: String,
    /// UI framework the component targets.
    pub framework: String,
    /// Styling system the component uses.
    pub styling: String,
    /// Package dependencies the component needs.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// What the component is for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Motion character, when the component animates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion: Option<String>,
    /// UI primitives the component is built from.
    #[serde(default)]
    pub primitives: Vec<String>,
    /// Animation libraries the component uses.
    #[serde(default)]
    pub animation_libraries: Vec<String>,
    /// Provenance, when imported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<SourceAttribution>,
    /// Longer free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TableRecord for ComponentRecord {
    const TABLE: Table = Table::Components;

    fn unique_key(&self) -> &str {
        &self.component_id
    }
}

/// Code row: the source files of one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeRecord {
    /// Unique key of the component.
    pub component_id: String,
    /// Source files of the component.
    #[serde(default)]
    pub files: Vec<CodeFile>,
}

impl TableRecord for CodeRecord {
    const TABLE: Table = Table::Code;

    fn unique_key(&self) -> &str {
        &self.component_id
    }
}

/// Search row: the derived haystack and facets of one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecord {
    /// Unique key of the component.
    pub component_id: String,
    /// Lowercased text blob assembled from the searchable fields.
    pub haystack: String,
    /// Sorted, deduplicated filter values.
    #[serde(default)]
    pub facets: Vec<String>,
}

impl TableRecord for SearchRecord {
    const TABLE: Table = Table::Search;

    fn unique_key(&self) -> &str {
        &self.component_id
    }
}

/// Embedding row: one reconciled vector per component and model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingRecord {
    /// Key of the component the vector belongs to.
    pub component_id: String,
    /// Model that produced the vector.
    pub model: String,
    /// The vector, exactly `EMBEDDING_DIMENSIONS` long.
    pub vector: Vec<f32>,
    /// Row schema version.
    pub schema_version: u32,
}

impl EmbeddingRecord {
    /// Create a record stamped with the current schema version.
    pub fn new(component_id: impl Into<String>, model: impl Into<String>, vector: Vec<f32>) -> Self {
        EmbeddingRecord {
            component_id: component_id.into(),
            model: model.into(),
            vector,
            schema_version: EMBEDDING_SCHEMA_VERSION,
        }
    }
}

impl TableRecord for EmbeddingRecord {
    const TABLE: Table = Table::Embeddings;

    fn unique_key(&self) -> &str {
        &self.component_id
    }
}

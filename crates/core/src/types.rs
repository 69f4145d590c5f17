//! Identifier and table types for the catalog
//!
//! ## Design
//!
//! - `ComponentId` is the validated unique key for a catalog entry. It is
//!   trimmed at construction and never empty, so every key comparison in the
//!   system happens on the canonical form.
//! - `Table` names the four catalog tables and carries their key metadata.
//!   Only the embeddings table tolerates transient duplicate rows; the three
//!   entity tables enforce one row per key.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated unique key for a catalog entry.
///
/// Construction trims surrounding whitespace and rejects keys that are empty
/// afterwards, returning [`Error::InvalidKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Create a component id from a raw string, trimming whitespace.
    ///
    /// Returns [`Error::InvalidKey`] when the trimmed value is empty.
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidKey {
                key: raw.to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The canonical (trimmed) key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the id, returning the canonical key string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ComponentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The catalog tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Table {
    /// Component metadata (name, framework, styling, taxonomy fields).
    #[serde(rename = "components")]
    Components,
    /// Source files for a component.
    #[serde(rename = "component_code")]
    Code,
    /// Derived search haystack and facets.
    #[serde(rename = "search_index")]
    Search,
    /// Embedding vectors, one reconciled row per component and model.
    #[serde(rename = "embeddings")]
    Embeddings,
}

impl Table {
    /// All tables, in reconciliation order.
    pub const ALL: [Table; 4] = [
        Table::Components,
        Table::Code,
        Table::Search,
        Table::Embeddings,
    ];

    /// The entity tables populated by changeset application.
    pub const ENTITY: [Table; 3] = [Table::Components, Table::Code, Table::Search];

    /// Stable table name as used in record paths and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Components => "components",
            Table::Code => "component_code",
            Table::Search => "search_index",
            Table::Embeddings => "embeddings",
        }
    }

    /// The document field every table is keyed by.
    pub fn key_field(&self) -> &'static str {
        "componentId"
    }

    /// Whether the store must reject a second row with the same key.
    ///
    /// Embedding rows are reconciled by the engine instead, so duplicates are
    /// tolerated there and healed on the next write.
    pub fn enforces_unique_key(&self) -> bool {
        !matches!(self, Table::Embeddings)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== ComponentId Tests ==========

    #[test]
    fn test_component_id_accepts_plain_key() {
        let id = ComponentId::new("hero-banner").unwrap();
        assert_eq!(id.as_str(), "hero-banner");
    }

    #[test]
    fn test_component_id_trims_whitespace() {
        let id = ComponentId::new("  hero-banner\t").unwrap();
        assert_eq!(id.as_str(), "hero-banner");
    }

    #[test]
    fn test_component_id_rejects_empty() {
        let err = ComponentId::new("").unwrap_err();
        assert!(matches!(err, Error::InvalidKey { .. }));
    }

    #[test]
    fn test_component_id_rejects_whitespace_only() {
        let err = ComponentId::new("   \n ").unwrap_err();
        assert!(matches!(err, Error::InvalidKey { .. }));
    }

    #[test]
    fn test_component_id_display() {
        let id = ComponentId::new("card").unwrap();
        assert_eq!(id.to_string(), "card");
    }

    #[test]
    fn test_component_id_ordering() {
        let a = ComponentId::new("alpha").unwrap();
        let b = ComponentId::new("beta").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_component_id_serde_is_plain_string() {
        let id = ComponentId::new("modal").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"modal\"");
        let back: ComponentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    // ========== Table Tests ==========

    #[test]
    fn test_table_names_are_stable() {
        assert_eq!(Table::Components.as_str(), "components");
        assert_eq!(Table::Code.as_str(), "component_code");
        assert_eq!(Table::Search.as_str(), "search_index");
        assert_eq!(Table::Embeddings.as_str(), "embeddings");
    }

    #[test]
    fn test_all_tables_keyed_by_component_id() {
        for table in Table::ALL {
            assert_eq!(table.key_field(), "componentId");
        }
    }

    #[test]
    fn test_only_embeddings_tolerates_duplicates() {
        assert!(Table::Components.enforces_unique_key());
        assert!(Table::Code.enforces_unique_key());
        assert!(Table::Search.enforces_unique_key());
        assert!(!Table::Embeddings.enforces_unique_key());
    }

    #[test]
    fn test_entity_tables_exclude_embeddings() {
        assert!(!Table::ENTITY.contains(&Table::Embeddings));
        assert_eq!(Table::ENTITY.len(), 3);
    }

    #[test]
    fn test_table_display() {
        assert_eq!(Table::Search.to_string(), "search_index");
    }

    #[test]
    fn test_table_serde_matches_stable_names() {
        for table in Table::ALL {
            let json = serde_json::to_value(table).unwrap();
            assert_eq!(json, table.as_str());
        }
    }
}

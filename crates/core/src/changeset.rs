//! The changeset exchange format
//!
//! A changeset is an immutable, ordered list of desired upsert operations
//! against the catalog, with provenance and a creation timestamp. Producers
//! (CLI, ingest jobs, agents) write one as a JSON file; the validate, diff,
//! and apply steps consume it. A changeset is never mutated after creation;
//! a new changeset supersedes it.
//!
//! Parsing here is shape-level only. Whether the document is APPLICABLE
//! (schema version, non-empty id, valid aggregates) is the validator's job,
//! so a single bad operation yields indexed issues instead of a parse error.

use crate::component::ComponentAggregate;
use crate::error::{Error, Result};
use crate::limits::CHANGESET_SCHEMA_VERSION;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use uuid::Uuid;

/// Who produced a changeset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangesetSource {
    /// Hand-written by an operator.
    Manual,
    /// Produced by an ingest pipeline.
    Ingest,
    /// Produced by an agent.
    Agent,
}

impl ChangesetSource {
    /// Stable lowercase name, as used in the exchange format.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangesetSource::Manual => "manual",
            ChangesetSource::Ingest => "ingest",
            ChangesetSource::Agent => "agent",
        }
    }
}

impl fmt::Display for ChangesetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single desired mutation.
///
/// Upsert is the only operation type: deletions are never inferred and enter
/// the system through explicit removal calls, not changesets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Operation {
    /// Create or replace one component across its tables.
    Upsert {
        /// The desired component state.
        component: ComponentAggregate,
    },
}

impl Operation {
    /// The component aggregate this operation targets.
    pub fn component(&self) -> &ComponentAggregate {
        match self {
            Operation::Upsert { component } => component,
        }
    }
}

/// An immutable, ordered list of desired upsert operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Changeset {
    /// Exchange format version, checked by the validator.
    pub schema_version: u32,
    /// Unique changeset id.
    pub id: String,
    /// When the changeset was produced.
    pub created_at: DateTime<Utc>,
    /// Who produced it.
    pub source: ChangesetSource,
    /// The desired mutations, in audit order.
    pub operations: Vec<Operation>,
}

impl Changeset {
    /// Create a changeset with a fresh id and the current timestamp.
    pub fn new(source: ChangesetSource, operations: Vec<Operation>) -> Self {
        Changeset {
            schema_version: CHANGESET_SCHEMA_VERSION,
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            source,
            operations,
        }
    }

    /// Parse a changeset document from a JSON string.
    ///
    /// Returns [`Error::Malformed`] when the document does not match the
    /// declared shape.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Malformed {
            message: e.to_string(),
        })
    }

    /// Parse a changeset document from a reader (usually a file).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(|e| Error::Malformed {
            message: e.to_string(),
        })
    }

    /// Serialize to the pretty-printed exchange format.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the changeset carries no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn aggregate(id: &str) -> ComponentAggregate {
        serde_json::from_value(serde_json::json!({
            "componentId": id,
            "name": "Sample",
            "framework": "react",
            "styling": "tailwind",
            "files": [{"path": "sample.tsx", "contents": "export {};"}],
        }))
        .unwrap()
    }

    // ========== Construction Tests ==========

    #[test]
    fn test_new_stamps_schema_version_and_id() {
        let cs = Changeset::new(ChangesetSource::Manual, vec![]);
        assert_eq!(cs.schema_version, CHANGESET_SCHEMA_VERSION);
        assert!(!cs.id.is_empty());
        assert!(cs.is_empty());
    }

    #[test]
    fn test_new_generates_distinct_ids() {
        let a = Changeset::new(ChangesetSource::Agent, vec![]);
        let b = Changeset::new(ChangesetSource::Agent, vec![]);
        assert_ne!(a.id, b.id);
    }

    // ========== Exchange Format Tests ==========

    #[test]
    fn test_serializes_with_exchange_field_names() {
        let cs = Changeset {
            schema_version: 1,
            id: "cs-001".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            source: ChangesetSource::Ingest,
            operations: vec![Operation::Upsert {
                component: aggregate("hero"),
            }],
        };

        let json = serde_json::to_value(&cs).unwrap();
        assert_eq!(json["schemaVersion"], 1);
        assert_eq!(json["id"], "cs-001");
        assert_eq!(json["source"], "ingest");
        assert_eq!(json["operations"][0]["type"], "upsert");
        assert_eq!(json["operations"][0]["component"]["componentId"], "hero");
        // ISO-8601 timestamp string.
        assert!(json["createdAt"].as_str().unwrap().starts_with("2024-05-01T12:00:00"));
    }

    #[test]
    fn test_parses_exchange_document() {
        let doc = r#"{
            "schemaVersion": 1,
            "id": "cs-42",
            "createdAt": "2024-05-01T12:00:00Z",
            "source": "manual",
            "operations": [
                {"type": "upsert", "component": {"componentId": "hero", "name": "Hero",
                 "framework": "react", "styling": "tailwind",
                 "files": [{"path": "hero.tsx", "contents": "export {};"}]}}
            ]
        }"#;

        let cs = Changeset::from_json_str(doc).unwrap();
        assert_eq!(cs.id, "cs-42");
        assert_eq!(cs.source, ChangesetSource::Manual);
        assert_eq!(cs.len(), 1);
        assert_eq!(cs.operations[0].component().component_id, "hero");
    }

    #[test]
    fn test_round_trips_through_json_string() {
        let cs = Changeset::new(
            ChangesetSource::Agent,
            vec![Operation::Upsert {
                component: aggregate("card"),
            }],
        );
        let json = cs.to_json_string().unwrap();
        let back = Changeset::from_json_str(&json).unwrap();
        assert_eq!(back, cs);
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let err = Changeset::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn test_unknown_operation_type_is_rejected() {
        let doc = r#"{
            "schemaVersion": 1,
            "id": "cs-9",
            "createdAt": "2024-05-01T12:00:00Z",
            "source": "manual",
            "operations": [{"type": "delete", "componentId": "hero"}]
        }"#;
        let err = Changeset::from_json_str(doc).unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        let doc = r#"{
            "schemaVersion": 1,
            "id": "cs-9",
            "createdAt": "2024-05-01T12:00:00Z",
            "source": "robot",
            "operations": []
        }"#;
        assert!(Changeset::from_json_str(doc).is_err());
    }

    #[test]
    fn test_operation_with_sparse_component_still_parses() {
        // Aggregate validation is the validator's job, not the parser's.
        let doc = r#"{
            "schemaVersion": 1,
            "id": "cs-10",
            "createdAt": "2024-05-01T12:00:00Z",
            "source": "ingest",
            "operations": [{"type": "upsert", "component": {"componentId": "bare"}}]
        }"#;
        let cs = Changeset::from_json_str(doc).unwrap();
        assert_eq!(cs.operations[0].component().name, "");
    }

    #[test]
    fn test_from_reader_matches_from_str() {
        let cs = Changeset::new(ChangesetSource::Manual, vec![]);
        let json = cs.to_json_string().unwrap();
        let back = Changeset::from_reader(json.as_bytes()).unwrap();
        assert_eq!(back, cs);
    }

    #[test]
    fn test_source_names_are_stable() {
        assert_eq!(ChangesetSource::Manual.as_str(), "manual");
        assert_eq!(ChangesetSource::Ingest.as_str(), "ingest");
        assert_eq!(ChangesetSource::Agent.as_str(), "agent");
    }
}

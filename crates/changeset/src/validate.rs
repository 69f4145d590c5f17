//! Structural and semantic validation of changesets
//!
//! Validation never mutates and never stops early: every operation is
//! checked and every finding collected, so one validation run surfaces the
//! complete remediation list. Whether the changeset may be applied is a
//! single question answered by [`ValidationReport::can_apply`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use tessella_core::{has_errors, Changeset, Issue, CHANGESET_SCHEMA_VERSION};
use tessella_engine::validate_aggregate;

/// Outcome of validating one changeset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Every finding, in document order.
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    /// Whether the changeset is free of error-severity issues.
    pub fn can_apply(&self) -> bool {
        !has_errors(&self.issues)
    }

    /// The error-severity findings.
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| issue.is_error())
    }

    /// The warning-severity findings.
    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| !issue.is_error())
    }

    /// Whether validation found nothing at all.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Validate a parsed changeset document.
///
/// Checks the envelope (schema version, id) and re-validates every embedded
/// component aggregate, with issue paths indexed by operation. Duplicate
/// component ids across operations are legal (the last operation wins on
/// apply) and reported as warnings.
pub fn validate_changeset(changeset: &Changeset) -> ValidationReport {
    let mut issues = Vec::new();

    if changeset.schema_version != CHANGESET_SCHEMA_VERSION {
        issues.push(Issue::error(
            "schemaVersion",
            format!(
                "unsupported schema version {} (expected {})",
                changeset.schema_version, CHANGESET_SCHEMA_VERSION
            ),
        ));
    }

    if changeset.id.trim().is_empty() {
        issues.push(Issue::error("id", "changeset id must be non-empty"));
    }

    if changeset.operations.is_empty() {
        issues.push(Issue::warning("operations", "changeset contains no operations"));
    }

    let mut first_op_for_key: HashMap<String, usize> = HashMap::new();
    for (index, operation) in changeset.operations.iter().enumerate() {
        let component = operation.component();
        let base_path = format!("operations/{index}/component");
        issues.extend(validate_aggregate(component, &base_path));

        let key = component.component_id.trim();
        if key.is_empty() {
            continue;
        }
        match first_op_for_key.get(key) {
            Some(first) => issues.push(Issue::warning(
                format!("{base_path}/componentId"),
                format!(
                    "duplicate component id {key:?} (also targeted by operation {first}); the later operation wins on apply"
                ),
            )),
            None => {
                first_op_for_key.insert(key.to_string(), index);
            }
        }
    }

    ValidationReport { issues }
}

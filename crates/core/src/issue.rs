//! Severity-tagged findings produced by validation and snapshot reads
//!
//! Issues never abort the pass that produced them. A validator or snapshot
//! read collects every issue it finds so one run surfaces the full
//! remediation list; callers then decide what an error-severity issue blocks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of an [`Issue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks changeset application.
    Error,
    /// Reported but never blocks.
    Warning,
}

/// A single validation or data-quality finding.
///
/// `path` locates the finding with `/`-separated segments, for example
/// `operations/3/component/name` or `search_index/12`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "severity", rename_all = "lowercase")]
pub enum Issue {
    /// A finding that blocks changeset application.
    Error {
        /// What is wrong
        message: String,
        /// Where it was found
        path: String,
    },
    /// A finding that is surfaced but never blocks.
    Warning {
        /// What is suspect
        message: String,
        /// Where it was found
        path: String,
    },
}

impl Issue {
    /// Create an error-severity issue.
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Issue::Error {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create a warning-severity issue.
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Issue::Warning {
            message: message.into(),
            path: path.into(),
        }
    }

    /// The issue's severity.
    pub fn severity(&self) -> Severity {
        match self {
            Issue::Error { .. } => Severity::Error,
            Issue::Warning { .. } => Severity::Warning,
        }
    }

    /// Whether this issue blocks changeset application.
    pub fn is_error(&self) -> bool {
        matches!(self, Issue::Error { .. })
    }

    /// The finding text.
    pub fn message(&self) -> &str {
        match self {
            Issue::Error { message, .. } | Issue::Warning { message, .. } => message,
        }
    }

    /// The `/`-separated location of the finding.
    pub fn path(&self) -> &str {
        match self {
            Issue::Error { path, .. } | Issue::Warning { path, .. } => path,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self {
            Issue::Error { .. } => "error",
            Issue::Warning { .. } => "warning",
        };
        write!(f, "{} at {}: {}", severity, self.path(), self.message())
    }
}

/// Whether any issue in the slice has error severity.
pub fn has_errors(issues: &[Issue]) -> bool {
    issues.iter().any(Issue::is_error)
}

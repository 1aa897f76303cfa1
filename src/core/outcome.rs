//! core::outcome
//!
//! Per-operation execution results.
//!
//! An [`ExecutionResult`] is produced exactly once for every attempted
//! operation, whatever happened to it. Failures carry a [`FailureKind`];
//! a rollback failure is always a separate warning, never the main error.

use serde::{Deserialize, Serialize};

/// Error taxonomy attached to results and replay entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A parameter was out of range; the operation was skipped.
    Validation,
    /// No predicate or handler matched; the operation was skipped.
    Routing,
    /// The handler reported failure.
    Execution,
    /// The best-effort rollback itself failed.
    Rollback,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Validation => "validation",
            FailureKind::Routing => "routing",
            FailureKind::Execution => "execution",
            FailureKind::Rollback => "rollback",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub kind: FailureKind,
    pub message: String,
}

impl FailureRecord {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Outcome of one attempted operation.
///
/// # Example
///
/// ```
/// use textcad::core::outcome::{ExecutionResult, FailureKind};
///
/// let ok = ExecutionResult::succeeded("F1");
/// assert!(ok.success);
///
/// let failed = ExecutionResult::failed(FailureKind::Routing, "unhandled");
/// assert_eq!(failed.error.as_ref().map(|e| e.kind), Some(FailureKind::Routing));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<FailureRecord>,
}

impl ExecutionResult {
    /// A successful result for `feature_id`.
    pub fn succeeded(feature_id: impl Into<String>) -> Self {
        Self {
            success: true,
            feature_id: Some(feature_id.into()),
            error: None,
            warnings: Vec::new(),
        }
    }

    /// A failed result with one classified error.
    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            feature_id: None,
            error: Some(FailureRecord::new(kind, message)),
            warnings: Vec::new(),
        }
    }

    /// Attach a warning.
    pub fn with_warning(mut self, kind: FailureKind, message: impl Into<String>) -> Self {
        self.warnings.push(FailureRecord::new(kind, message));
        self
    }

    /// Kind of the main error, if any.
    pub fn error_kind(&self) -> Option<FailureKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

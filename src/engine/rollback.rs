//! engine::rollback
//!
//! Best-effort rollback of a document to its last checkpoint.
//!
//! The document primitive is weak: it reverts to the last checkpoint, which
//! may predate the operation being undone, and it may fail outright. This
//! module only wraps that primitive with a typed result and logging; it never
//! retries.

use thiserror::Error;
use tracing::{debug, warn};

use crate::handlers::Document;

/// The document refused or failed to roll back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rollback to last checkpoint failed after '{label}'")]
pub struct RollbackError {
    /// Label of the scope that requested the rollback.
    pub label: String,
}

/// Result of a rollback attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackResult {
    /// The scope was committed, so nothing was attempted.
    NotNeeded,
    /// The document reported a successful revert.
    RolledBack,
    /// The document reported failure.
    Failed(RollbackError),
}

impl RollbackResult {
    pub fn has_failed(&self) -> bool {
        matches!(self, RollbackResult::Failed(_))
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        match self {
            RollbackResult::NotNeeded => "no rollback needed".to_string(),
            RollbackResult::RolledBack => "rolled back to last checkpoint".to_string(),
            RollbackResult::Failed(e) => e.to_string(),
        }
    }
}

/// Ask `document` to revert to its last checkpoint, exactly once.
pub fn attempt_rollback<D: Document + ?Sized>(document: &mut D, label: &str) -> RollbackResult {
    if document.best_effort_rollback() {
        debug!(label, "rolled back to last checkpoint");
        RollbackResult::RolledBack
    } else {
        warn!(label, "rollback to last checkpoint failed");
        RollbackResult::Failed(RollbackError {
            label: label.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::memory::MemoryDocument;

    #[test]
    fn reports_success() {
        let mut doc = MemoryDocument::new();
        assert_eq!(attempt_rollback(&mut doc, "op"), RollbackResult::RolledBack);
        assert_eq!(doc.rollback_calls(), 1);
    }

    #[test]
    fn reports_failure_with_label() {
        let mut doc = MemoryDocument::new();
        doc.set_fail_rollback(true);
        let result = attempt_rollback(&mut doc, "hole #2");
        assert!(result.has_failed());
        assert_eq!(
            result.summary(),
            "rollback to last checkpoint failed after 'hole #2'"
        );
    }
}

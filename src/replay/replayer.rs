//! replay::replayer
//!
//! Re-execute a loaded log against a document.
//!
//! Entries run in sequence order through the normal executor path
//! (gate, router, scope, handler) without re-parsing the instruction. The
//! replay itself is never recorded. Each entry reports whether the replayed
//! `success` matches the one on record.

use serde::Serialize;
use tracing::info;

use super::entry::ReplayEntry;
use crate::core::outcome::ExecutionResult;
use crate::engine::exec::Executor;
use crate::handlers::Document;

/// One re-executed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayedEntry {
    pub sequence: u64,
    pub recorded: ExecutionResult,
    pub replayed: ExecutionResult,
}

impl ReplayedEntry {
    /// True when both runs agree on success.
    pub fn matches(&self) -> bool {
        self.recorded.success == self.replayed.success
    }
}

/// Result of replaying one log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub entries: Vec<ReplayedEntry>,
}

impl ReplayReport {
    pub fn mismatches(&self) -> usize {
        self.entries.iter().filter(|e| !e.matches()).count()
    }

    pub fn is_faithful(&self) -> bool {
        self.mismatches() == 0
    }
}

/// Re-execute `entries` on `document` in ascending sequence order.
pub fn replay<D: Document>(
    executor: &Executor<'_, D>,
    document: &mut D,
    entries: &[ReplayEntry],
) -> ReplayReport {
    let mut ordered: Vec<&ReplayEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.sequence);

    let mut report = ReplayReport::default();
    for entry in ordered {
        let replayed =
            executor.execute_operation(document, &entry.operation, entry.operation_index);
        report.entries.push(ReplayedEntry {
            sequence: entry.sequence,
            recorded: entry.result.clone(),
            replayed,
        });
    }

    info!(
        entries = report.entries.len(),
        mismatches = report.mismatches(),
        "replay finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operation::{Action, Operation, Parameters};
    use crate::core::outcome::FailureKind;
    use crate::core::types::{SessionId, Source};
    use crate::handlers::builtin::reference_registry;
    use crate::handlers::memory::MemoryDocument;
    use crate::replay::entry::PendingEntry;

    fn entry(sequence: u64, operation: Operation, result: ExecutionResult) -> ReplayEntry {
        ReplayEntry::stamp(
            PendingEntry {
                source_instruction: "recorded".to_string(),
                source: Source::Deterministic,
                operation_index: 0,
                operation_count: 1,
                operation,
                result,
            },
            SessionId::from_string("s"),
            sequence,
        )
    }

    fn plate() -> Operation {
        Operation::new(
            Action::CreateFeature,
            Parameters {
                shape: Some("plate".to_string()),
                ..Parameters::default()
            },
        )
    }

    fn hole() -> Operation {
        Operation::new(
            Action::CreateHole,
            Parameters {
                diameter_mm: Some(5.0),
                ..Parameters::default()
            },
        )
    }

    #[test]
    fn runs_in_sequence_order() {
        let registry = reference_registry();
        let executor = Executor::new(&registry);
        let mut doc = MemoryDocument::new();

        // Out of file order: the hole only succeeds after the plate.
        let entries = vec![
            entry(2, hole(), ExecutionResult::succeeded("F2")),
            entry(1, plate(), ExecutionResult::succeeded("F1")),
        ];
        let report = replay(&executor, &mut doc, &entries);

        let sequences: Vec<u64> = report.entries.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![1, 2]);
        assert!(report.is_faithful());
        assert_eq!(doc.features().len(), 2);
    }

    #[test]
    fn reports_mismatches() {
        let registry = reference_registry();
        let executor = Executor::new(&registry);
        let mut doc = MemoryDocument::new();

        let entries = vec![entry(1, hole(), ExecutionResult::succeeded("F9"))];
        let report = replay(&executor, &mut doc, &entries);
        assert_eq!(report.mismatches(), 1);
        assert_eq!(
            report.entries[0].replayed.error_kind(),
            Some(FailureKind::Execution)
        );
    }
}

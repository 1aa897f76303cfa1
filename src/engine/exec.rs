//! engine::exec
//!
//! The batch executor.
//!
//! # Architecture
//!
//! The executor is the only component that hands a document to a handler.
//! For each operation, in batch order:
//!
//! 1. **Gate**: reject out-of-range parameters (`validation`)
//! 2. **Route**: pick a handler family; no match is `routing`
//! 3. **Validate**: the handler's own parameter check (`validation`)
//! 4. **Execute**: run the handler inside a [`Scope`](super::scope::Scope),
//!    committing only on success (`execution`)
//! 5. **Record**: append the result to the replay session, if any
//!
//! A failed rollback is attached as a separate `rollback` warning.
//!
//! # Invariants
//!
//! - Every attempted operation yields exactly one [`ExecutionResult`]
//! - A failure on one operation never prevents the next from running
//! - Replay problems are logged and never change an execution result
//!
//! # Example
//!
//! ```
//! use textcad::core::operation::{Action, Operation, Parameters};
//! use textcad::engine::exec::Executor;
//! use textcad::handlers::builtin::reference_registry;
//! use textcad::handlers::memory::MemoryDocument;
//!
//! let registry = reference_registry();
//! let executor = Executor::new(&registry);
//! let mut doc = MemoryDocument::new();
//!
//! let plate = Operation::new(
//!     Action::CreateFeature,
//!     Parameters { shape: Some("plate".into()), ..Parameters::default() },
//! );
//! let result = executor.execute_operation(&mut doc, &plate, 0);
//! assert!(result.success);
//! assert_eq!(result.feature_id.as_deref(), Some("F1"));
//! ```

use serde::Serialize;
use tracing::{debug, info, warn};

use super::gate::{gate, GateResult};
use super::rollback::RollbackResult;
use super::router::{route, Route};
use super::scope::scoped_execute;
use crate::core::operation::Operation;
use crate::core::outcome::{ExecutionResult, FailureKind};
use crate::handlers::{Document, HandlerOutcome, HandlerRegistry};
use crate::parse::plan::describe;
use crate::parse::ResolvedBatch;
use crate::replay::{PendingEntry, SessionManager};

/// One line of a batch report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub index: usize,
    pub description: String,
    pub result: ExecutionResult,
}

/// Per-operation results for one batch, in batch order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub entries: Vec<ReportEntry>,
}

impl BatchReport {
    /// True only if every operation succeeded. An empty batch has nothing
    /// to fail and counts as success.
    pub fn all_succeeded(&self) -> bool {
        self.entries.iter().all(|e| e.result.success)
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.result.success).count()
    }

    pub fn results(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.entries.iter().map(|e| &e.result)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Drives operations through gate, router, scope and handler.
pub struct Executor<'r, D: Document> {
    registry: &'r HandlerRegistry<D>,
    replay: Option<&'r SessionManager>,
}

impl<'r, D: Document> Executor<'r, D> {
    /// An executor that records nothing.
    pub fn new(registry: &'r HandlerRegistry<D>) -> Self {
        Self {
            registry,
            replay: None,
        }
    }

    /// Record every attempted operation in `replay`.
    pub fn with_replay(mut self, replay: &'r SessionManager) -> Self {
        self.replay = Some(replay);
        self
    }

    /// Run one operation. `index` only labels the scope and log lines.
    pub fn execute_operation(
        &self,
        document: &mut D,
        op: &Operation,
        index: usize,
    ) -> ExecutionResult {
        if let GateResult::Rejected(failure) = gate(op) {
            debug!(index, %failure, "operation rejected by gate");
            return ExecutionResult::failed(FailureKind::Validation, failure.to_string());
        }

        let kind = match route(op) {
            Route::Handler(kind) => kind,
            Route::Unhandled => {
                info!(index, action = %op.action(), "operation unhandled; skipping");
                return ExecutionResult::failed(
                    FailureKind::Routing,
                    format!("unhandled operation '{}'", op.action()),
                );
            }
        };

        let Some(handler) = self.registry.get(kind) else {
            info!(index, %kind, "no handler installed; skipping");
            return ExecutionResult::failed(
                FailureKind::Routing,
                format!("no handler installed for '{}'", kind),
            );
        };

        if let Err(reason) = handler.validate(op.parameters()) {
            debug!(index, %kind, %reason, "handler rejected parameters");
            return ExecutionResult::failed(FailureKind::Validation, reason);
        }

        let label = format!("{} #{}", kind, index + 1);
        let outcome = scoped_execute(&label, document, |scope| {
            let outcome = handler.execute(scope.document(), op.parameters());
            if outcome.is_success() {
                scope.commit();
            }
            outcome
        });

        let mut result = match outcome.value() {
            HandlerOutcome::Success { feature_id } => {
                debug!(%label, %feature_id, "operation executed");
                ExecutionResult::succeeded(feature_id.clone())
            }
            HandlerOutcome::Failure { error } => {
                info!(%label, %error, "handler failed");
                ExecutionResult::failed(FailureKind::Execution, error.clone())
            }
        };
        if let RollbackResult::Failed(error) = outcome.rollback() {
            warn!(%label, %error, "rollback failure after handler error");
            result = result.with_warning(FailureKind::Rollback, error.to_string());
        }
        result
    }

    /// Run every operation of `batch` in order and record each attempt.
    pub fn execute_batch(&self, document: &mut D, batch: &ResolvedBatch) -> BatchReport {
        let count = batch.len();
        let mut report = BatchReport::default();

        for (index, item) in batch.items().iter().enumerate() {
            let result = self.execute_operation(document, &item.operation, index);

            if let Some(replay) = self.replay {
                let pending = PendingEntry {
                    source_instruction: batch.instruction().to_string(),
                    source: item.source,
                    operation_index: index,
                    operation_count: count,
                    operation: item.operation.clone(),
                    result: result.clone(),
                };
                if let Err(error) = replay.append(pending) {
                    warn!(%error, index, "failed to record replay entry");
                }
            }

            report.entries.push(ReportEntry {
                index,
                description: describe(&item.operation),
                result,
            });
        }

        info!(
            operations = count,
            succeeded = report.succeeded(),
            "batch executed"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operation::{Action, Parameters};
    use crate::handlers::builtin::reference_registry;
    use crate::handlers::memory::MemoryDocument;
    use crate::handlers::{CapabilityHandler, HandlerKind};
    use crate::parse::assist::StaticSettings;
    use crate::parse::Normalizer;

    fn batch(text: &str) -> ResolvedBatch {
        let normalizer = Normalizer::new(Box::new(StaticSettings::disabled()), None);
        tokio_test::block_on(normalizer.resolve_batch(text, false))
    }

    struct Failing;

    impl CapabilityHandler<MemoryDocument> for Failing {
        fn kind(&self) -> HandlerKind {
            HandlerKind::Plate
        }

        fn validate(&self, _: &Parameters) -> Result<(), String> {
            Ok(())
        }

        fn execute(&self, doc: &mut MemoryDocument, _: &Parameters) -> HandlerOutcome {
            doc.add_feature("half-built", Vec::new());
            HandlerOutcome::Failure {
                error: "kernel refused".to_string(),
            }
        }
    }

    mod single {
        use super::*;

        #[test]
        fn gate_rejects_before_any_mutation() {
            let registry = reference_registry();
            let executor = Executor::new(&registry);
            let mut doc = MemoryDocument::new();
            let op = Operation::new(
                Action::CreateFeature,
                Parameters {
                    shape: Some("plate".to_string()),
                    length_mm: Some(-10.0),
                    ..Parameters::default()
                },
            );

            let result = executor.execute_operation(&mut doc, &op, 0);
            assert_eq!(result.error_kind(), Some(FailureKind::Validation));
            assert!(doc.features().is_empty());
            assert_eq!(doc.rollback_calls(), 0);
        }

        #[test]
        fn unknown_is_a_routing_failure() {
            let registry = reference_registry();
            let executor = Executor::new(&registry);
            let mut doc = MemoryDocument::new();

            let result = executor.execute_operation(&mut doc, &Operation::unknown(), 0);
            assert_eq!(result.error_kind(), Some(FailureKind::Routing));
        }

        #[test]
        fn missing_handler_is_a_routing_failure() {
            let registry = HandlerRegistry::<MemoryDocument>::new();
            let executor = Executor::new(&registry);
            let mut doc = MemoryDocument::new();
            let op = Operation::new(Action::CreateHole, Parameters::default());

            let result = executor.execute_operation(&mut doc, &op, 0);
            assert_eq!(result.error_kind(), Some(FailureKind::Routing));
        }

        #[test]
        fn handler_failure_rolls_back() {
            let registry = HandlerRegistry::new().with(Box::new(Failing));
            let executor = Executor::new(&registry);
            let mut doc = MemoryDocument::new();
            let op = Operation::new(
                Action::CreateFeature,
                Parameters {
                    shape: Some("plate".to_string()),
                    ..Parameters::default()
                },
            );

            let result = executor.execute_operation(&mut doc, &op, 0);
            assert_eq!(result.error_kind(), Some(FailureKind::Execution));
            assert_eq!(result.error.unwrap().message, "kernel refused");
            assert!(result.warnings.is_empty());
            assert!(doc.features().is_empty());
        }

        #[test]
        fn rollback_failure_is_a_separate_warning() {
            let registry = HandlerRegistry::new().with(Box::new(Failing));
            let executor = Executor::new(&registry);
            let mut doc = MemoryDocument::new();
            doc.set_fail_rollback(true);
            let op = Operation::new(
                Action::CreateFeature,
                Parameters {
                    shape: Some("block".to_string()),
                    ..Parameters::default()
                },
            );

            let result = executor.execute_operation(&mut doc, &op, 0);
            assert_eq!(result.error_kind(), Some(FailureKind::Execution));
            assert_eq!(result.warnings.len(), 1);
            assert_eq!(result.warnings[0].kind, FailureKind::Rollback);
        }

        #[test]
        fn handler_validation_failure_skips_execution() {
            let registry = reference_registry();
            let executor = Executor::new(&registry);
            let mut doc = MemoryDocument::new();
            let op = Operation::new(Action::Fillet, Parameters::default());

            let result = executor.execute_operation(&mut doc, &op, 0);
            assert_eq!(result.error_kind(), Some(FailureKind::Validation));
            assert_eq!(doc.rollback_calls(), 0);
        }
    }

    mod batches {
        use super::*;

        #[test]
        fn plate_then_holes() {
            let registry = reference_registry();
            let executor = Executor::new(&registry);
            let mut doc = MemoryDocument::new();
            let batch = batch(
                "create base plate 120x80x6 mm and add 4 holes diameter 6mm in a circular pattern",
            );

            let report = executor.execute_batch(&mut doc, &batch);
            assert_eq!(report.len(), 2);
            assert!(report.all_succeeded());
            assert_eq!(doc.features().len(), 2);
            assert_eq!(doc.checkpoints().len(), 2);
        }

        #[test]
        fn failure_does_not_stop_the_batch() {
            let registry = reference_registry();
            let executor = Executor::new(&registry);
            let mut doc = MemoryDocument::new();
            // The hole has no body to cut; the plate after it still runs.
            let batch = batch("drill a 5mm hole\ncreate a plate 50x40x5 mm");

            let report = executor.execute_batch(&mut doc, &batch);
            let successes: Vec<bool> = report.results().map(|r| r.success).collect();
            assert_eq!(successes, vec![false, true]);
            assert!(!report.all_succeeded());
        }

        #[test]
        fn every_attempt_is_recorded() {
            let dir = tempfile::tempdir().unwrap();
            let manager = SessionManager::new(dir.path(), true);
            let registry = reference_registry();
            let executor = Executor::new(&registry).with_replay(&manager);
            let mut doc = MemoryDocument::new();
            let batch = batch("create a plate 50x40x5 mm; wiggle it; fillet the edges 2mm");

            let report = executor.execute_batch(&mut doc, &batch);
            assert_eq!(report.len(), 3);

            let summary = manager.end_session().unwrap().unwrap();
            assert_eq!(summary.entries, 3);
            let log = crate::replay::load_log(&summary.log_path).unwrap();
            let indices: Vec<usize> = log.entries.iter().map(|e| e.operation_index).collect();
            assert_eq!(indices, vec![0, 1, 2]);
            assert!(log.entries.iter().all(|e| e.operation_count == 3));
            assert_eq!(
                log.entries[1].result.error_kind(),
                Some(FailureKind::Routing)
            );
        }
    }
}

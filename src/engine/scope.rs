//! engine::scope
//!
//! Transactional scope around one handler invocation.
//!
//! # Architecture
//!
//! A [`Scope`] borrows the document mutably for its whole life. It ends in
//! one of two ways:
//!
//! - [`Scope::commit`] records a checkpoint; it becomes the new "last
//!   checkpoint" and no rollback will ever run for this scope
//! - [`Scope::dispose`] (or dropping the scope) without a commit calls the
//!   document's best-effort rollback exactly once
//!
//! Both are idempotent. Committing after disposal, disposing after commit,
//! or calling either twice is a no-op and never panics.
//!
//! # Guarantee
//!
//! Weak by construction: the document reverts to its last checkpoint, not
//! to the exact state before this scope opened. A failed rollback is never
//! swallowed; it comes back as [`RollbackResult::Failed`].
//!
//! # Example
//!
//! ```
//! use textcad::engine::scope::scoped_execute;
//! use textcad::handlers::memory::MemoryDocument;
//!
//! let mut doc = MemoryDocument::new();
//! let outcome = scoped_execute("plate", &mut doc, |scope| {
//!     scope.document().add_feature("plate", Vec::new());
//!     // no commit: the feature is rolled back
//! });
//! assert!(!outcome.committed());
//! assert!(doc.features().is_empty());
//! ```

use tracing::debug;

use super::rollback::{attempt_rollback, RollbackResult};
use crate::handlers::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Committed,
    Disposed,
}

/// Guard around a document mutation.
pub struct Scope<'d, D: Document> {
    label: String,
    document: &'d mut D,
    state: State,
    rollback: RollbackResult,
}

impl<'d, D: Document> Scope<'d, D> {
    /// Open a scope over `document`.
    pub fn begin(label: impl Into<String>, document: &'d mut D) -> Self {
        Self {
            label: label.into(),
            document,
            state: State::Open,
            rollback: RollbackResult::NotNeeded,
        }
    }

    /// The protected document.
    pub fn document(&mut self) -> &mut D {
        self.document
    }

    pub fn is_committed(&self) -> bool {
        self.state == State::Committed
    }

    /// Keep the mutation and checkpoint it.
    pub fn commit(&mut self) {
        if self.state != State::Open {
            return;
        }
        self.state = State::Committed;
        if !self.document.checkpoint(&self.label) {
            debug!(label = %self.label, "document declined checkpoint");
        }
        debug!(label = %self.label, "scope committed");
    }

    /// Close the scope, rolling back unless committed.
    pub fn dispose(&mut self) -> RollbackResult {
        if self.state == State::Open {
            self.state = State::Disposed;
            self.rollback = attempt_rollback(self.document, &self.label);
        }
        self.rollback.clone()
    }
}

impl<D: Document> Drop for Scope<'_, D> {
    fn drop(&mut self) {
        if self.state == State::Open {
            self.dispose();
        }
    }
}

/// What a scoped body produced and how the scope ended.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeOutcome<T> {
    value: T,
    committed: bool,
    rollback: RollbackResult,
}

impl<T> ScopeOutcome<T> {
    /// True when the body committed the scope.
    pub fn committed(&self) -> bool {
        self.committed
    }

    pub fn rollback(&self) -> &RollbackResult {
        &self.rollback
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Run `body` inside a scope and dispose it afterwards.
///
/// The body decides the fate of the mutation by calling
/// [`Scope::commit`]; anything else, including an early return, rolls back.
pub fn scoped_execute<D, T, F>(label: &str, document: &mut D, body: F) -> ScopeOutcome<T>
where
    D: Document,
    F: FnOnce(&mut Scope<'_, D>) -> T,
{
    let mut scope = Scope::begin(label, document);
    let value = body(&mut scope);
    let committed = scope.is_committed();
    let rollback = scope.dispose();
    ScopeOutcome {
        value,
        committed,
        rollback,
    }
}

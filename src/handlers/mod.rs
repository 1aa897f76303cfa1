//! handlers
//!
//! Capability handlers and the opaque document they mutate.
//!
//! # Architecture
//!
//! A [`Document`] is the live modeling target. It offers only two
//! primitives to the core: record a checkpoint, and a best-effort rollback
//! to the last one. Everything else about it is owned by handlers.
//!
//! A [`CapabilityHandler`] performs one class of mutation. The router
//! selects handlers by [`HandlerKind`]; the [`HandlerRegistry`] maps each
//! kind to at most one installed handler.
//!
//! # Modules
//!
//! - [`memory`] - In-memory reference document
//! - [`builtin`] - Reference handlers for the in-memory document

pub mod builtin;
pub mod memory;

use std::collections::BTreeMap;

use crate::core::operation::Parameters;

/// The opaque mutation target.
pub trait Document {
    /// Revert to the last checkpoint. Returns `false` if that failed.
    ///
    /// The guarantee is weak: state goes back to the last checkpoint, which
    /// may be older than the start of the protected operation.
    fn best_effort_rollback(&mut self) -> bool;

    /// Record the current state as the new last checkpoint.
    fn checkpoint(&mut self, label: &str) -> bool;
}

/// Closed set of handler families the router can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandlerKind {
    Fillet,
    Plate,
    Cylinder,
    Hole,
    Chamfer,
}

impl HandlerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerKind::Fillet => "fillet",
            HandlerKind::Plate => "plate",
            HandlerKind::Cylinder => "cylinder",
            HandlerKind::Hole => "hole",
            HandlerKind::Chamfer => "chamfer",
        }
    }
}

impl std::fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one handler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    Success { feature_id: String },
    Failure { error: String },
}

impl HandlerOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, HandlerOutcome::Success { .. })
    }
}

/// Executor for one class of mutation.
pub trait CapabilityHandler<D: Document> {
    /// The family this handler serves.
    fn kind(&self) -> HandlerKind;

    /// Check parameters before any mutation.
    fn validate(&self, params: &Parameters) -> Result<(), String>;

    /// Perform the mutation.
    fn execute(&self, document: &mut D, params: &Parameters) -> HandlerOutcome;
}

/// Installed handlers, one per kind.
pub struct HandlerRegistry<D: Document> {
    handlers: BTreeMap<HandlerKind, Box<dyn CapabilityHandler<D>>>,
}

impl<D: Document> HandlerRegistry<D> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Install a handler, replacing any previous one of the same kind.
    pub fn register(&mut self, handler: Box<dyn CapabilityHandler<D>>) {
        self.handlers.insert(handler.kind(), handler);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, handler: Box<dyn CapabilityHandler<D>>) -> Self {
        self.register(handler);
        self
    }

    pub fn get(&self, kind: HandlerKind) -> Option<&dyn CapabilityHandler<D>> {
        self.handlers.get(&kind).map(|h| h.as_ref())
    }

    /// Kinds with an installed handler.
    pub fn kinds(&self) -> Vec<HandlerKind> {
        self.handlers.keys().copied().collect()
    }
}

impl<D: Document> Default for HandlerRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

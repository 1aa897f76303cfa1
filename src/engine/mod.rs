//! engine
//!
//! Validates, routes and executes canonical operations.
//!
//! # Architecture
//!
//! Every operation follows the same path:
//!
//! ```text
//! Gate -> Route -> Handler validate -> Scope { Handler execute } -> Result -> Replay
//! ```
//!
//! - [`gate`] rejects out-of-range parameters with zero side effects
//! - [`router`] maps an operation to a [`HandlerKind`](crate::handlers::HandlerKind)
//!   through an ordered predicate table
//! - [`scope`] wraps the mutation and rolls back unless committed
//! - [`rollback`] types the document's best-effort rollback
//! - [`exec`] drives the path for each operation of a batch, in order
//!
//! # Invariants
//!
//! - Batch execution order equals batch construction order
//! - One failed operation never stops the rest of its batch
//! - The engine never sees raw text; it consumes only canonical operations

pub mod exec;
pub mod gate;
pub mod rollback;
pub mod router;
pub mod scope;

pub use exec::{BatchReport, Executor, ReportEntry};
pub use gate::{gate, GateResult, ValidationFailure, Violation};
pub use rollback::{RollbackError, RollbackResult};
pub use router::{route, Route};
pub use scope::{scoped_execute, Scope, ScopeOutcome};

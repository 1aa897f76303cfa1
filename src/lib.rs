//! textcad - Deterministic execution of natural-language CAD instructions
//!
//! textcad turns ambiguous instructions such as "create base plate 120x80x6
//! mm and add 4 holes diameter 6mm in a circular pattern" into an ordered
//! batch of canonical operations, executes each one against a stateful
//! document inside a rollback scope, and records every attempt in an
//! append-only, sequenced replay log.
//!
//! # Architecture
//!
//! The codebase is layered, leaves first:
//!
//! - [`core`] - Canonical operation schema, results, configuration, paths
//! - [`handlers`] - The document seam, capability handlers, reference document
//! - [`engine`] - Validation gate, ordered router, transactional scope, executor
//! - [`parse`] - Instruction splitting, assisted and rule-based resolution
//! - [`replay`] - Session lifecycle, replay log writing, loading and replaying
//! - [`cli`] - The `tcad` command-line interface
//! - [`logging`] - Subscriber setup for the binary
//!
//! # Correctness Invariants
//!
//! 1. A canonical operation never has a partial field set
//! 2. Batch execution order equals batch construction order
//! 3. At most one writer advances a session's sequence counter at a time
//! 4. Every attempted operation is recorded unless logging is disabled or
//!    paused

pub mod cli;
pub mod core;
pub mod engine;
pub mod handlers;
pub mod logging;
pub mod parse;
pub mod replay;

//! core
//!
//! Core domain types, schemas, and configuration for textcad.
//!
//! # Modules
//!
//! - [`types`] - Strong types: SessionId, UtcTimestamp, Source
//! - [`operation`] - The canonical Operation schema
//! - [`outcome`] - Per-operation execution results
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for textcad storage
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Every canonical key is always present

pub mod config;
pub mod operation;
pub mod outcome;
pub mod paths;
pub mod types;

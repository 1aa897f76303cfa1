//! replay::entry
//!
//! The record written for every attempted operation.

use serde::{Deserialize, Serialize};

use crate::core::operation::Operation;
use crate::core::outcome::ExecutionResult;
use crate::core::types::{SessionId, Source, UtcTimestamp, SCHEMA_VERSION};

/// One line of a session log.
///
/// `sequence` starts at 1 and is gapless within a session. The operation
/// index is 0-based within the batch it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayEntry {
    pub schema_version: String,
    pub session_id: SessionId,
    pub sequence: u64,
    pub timestamp: UtcTimestamp,
    pub source_instruction: String,
    pub source: Source,
    pub operation_index: usize,
    pub operation_count: usize,
    pub operation: Operation,
    pub result: ExecutionResult,
}

impl ReplayEntry {
    /// Stamp a pending entry with its session coordinates.
    pub fn stamp(pending: PendingEntry, session_id: SessionId, sequence: u64) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            session_id,
            sequence,
            timestamp: UtcTimestamp::now(),
            source_instruction: pending.source_instruction,
            source: pending.source,
            operation_index: pending.operation_index,
            operation_count: pending.operation_count,
            operation: pending.operation,
            result: pending.result,
        }
    }
}

/// Everything the caller knows about an attempt, before the session
/// manager assigns id, sequence and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEntry {
    pub source_instruction: String,
    pub source: Source,
    pub operation_index: usize,
    pub operation_count: usize,
    pub operation: Operation,
    pub result: ExecutionResult,
}

//! replay
//!
//! Session-scoped, append-only audit log of every attempted operation.
//!
//! # Architecture
//!
//! A [`SessionManager`] owns at most one active session. Each session writes
//! to its own `<replay_dir>/<session_id>.jsonl`, one [`ReplayEntry`] per
//! line, with gapless sequence numbers starting at 1.
//!
//! Reading is tolerant: [`loader::load_log`] skips lines it cannot use and
//! reports them, so a single corrupted line never hides the rest of a log.
//! [`replayer::replay`] re-executes a loaded log through the executor.
//!
//! # Modules
//!
//! - [`entry`] - The on-disk record
//! - [`writer`] - Locked append-only log file
//! - [`session`] - Session lifecycle and sequencing
//! - [`loader`] - Tolerant log reader and session listing
//! - [`replayer`] - Re-execution of a loaded log

pub mod entry;
pub mod loader;
pub mod replayer;
pub mod session;
pub mod writer;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use entry::{PendingEntry, ReplayEntry};
pub use loader::{list_sessions, load_log, LoadedLog, SessionLog, SkippedLine};
pub use session::{SessionManager, SessionStatus, SessionSummary};

/// Invalid session state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no replay session is active")]
    NotActive,

    #[error("replay session is already paused")]
    AlreadyPaused,

    #[error("replay session is not paused")]
    NotPaused,

    #[error("replay logging is disabled")]
    Disabled,
}

/// Errors from replay logging and loading.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Filesystem failure on a log path.
    #[error("replay i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize replay entry: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Another process holds the log's lock.
    #[error("replay log {} is locked by another process", .path.display())]
    Locked { path: PathBuf },

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ReplayError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        ReplayError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

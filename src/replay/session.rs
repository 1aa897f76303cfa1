//! replay::session
//!
//! Session lifecycle and sequenced appends.
//!
//! # State machine
//!
//! ```text
//! Idle --begin/append--> Active <--pause/resume--> Paused
//!   ^                      |                          |
//!   +-------- end ---------+------------ end ---------+
//! ```
//!
//! # Invariants
//!
//! - All session state sits behind one mutex; sequence assignment and the
//!   file write happen under it, so concurrent appends never share or skip
//!   a number
//! - The sequence advances only after the entry is on disk
//! - A disabled manager never touches the filesystem

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use tracing::{info, warn};

use super::entry::{PendingEntry, ReplayEntry};
use super::writer::LogWriter;
use super::{ReplayError, SessionError};
use crate::core::config::Config;
use crate::core::paths;
use crate::core::types::{SessionId, UtcTimestamp};

struct ActiveSession {
    id: SessionId,
    sequence: u64,
    paused: bool,
    started_at: UtcTimestamp,
    writer: LogWriter,
}

/// Snapshot of the manager's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStatus {
    Disabled,
    Idle,
    Active {
        session_id: SessionId,
        entries: u64,
        log_path: PathBuf,
    },
    Paused {
        session_id: SessionId,
        entries: u64,
        log_path: PathBuf,
    },
}

/// What a session wrote, returned when it ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub entries: u64,
    pub log_path: PathBuf,
    pub started_at: UtcTimestamp,
    pub ended_at: UtcTimestamp,
}

/// Owns the current replay session, if any.
///
/// `SessionManager` is `Sync`; share it across threads with `Arc`.
pub struct SessionManager {
    enabled: bool,
    dir: PathBuf,
    state: Mutex<Option<ActiveSession>>,
}

impl SessionManager {
    pub fn new(dir: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            enabled,
            dir: dir.into(),
            state: Mutex::new(None),
        }
    }

    /// A manager using the configured directory and enable flag.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.replay_dir(), config.replay_enabled())
    }

    /// A manager that records nothing.
    pub fn disabled() -> Self {
        Self::new(PathBuf::new(), false)
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        // A panic mid-append leaves at worst an unsynced line; keep going.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn open(&self) -> Result<ActiveSession, ReplayError> {
        let id = SessionId::new();
        let path = paths::session_log_path(&self.dir, id.as_str());
        let writer = LogWriter::create(&path)?;
        info!(session_id = %id, path = %path.display(), "replay session started");
        Ok(ActiveSession {
            id,
            sequence: 0,
            paused: false,
            started_at: UtcTimestamp::now(),
            writer,
        })
    }

    fn close(session: ActiveSession) -> Result<SessionSummary, ReplayError> {
        let summary = SessionSummary {
            session_id: session.id,
            entries: session.sequence,
            log_path: session.writer.path().to_path_buf(),
            started_at: session.started_at,
            ended_at: UtcTimestamp::now(),
        };
        session.writer.close()?;
        info!(
            session_id = %summary.session_id,
            entries = summary.entries,
            "replay session ended"
        );
        Ok(summary)
    }

    /// End any current session and start a new one.
    pub fn begin_session(&self) -> Result<SessionId, ReplayError> {
        if !self.enabled {
            return Err(SessionError::Disabled.into());
        }
        let mut state = self.lock();
        if let Some(previous) = state.take() {
            Self::close(previous)?;
        }
        let session = self.open()?;
        let id = session.id.clone();
        *state = Some(session);
        Ok(id)
    }

    /// Record one attempted operation.
    ///
    /// Returns `Ok(None)` without writing when logging is disabled, the
    /// session is paused, or no session exists and none could be started.
    pub fn append(&self, pending: PendingEntry) -> Result<Option<ReplayEntry>, ReplayError> {
        if !self.enabled {
            return Ok(None);
        }
        let mut state = self.lock();

        if state.is_none() {
            match self.open() {
                Ok(session) => *state = Some(session),
                Err(error) => {
                    warn!(%error, "could not start replay session; entry not recorded");
                    return Ok(None);
                }
            }
        }
        let Some(session) = state.as_mut() else {
            return Ok(None);
        };
        if session.paused {
            return Ok(None);
        }

        let entry = ReplayEntry::stamp(pending, session.id.clone(), session.sequence + 1);
        session.writer.write_entry(&entry)?;
        session.sequence = entry.sequence;
        Ok(Some(entry))
    }

    /// Stop recording without ending the session.
    pub fn pause(&self) -> Result<(), SessionError> {
        if !self.enabled {
            return Err(SessionError::Disabled);
        }
        let mut state = self.lock();
        match state.as_mut() {
            None => Err(SessionError::NotActive),
            Some(s) if s.paused => Err(SessionError::AlreadyPaused),
            Some(s) => {
                s.paused = true;
                Ok(())
            }
        }
    }

    pub fn resume(&self) -> Result<(), SessionError> {
        if !self.enabled {
            return Err(SessionError::Disabled);
        }
        let mut state = self.lock();
        match state.as_mut() {
            None => Err(SessionError::NotActive),
            Some(s) if !s.paused => Err(SessionError::NotPaused),
            Some(s) => {
                s.paused = false;
                Ok(())
            }
        }
    }

    /// Flush, unlock and forget the current session.
    ///
    /// Returns `None` when there was no session.
    pub fn end_session(&self) -> Result<Option<SessionSummary>, ReplayError> {
        let mut state = self.lock();
        match state.take() {
            Some(session) => Self::close(session).map(Some),
            None => Ok(None),
        }
    }

    pub fn status(&self) -> SessionStatus {
        if !self.enabled {
            return SessionStatus::Disabled;
        }
        let state = self.lock();
        match state.as_ref() {
            None => SessionStatus::Idle,
            Some(s) => {
                let session_id = s.id.clone();
                let entries = s.sequence;
                let log_path = s.writer.path().to_path_buf();
                if s.paused {
                    SessionStatus::Paused {
                        session_id,
                        entries,
                        log_path,
                    }
                } else {
                    SessionStatus::Active {
                        session_id,
                        entries,
                        log_path,
                    }
                }
            }
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(session) = state.take() {
            if let Err(error) = Self::close(session) {
                warn!(%error, "failed to close replay session");
            }
        }
    }
}

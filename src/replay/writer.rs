//! replay::writer
//!
//! Append-only, exclusively locked session log file.
//!
//! # Invariants
//!
//! - The file is created fresh (`create_new`); an existing log is never
//!   reopened for writing
//! - An OS-level exclusive lock (`fs2`) is held for the writer's lifetime
//!   and released on drop
//! - Every entry is one JSON line, flushed and synced before `write_entry`
//!   returns

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::entry::ReplayEntry;
use super::ReplayError;

/// Open handle on one session log.
#[derive(Debug)]
pub struct LogWriter {
    path: PathBuf,
    file: Option<File>,
}

impl LogWriter {
    /// Create `path` and take an exclusive lock on it.
    ///
    /// # Errors
    ///
    /// - [`ReplayError::Io`] if the directory or file cannot be created
    /// - [`ReplayError::Locked`] if another process holds the lock
    pub fn create(path: &Path) -> Result<Self, ReplayError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| ReplayError::io(dir, e))?;
        }

        let file = OpenOptions::new()
            .append(true)
            .create_new(true)
            .open(path)
            .map_err(|e| ReplayError::io(path, e))?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path: path.to_path_buf(),
                file: Some(file),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(ReplayError::Locked {
                path: path.to_path_buf(),
            }),
            Err(e) => Err(ReplayError::io(path, e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry as a JSON line and sync it to disk.
    pub fn write_entry(&mut self, entry: &ReplayEntry) -> Result<(), ReplayError> {
        let Some(file) = self.file.as_mut() else {
            return Err(ReplayError::io(
                &self.path,
                std::io::Error::other("log writer already closed"),
            ));
        };

        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        file.write_all(line.as_bytes())
            .map_err(|e| ReplayError::io(&self.path, e))?;
        file.flush().map_err(|e| ReplayError::io(&self.path, e))?;
        file.sync_all().map_err(|e| ReplayError::io(&self.path, e))?;
        Ok(())
    }

    /// Sync and release the lock.
    pub fn close(mut self) -> Result<(), ReplayError> {
        if let Some(file) = self.file.take() {
            file.sync_all().map_err(|e| ReplayError::io(&self.path, e))?;
            file.unlock().map_err(|e| ReplayError::io(&self.path, e))?;
        }
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operation::Operation;
    use crate::core::outcome::ExecutionResult;
    use crate::core::types::{SessionId, Source};
    use crate::replay::entry::PendingEntry;

    fn entry(sequence: u64) -> ReplayEntry {
        ReplayEntry::stamp(
            PendingEntry {
                source_instruction: "make a plate".to_string(),
                source: Source::Deterministic,
                operation_index: 0,
                operation_count: 1,
                operation: Operation::unknown(),
                result: ExecutionResult::succeeded("F1"),
            },
            SessionId::from_string("abc"),
            sequence,
        )
    }

    #[test]
    fn writes_one_line_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("abc.jsonl");

        let mut writer = LogWriter::create(&path).unwrap();
        writer.write_entry(&entry(1)).unwrap();
        writer.write_entry(&entry(2)).unwrap();
        writer.close().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(content.ends_with('\n'));
        let second: ReplayEntry = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.sequence, 2);
    }

    #[test]
    fn refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.jsonl");
        fs::write(&path, "").unwrap();

        let err = LogWriter::create(&path).unwrap_err();
        assert!(matches!(err, ReplayError::Io { .. }));
    }
}

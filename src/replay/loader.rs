//! replay::loader
//!
//! Tolerant session log reader.
//!
//! Lines are read as raw bytes. A line is skipped, with its 1-based number
//! and a reason, when it is not UTF-8, not JSON, not a replay entry, or
//! carries a schema version other than the current one. Blank lines are
//! skipped silently. Only failing to open the file is an error.
//!
//! # Example
//!
//! ```no_run
//! use textcad::replay::loader::load_log;
//!
//! let log = load_log("session.jsonl".as_ref())?;
//! for skipped in &log.skipped {
//!     eprintln!("line {}: {}", skipped.line_no, skipped.reason);
//! }
//! println!("{} entries", log.entries.len());
//! # Ok::<(), textcad::replay::ReplayError>(())
//! ```

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use super::entry::ReplayEntry;
use super::ReplayError;
use crate::core::paths;
use crate::core::types::SCHEMA_VERSION;

/// A line the loader could not use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    pub line_no: usize,
    pub reason: String,
}

/// Entries in file order plus everything skipped.
#[derive(Debug, Clone, Default)]
pub struct LoadedLog {
    pub entries: Vec<ReplayEntry>,
    pub skipped: Vec<SkippedLine>,
}

fn parse_line(bytes: &[u8]) -> Result<Option<ReplayEntry>, String> {
    let text = std::str::from_utf8(bytes).map_err(|e| format!("invalid UTF-8: {}", e))?;
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| format!("invalid JSON: {}", e))?;
    match value.get("schema_version").and_then(|v| v.as_str()) {
        Some(SCHEMA_VERSION) => {}
        Some(other) => return Err(format!("unsupported schema version '{}'", other)),
        None => return Err("missing schema_version".to_string()),
    }

    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| format!("invalid entry: {}", e))
}

/// Read every usable entry from `path`.
pub fn load_log(path: &Path) -> Result<LoadedLog, ReplayError> {
    let file = File::open(path).map_err(|e| ReplayError::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut log = LoadedLog::default();
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                line_no += 1;
                log.skipped.push(SkippedLine {
                    line_no,
                    reason: format!("read error: {}", e),
                });
                break;
            }
        }
        line_no += 1;

        match parse_line(&buf) {
            Ok(Some(entry)) => log.entries.push(entry),
            Ok(None) => {}
            Err(reason) => {
                debug!(line_no, %reason, "skipping replay line");
                log.skipped.push(SkippedLine { line_no, reason });
            }
        }
    }

    Ok(log)
}

/// A session log found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionLog {
    pub session_id: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Session logs in `dir`, newest first. A missing directory is empty.
pub fn list_sessions(dir: &Path) -> Result<Vec<SessionLog>, ReplayError> {
    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ReplayError::io(dir, e)),
    };

    let mut found = Vec::new();
    for item in read {
        let item = item.map_err(|e| ReplayError::io(dir, e))?;
        let path = item.path();
        if !paths::is_session_log(&path) {
            continue;
        }
        let meta = item.metadata().map_err(|e| ReplayError::io(&path, e))?;
        let modified = meta.modified().ok();
        let session_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        found.push((
            modified,
            SessionLog {
                session_id,
                path,
                size_bytes: meta.len(),
            },
        ));
    }

    found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.path.cmp(&b.1.path)));
    Ok(found.into_iter().map(|(_, log)| log).collect())
}

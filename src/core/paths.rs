//! core::paths
//!
//! Centralized path routing for textcad storage locations.
//!
//! # Storage Layout
//!
//! User-scoped data lives under `~/.textcad/`:
//! - `config.toml` - Global configuration
//! - `replay/` - Replay logs, one `<session_id>.jsonl` per session
//!
//! Project-scoped data lives under `<project>/.textcad/`:
//! - `config.toml` - Project configuration overrides
//!
//! # Example
//!
//! ```
//! use textcad::core::paths;
//! use std::path::{Path, PathBuf};
//!
//! assert_eq!(
//!     paths::project_config_path(Path::new("/work")),
//!     PathBuf::from("/work/.textcad/config.toml")
//! );
//! assert_eq!(
//!     paths::session_log_path(Path::new("/logs"), "abc"),
//!     PathBuf::from("/logs/abc.jsonl")
//! );
//! ```

use std::path::{Path, PathBuf};

/// Name of the per-user and per-project data directory.
pub const DATA_DIR_NAME: &str = ".textcad";

/// Extension of replay log files.
pub const LOG_EXTENSION: &str = "jsonl";

/// `~/.textcad`, if a home directory is known.
pub fn home_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DATA_DIR_NAME))
}

/// `~/.textcad/config.toml`, if a home directory is known.
pub fn home_config_path() -> Option<PathBuf> {
    home_data_dir().map(|dir| dir.join("config.toml"))
}

/// `<project>/.textcad/config.toml`.
pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(DATA_DIR_NAME).join("config.toml")
}

/// Default replay directory.
///
/// `~/.textcad/replay`, or `.textcad/replay` relative to the working
/// directory when no home directory is known.
pub fn default_replay_dir() -> PathBuf {
    home_data_dir()
        .unwrap_or_else(|| PathBuf::from(DATA_DIR_NAME))
        .join("replay")
}

/// `<replay_dir>/<session_id>.jsonl`.
pub fn session_log_path(replay_dir: &Path, session_id: &str) -> PathBuf {
    replay_dir.join(format!("{}.{}", session_id, LOG_EXTENSION))
}

/// True when `path` has the replay log extension.
pub fn is_session_log(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(LOG_EXTENSION)
}

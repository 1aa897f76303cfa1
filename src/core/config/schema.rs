//! core::config::schema
//!
//! Configuration schema types.
//!
//! The same schema is used for the global file and the project file; the
//! project file only needs to set the keys it overrides.
//!
//! # Validation
//!
//! Values are validated after parsing (timeouts and token limits must be
//! positive, log levels must be known, URLs must be http(s)).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::ConfigError;

/// One configuration file.
///
/// # Example
///
/// ```toml
/// [assist]
/// enabled = true
/// model = "gpt-4o"
/// timeout_secs = 20
/// max_tokens = 500
///
/// [replay]
/// enabled = true
/// dir = "/home/me/.textcad/replay"
///
/// [log]
/// level = "info"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Assisted parsing settings
    pub assist: Option<AssistConfig>,

    /// Replay log settings
    pub replay: Option<ReplayConfig>,

    /// Logging settings
    pub log: Option<LogConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(assist) = &self.assist {
            assist.validate()?;
        }
        if let Some(log) = &self.log {
            log.validate()?;
        }
        Ok(())
    }

    /// Overlay `other` on top of `self`, field by field.
    pub fn merged_with(&self, other: &FileConfig) -> FileConfig {
        FileConfig {
            assist: merge_table(&self.assist, &other.assist, AssistConfig::merged_with),
            replay: merge_table(&self.replay, &other.replay, ReplayConfig::merged_with),
            log: merge_table(&self.log, &other.log, LogConfig::merged_with),
        }
    }
}

fn merge_table<T: Clone>(base: &Option<T>, over: &Option<T>, merge: fn(&T, &T) -> T) -> Option<T> {
    match (base, over) {
        (Some(b), Some(o)) => Some(merge(b, o)),
        (None, Some(o)) => Some(o.clone()),
        (b, None) => b.clone(),
    }
}

/// `[assist]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AssistConfig {
    /// Whether assisted parsing may be used at all
    pub enabled: Option<bool>,

    /// Chat model name
    pub model: Option<String>,

    /// Upper bound on one assisted call
    pub timeout_secs: Option<u64>,

    /// Completion token limit
    pub max_tokens: Option<u32>,

    /// Base URL of an OpenAI-compatible API
    pub base_url: Option<String>,
}

impl AssistConfig {
    /// Validate the assist table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "assist.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.max_tokens == Some(0) {
            return Err(ConfigError::InvalidValue(
                "assist.max_tokens must be greater than 0".to_string(),
            ));
        }
        if let Some(model) = &self.model {
            if model.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "assist.model cannot be empty".to_string(),
                ));
            }
        }
        if let Some(url) = &self.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue(format!(
                    "assist.base_url '{}' must start with http:// or https://",
                    url
                )));
            }
        }
        Ok(())
    }

    fn merged_with(&self, other: &AssistConfig) -> AssistConfig {
        AssistConfig {
            enabled: other.enabled.or(self.enabled),
            model: other.model.clone().or_else(|| self.model.clone()),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            max_tokens: other.max_tokens.or(self.max_tokens),
            base_url: other.base_url.clone().or_else(|| self.base_url.clone()),
        }
    }
}

/// `[replay]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReplayConfig {
    /// Global replay logging switch
    pub enabled: Option<bool>,

    /// Directory holding `<session_id>.jsonl` files
    pub dir: Option<PathBuf>,
}

impl ReplayConfig {
    fn merged_with(&self, other: &ReplayConfig) -> ReplayConfig {
        ReplayConfig {
            enabled: other.enabled.or(self.enabled),
            dir: other.dir.clone().or_else(|| self.dir.clone()),
        }
    }
}

/// `[log]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Default log level (error, warn, info, debug, trace)
    pub level: Option<String>,
}

impl LogConfig {
    /// Accepted log levels.
    pub const VALID_LEVELS: &'static [&'static str] = &["error", "warn", "info", "debug", "trace"];

    /// Validate the log table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(level) = &self.level {
            if !Self::VALID_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid log level '{}', must be one of: {}",
                    level,
                    Self::VALID_LEVELS.join(", ")
                )));
            }
        }
        Ok(())
    }

    fn merged_with(&self, other: &LogConfig) -> LogConfig {
        LogConfig {
            level: other.level.clone().or_else(|| self.level.clone()),
        }
    }
}

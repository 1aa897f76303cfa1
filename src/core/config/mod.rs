//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Project config file (`.textcad/config.toml` under the working directory)
//! 4. Environment variables (`USE_LLM`, `OPENAI_API_KEY`, `OPENAI_MODEL`,
//!    `OPENAI_TIMEOUT_S`, `OPENAI_MAX_TOKENS`, `OPENAI_BASE_URL`)
//! 5. CLI flags (not handled here)
//!
//! `LOG_LEVEL` is the one exception: it only applies when no config file
//! sets `log.level`.
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$TEXTCAD_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/textcad/config.toml`
//! 3. `~/.textcad/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use textcad::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("."))).unwrap();
//! let config = result.config;
//!
//! println!("Model: {}", config.model());
//! println!("Replay dir: {}", config.replay_dir().display());
//! ```

pub mod schema;

pub use schema::{AssistConfig, FileConfig, LogConfig, ReplayConfig};

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::core::paths;

/// Default chat model for the assisted stage.
pub const DEFAULT_MODEL: &str = "gpt-4o";
/// Default upper bound on one assisted call, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
/// Default completion token limit.
pub const DEFAULT_MAX_TOKENS: u32 = 500;
/// Default OpenAI-compatible API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("invalid environment variable {name}='{value}': {reason}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Values taken from the process environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverrides {
    pub use_llm: Option<bool>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_tokens: Option<u32>,
    pub base_url: Option<String>,
    pub log_level: Option<String>,
}

impl EnvOverrides {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read overrides through an arbitrary lookup function.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            use_llm: get("USE_LLM").map(|v| parse_flag(&v)),
            api_key: get("OPENAI_API_KEY"),
            model: get("OPENAI_MODEL"),
            timeout_secs: get("OPENAI_TIMEOUT_S")
                .map(|v| parse_positive("OPENAI_TIMEOUT_S", &v))
                .transpose()?,
            max_tokens: get("OPENAI_MAX_TOKENS")
                .map(|v| parse_positive("OPENAI_MAX_TOKENS", &v))
                .transpose()?,
            base_url: get("OPENAI_BASE_URL"),
            log_level: get("LOG_LEVEL").map(|v| v.to_ascii_lowercase()),
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

fn parse_positive<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    let parsed: T = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name,
        value: value.to_string(),
        reason: "not a positive integer".to_string(),
    })?;
    if parsed == T::default() {
        return Err(ConfigError::InvalidEnv {
            name,
            value: value.to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }
    Ok(parsed)
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
}

/// Merged configuration from all sources.
///
/// Accessor methods apply precedence and defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global file merged with the project file
    pub file: FileConfig,
    /// Environment overrides
    pub env: EnvOverrides,
    global_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations and the environment.
    ///
    /// If `project_dir` is provided, `.textcad/config.toml` under it is
    /// applied over the global file.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed, or if
    /// an environment override is malformed. Missing files are not an
    /// error.
    pub fn load(project_dir: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let (global, global_path) = Self::load_global()?;

        let (project, project_path) = match project_dir {
            Some(dir) => {
                let path = paths::project_config_path(dir);
                if path.exists() {
                    (Some(Self::read_file(&path)?), Some(path))
                } else {
                    (None, None)
                }
            }
            None => (None, None),
        };

        let env = EnvOverrides::from_env()?;

        let mut config = Self::from_parts(global, project, env)?;
        config.global_path = global_path;
        config.project_path = project_path;
        Ok(ConfigLoadResult { config })
    }

    /// Build a configuration from already-parsed sources.
    pub fn from_parts(
        global: FileConfig,
        project: Option<FileConfig>,
        env: EnvOverrides,
    ) -> Result<Self, ConfigError> {
        global.validate()?;
        if let Some(ref p) = project {
            p.validate()?;
        }

        let file = match project {
            Some(p) => global.merged_with(&p),
            None => global,
        };

        Ok(Self {
            file,
            env,
            global_path: None,
            project_path: None,
        })
    }

    fn load_global() -> Result<(FileConfig, Option<PathBuf>), ConfigError> {
        if let Ok(path) = std::env::var("TEXTCAD_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok((Self::read_file(&path)?, Some(path)));
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("textcad/config.toml");
            if path.exists() {
                return Ok((Self::read_file(&path)?, Some(path)));
            }
        }

        if let Some(path) = paths::home_config_path() {
            if path.exists() {
                return Ok((Self::read_file(&path)?, Some(path)));
            }
        }

        Ok((FileConfig::default(), None))
    }

    fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Whether assisted parsing is enabled.
    ///
    /// Defaults to `false` if not configured.
    pub fn assist_enabled(&self) -> bool {
        self.env
            .use_llm
            .or_else(|| self.file.assist.as_ref().and_then(|a| a.enabled))
            .unwrap_or(false)
    }

    /// The API key, from `OPENAI_API_KEY` only.
    pub fn api_key(&self) -> Option<&str> {
        self.env.api_key.as_deref()
    }

    /// The chat model name.
    ///
    /// Defaults to "gpt-4o".
    pub fn model(&self) -> &str {
        self.env
            .model
            .as_deref()
            .or_else(|| self.file.assist.as_ref().and_then(|a| a.model.as_deref()))
            .unwrap_or(DEFAULT_MODEL)
    }

    /// Upper bound on one assisted call.
    ///
    /// Defaults to 20 seconds.
    pub fn timeout(&self) -> Duration {
        let secs = self
            .env
            .timeout_secs
            .or_else(|| self.file.assist.as_ref().and_then(|a| a.timeout_secs))
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Completion token limit.
    ///
    /// Defaults to 500.
    pub fn max_tokens(&self) -> u32 {
        self.env
            .max_tokens
            .or_else(|| self.file.assist.as_ref().and_then(|a| a.max_tokens))
            .unwrap_or(DEFAULT_MAX_TOKENS)
    }

    /// Base URL of the chat-completions API, without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.env
            .base_url
            .as_deref()
            .or_else(|| self.file.assist.as_ref().and_then(|a| a.base_url.as_deref()))
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    /// Whether replay logging is enabled.
    ///
    /// Defaults to `true`.
    pub fn replay_enabled(&self) -> bool {
        self.file
            .replay
            .as_ref()
            .and_then(|r| r.enabled)
            .unwrap_or(true)
    }

    /// Directory holding replay logs.
    ///
    /// Defaults to `~/.textcad/replay`.
    pub fn replay_dir(&self) -> PathBuf {
        self.file
            .replay
            .as_ref()
            .and_then(|r| r.dir.clone())
            .unwrap_or_else(paths::default_replay_dir)
    }

    /// Configured log level, if any.
    ///
    /// `log.level` from a file wins over `LOG_LEVEL`.
    pub fn log_level(&self) -> Option<&str> {
        self.file
            .log
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .or(self.env.log_level.as_deref())
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded project config file.
    pub fn project_config_loaded_from(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    /// Summary safe for printing. The API key is reduced to a flag.
    pub fn info(&self) -> ConfigInfo {
        let enabled = self.assist_enabled();
        ConfigInfo {
            assist_enabled: enabled,
            model: if enabled {
                self.model().to_string()
            } else {
                "N/A".to_string()
            },
            api_key_set: self.api_key().is_some(),
            timeout_secs: self.timeout().as_secs(),
            max_tokens: self.max_tokens(),
            base_url: self.base_url().to_string(),
            replay_enabled: self.replay_enabled(),
            replay_dir: self.replay_dir(),
            log_level: self.log_level().unwrap_or("info").to_string(),
            global_config: self.global_path.clone(),
            project_config: self.project_path.clone(),
        }
    }
}

/// Redacted configuration summary.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConfigInfo {
    pub assist_enabled: bool,
    pub model: String,
    pub api_key_set: bool,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub base_url: String,
    pub replay_enabled: bool,
    pub replay_dir: PathBuf,
    pub log_level: String,
    pub global_config: Option<PathBuf>,
    pub project_config: Option<PathBuf>,
}

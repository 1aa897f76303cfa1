//! parse::assist
//!
//! Seams of the assisted parsing stage.
//!
//! - [`Assistant`] is the language-model client. It returns raw text only;
//!   validation happens in [`super::canonical`].
//! - [`AssistSettings`] is the credential/config provider that decides
//!   whether the assisted stage may run at all.
//!
//! Every [`AssistError`] is recovered inside the Normalizer by falling back
//! to the deterministic stage.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::core::config::Config;

/// Failures of the assisted stage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssistError {
    /// Request could not be sent or the body could not be read.
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The call did not finish within the configured timeout.
    #[error("assisted call timed out")]
    Timeout,

    /// Nothing usable in the response.
    #[error("empty response")]
    EmptyResponse,

    /// Response content is not JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// JSON does not have the operation shape.
    #[error("invalid structure: {0}")]
    Structure(String),

    /// A parameter has the wrong type.
    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    /// Action is outside the vocabulary.
    #[error("unknown action '{0}'")]
    UnknownAction(String),

    /// Every parameter was null.
    #[error("all parameters are null")]
    AllNull,
}

/// A language-model client producing raw completion text.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Ask the model to translate one instruction segment.
    async fn complete(&self, instruction: &str) -> Result<String, AssistError>;
}

/// Provider of the assisted-stage switch, credential and timeout.
pub trait AssistSettings: Send + Sync {
    /// Whether assisted parsing is enabled by configuration.
    fn assist_enabled(&self) -> bool;

    /// API credential, if one is present.
    fn api_key(&self) -> Option<&str>;

    /// Upper bound on one assisted call.
    fn timeout(&self) -> Duration;
}

impl AssistSettings for Config {
    fn assist_enabled(&self) -> bool {
        Config::assist_enabled(self)
    }

    fn api_key(&self) -> Option<&str> {
        Config::api_key(self)
    }

    fn timeout(&self) -> Duration {
        Config::timeout(self)
    }
}

/// Fixed settings, mostly for tests and embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticSettings {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl StaticSettings {
    /// Assisted stage enabled with a placeholder key.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            api_key: Some("test-key".to_string()),
            timeout: Duration::from_secs(5),
        }
    }

    /// Assisted stage disabled.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            api_key: None,
            timeout: Duration::from_secs(5),
        }
    }

    /// Override the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl AssistSettings for StaticSettings {
    fn assist_enabled(&self) -> bool {
        self.enabled
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`SessionId`] - Identifier of one replay session
//! - [`UtcTimestamp`] - RFC3339 timestamp
//! - [`Source`] - Which parsing stage produced an operation
//!
//! # Examples
//!
//! ```
//! use textcad::core::types::{SessionId, Source};
//!
//! let id = SessionId::new();
//! assert_eq!(SessionId::from_string(id.as_str()), id);
//!
//! assert_eq!(Source::Deterministic.as_str(), "deterministic");
//! ```

use serde::{Deserialize, Serialize};

/// Schema version stamped on batch results and replay records.
pub const SCHEMA_VERSION: &str = "1.0";

/// Unique identifier for a replay session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new unique session id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Create a SessionId from an existing string.
    ///
    /// Used when reading replay logs from disk.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A UTC timestamp in RFC3339 format.
///
/// # Example
///
/// ```
/// use textcad::core::types::UtcTimestamp;
///
/// let now = UtcTimestamp::now();
/// println!("Current time: {}", now);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtcTimestamp(chrono::DateTime<chrono::Utc>);

impl UtcTimestamp {
    /// Create a timestamp for the current moment.
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }

    /// Create a timestamp from a chrono DateTime.
    pub fn from_datetime(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self(dt)
    }

    /// Get the underlying datetime.
    pub fn as_datetime(&self) -> &chrono::DateTime<chrono::Utc> {
        &self.0
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// The parsing stage that produced an operation or batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// The language-model assisted stage.
    Assisted,
    /// The rule-based fallback stage.
    Deterministic,
}

impl Source {
    /// Wire name of the source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Assisted => "assisted",
            Source::Deterministic => "deterministic",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod session_id {
        use super::*;

        #[test]
        fn new_generates_unique_ids() {
            assert_ne!(SessionId::new(), SessionId::new());
        }

        #[test]
        fn serializes_as_plain_string() {
            let id = SessionId::from_string("abc-123");
            assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc-123\"");
        }
    }

    mod source {
        use super::*;

        #[test]
        fn serializes_snake_case() {
            assert_eq!(
                serde_json::to_string(&Source::Assisted).unwrap(),
                "\"assisted\""
            );
            let parsed: Source = serde_json::from_str("\"deterministic\"").unwrap();
            assert_eq!(parsed, Source::Deterministic);
        }
    }

    mod timestamp {
        use super::*;

        #[test]
        fn display_is_rfc3339() {
            let ts = UtcTimestamp::now();
            let text = ts.to_string();
            assert!(chrono::DateTime::parse_from_rfc3339(&text).is_ok());
        }
    }
}

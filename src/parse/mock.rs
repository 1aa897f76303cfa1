//! parse::mock
//!
//! Scripted assistant for deterministic testing.
//!
//! Replies are consumed in order; once the script is exhausted the fallback
//! reply (if any) is returned, otherwise every call fails with
//! [`AssistError::EmptyResponse`].
//!
//! # Example
//!
//! ```
//! use textcad::parse::assist::Assistant;
//! use textcad::parse::mock::MockAssistant;
//!
//! # tokio_test::block_on(async {
//! let mock = MockAssistant::new().reply("{\"action\": \"fillet\"}");
//!
//! assert_eq!(mock.complete("fillet it").await.unwrap(), "{\"action\": \"fillet\"}");
//! assert!(mock.complete("again").await.is_err());
//! assert_eq!(mock.calls(), vec!["fillet it", "again"]);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::assist::{AssistError, Assistant};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this text.
    Text(String),
    /// Fail with this error.
    Fail(AssistError),
}

/// Scripted assistant.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone, Default)]
pub struct MockAssistant {
    inner: Arc<Mutex<MockAssistantInner>>,
}

#[derive(Debug, Default)]
struct MockAssistantInner {
    script: VecDeque<MockReply>,
    fallback: Option<MockReply>,
    delay: Option<Duration>,
    calls: Vec<String>,
}

impl MockAssistant {
    /// Create an assistant with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(MockReply::Text(text.into()))
    }

    /// Queue a failure.
    pub fn fail(self, error: AssistError) -> Self {
        self.push(MockReply::Fail(error))
    }

    /// Reply returned once the script is exhausted.
    pub fn always(self, text: impl Into<String>) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fallback = Some(MockReply::Text(text.into()));
        }
        self
    }

    /// Sleep before every reply.
    pub fn with_delay(self, delay: Duration) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.delay = Some(delay);
        }
        self
    }

    /// Instructions received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.calls.clone()
    }

    fn push(self, reply: MockReply) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.script.push_back(reply);
        }
        self
    }
}

#[async_trait]
impl Assistant for MockAssistant {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, instruction: &str) -> Result<String, AssistError> {
        let (reply, delay) = {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(instruction.to_string());
            let reply = inner
                .script
                .pop_front()
                .or_else(|| inner.fallback.clone());
            (reply, inner.delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Fail(error)) => Err(error),
            None => Err(AssistError::EmptyResponse),
        }
    }
}

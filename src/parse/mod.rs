//! parse
//!
//! The Normalizer: raw instruction text in, canonical operations out.
//!
//! # Architecture
//!
//! ```text
//! text ──split──► segments ──┬─► assisted stage (optional, all-or-nothing)
//!                            └─► deterministic stage (always succeeds)
//! ```
//!
//! The assisted stage runs only when the caller asks for it, the settings
//! provider has it enabled, an API key is present, and an [`Assistant`]
//! is installed. Any failure there is logged at debug level and the segment
//! is resolved by [`rules::resolve_segment`] instead.
//!
//! # Modules
//!
//! - [`split`] - Multi-operation splitting
//! - [`rules`] - Deterministic extraction rules
//! - [`canonical`] - Validation of assistant output
//! - [`plan`] - Plan lines
//! - [`assist`] - Assistant and settings traits
//! - [`openai`] - OpenAI-compatible client
//! - [`mock`] - Scripted assistant for tests
//!
//! # Example
//!
//! ```
//! use textcad::parse::Normalizer;
//! use textcad::parse::assist::StaticSettings;
//!
//! # tokio_test::block_on(async {
//! let normalizer = Normalizer::new(Box::new(StaticSettings::disabled()), None);
//! let batch = normalizer
//!     .resolve_batch("create a 15mm cylinder 30mm tall; fillet the top edges 1mm", false)
//!     .await;
//!
//! assert_eq!(batch.len(), 2);
//! assert_eq!(batch.source().as_str(), "deterministic");
//! # });
//! ```

pub mod assist;
pub mod canonical;
pub mod mock;
pub mod openai;
pub mod plan;
pub mod rules;
pub mod split;

use serde::Serialize;
use tracing::{debug, info};

use crate::core::operation::Operation;
use crate::core::types::{Source, SCHEMA_VERSION};
use assist::{AssistError, AssistSettings, Assistant};

/// One resolved operation with the stage that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub operation: Operation,
    pub source: Source,
}

/// An ordered batch resolved from one instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBatch {
    instruction: String,
    items: Vec<Resolved>,
}

impl ResolvedBatch {
    /// The raw instruction the batch came from.
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Resolved operations in construction order.
    pub fn items(&self) -> &[Resolved] {
        &self.items
    }

    /// Operations in construction order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.items.iter().map(|r| &r.operation)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `assisted` only if every operation came from the assisted stage.
    pub fn source(&self) -> Source {
        if !self.items.is_empty() && self.items.iter().all(|r| r.source == Source::Assisted) {
            Source::Assisted
        } else {
            Source::Deterministic
        }
    }

    /// One plan line per operation.
    pub fn plan(&self) -> Vec<String> {
        plan::plan_lines(self.operations())
    }

    /// The serializable batch result.
    pub fn to_result(&self) -> BatchResult {
        BatchResult {
            schema_version: SCHEMA_VERSION.to_string(),
            source: self.source(),
            plan: self.plan(),
            operations: self.operations().cloned().collect(),
        }
    }
}

/// Wire form of a resolved batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub schema_version: String,
    pub source: Source,
    pub plan: Vec<String>,
    pub operations: Vec<Operation>,
}

/// Resolves raw text into canonical operations.
pub struct Normalizer {
    settings: Box<dyn AssistSettings>,
    assistant: Option<Box<dyn Assistant>>,
}

impl Normalizer {
    /// Create a normalizer; `assistant` may be `None` for deterministic-only use.
    pub fn new(settings: Box<dyn AssistSettings>, assistant: Option<Box<dyn Assistant>>) -> Self {
        Self {
            settings,
            assistant,
        }
    }

    /// The installed assistant, if the assisted stage may run right now.
    fn active_assistant(&self, use_ai_requested: bool) -> Option<&dyn Assistant> {
        if !use_ai_requested {
            return None;
        }
        if !self.settings.assist_enabled() {
            debug!("assisted stage requested but disabled by configuration");
            return None;
        }
        if self.settings.api_key().is_none() {
            debug!("assisted stage requested but no API key is present");
            return None;
        }
        self.assistant.as_deref()
    }

    /// Resolve `text` as a single segment.
    pub async fn resolve(&self, text: &str, use_ai_requested: bool) -> Resolved {
        if let Some(assistant) = self.active_assistant(use_ai_requested) {
            match self.assisted(assistant, text).await {
                Ok(operation) => {
                    debug!(action = %operation.action(), "assisted stage accepted");
                    return Resolved {
                        operation,
                        source: Source::Assisted,
                    };
                }
                Err(error) => {
                    debug!(%error, "assisted stage demoted to deterministic");
                }
            }
        }

        Resolved {
            operation: rules::resolve_segment(text),
            source: Source::Deterministic,
        }
    }

    /// Split `text` and resolve every segment independently, in order.
    pub async fn resolve_batch(&self, text: &str, use_ai_requested: bool) -> ResolvedBatch {
        let segments = split::split_instruction(text);
        let mut items = Vec::with_capacity(segments.len());
        for segment in &segments {
            items.push(self.resolve(segment, use_ai_requested).await);
        }

        let batch = ResolvedBatch {
            instruction: text.to_string(),
            items,
        };
        info!(
            operations = batch.len(),
            source = %batch.source(),
            "instruction normalized"
        );
        batch
    }

    async fn assisted(
        &self,
        assistant: &dyn Assistant,
        text: &str,
    ) -> Result<Operation, AssistError> {
        debug!(provider = assistant.name(), "assisted stage attempted");
        let raw = tokio::time::timeout(self.settings.timeout(), assistant.complete(text))
            .await
            .map_err(|_| AssistError::Timeout)??;
        canonical::operation_from_response(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::operation::Action;
    use assist::StaticSettings;
    use mock::MockAssistant;
    use std::time::Duration;

    const HOLE_JSON: &str =
        r#"{"action": "create_hole", "parameters": {"count": 2, "diameter_mm": 3}}"#;

    fn normalizer(settings: StaticSettings, mock: &MockAssistant) -> Normalizer {
        Normalizer::new(Box::new(settings), Some(Box::new(mock.clone())))
    }

    mod gating {
        use super::*;

        #[tokio::test]
        async fn not_requested_skips_assistant() {
            let mock = MockAssistant::new().always(HOLE_JSON);
            let n = normalizer(StaticSettings::enabled(), &mock);

            let resolved = n.resolve("drill a 5mm hole", false).await;
            assert_eq!(resolved.source, Source::Deterministic);
            assert_eq!(resolved.operation.parameters().diameter_mm, Some(5.0));
            assert!(mock.calls().is_empty());
        }

        #[tokio::test]
        async fn disabled_settings_skip_assistant() {
            let mock = MockAssistant::new().always(HOLE_JSON);
            let n = normalizer(StaticSettings::disabled(), &mock);

            let resolved = n.resolve("drill a 5mm hole", true).await;
            assert_eq!(resolved.source, Source::Deterministic);
            assert!(mock.calls().is_empty());
        }

        #[tokio::test]
        async fn missing_key_skips_assistant() {
            let mock = MockAssistant::new().always(HOLE_JSON);
            let settings = StaticSettings {
                api_key: None,
                ..StaticSettings::enabled()
            };
            let n = normalizer(settings, &mock);

            let resolved = n.resolve("drill a 5mm hole", true).await;
            assert_eq!(resolved.source, Source::Deterministic);
            assert!(mock.calls().is_empty());
        }
    }

    mod fallback {
        use super::*;

        #[tokio::test]
        async fn accepted_response_is_assisted() {
            let mock = MockAssistant::new().reply(HOLE_JSON);
            let n = normalizer(StaticSettings::enabled(), &mock);

            let resolved = n.resolve("drill a 5mm hole", true).await;
            assert_eq!(resolved.source, Source::Assisted);
            assert_eq!(resolved.operation.parameters().count, Some(2));
            assert_eq!(resolved.operation.parameters().diameter_mm, Some(3.0));
        }

        #[tokio::test]
        async fn all_null_response_is_discarded() {
            let mock = MockAssistant::new().reply(
                r#"{"action": "create_hole", "parameters": {"count": null, "pattern": null}}"#,
            );
            let n = normalizer(StaticSettings::enabled(), &mock);

            let resolved = n.resolve("drill a 5mm hole", true).await;
            assert_eq!(resolved.source, Source::Deterministic);
            assert_eq!(resolved.operation.parameters().diameter_mm, Some(5.0));
        }

        #[tokio::test]
        async fn failure_is_discarded() {
            let mock = MockAssistant::new().fail(AssistError::Network("refused".to_string()));
            let n = normalizer(StaticSettings::enabled(), &mock);

            let resolved = n.resolve("fillet the top edges 2mm", true).await;
            assert_eq!(resolved.source, Source::Deterministic);
            assert_eq!(resolved.operation.action(), Action::Fillet);
        }

        #[tokio::test]
        async fn timeout_is_discarded() {
            let mock = MockAssistant::new()
                .always(HOLE_JSON)
                .with_delay(Duration::from_millis(500));
            let settings = StaticSettings::enabled().with_timeout(Duration::from_millis(20));
            let n = normalizer(settings, &mock);

            let resolved = n.resolve("drill a 5mm hole", true).await;
            assert_eq!(resolved.source, Source::Deterministic);
            assert_eq!(mock.calls().len(), 1);
        }
    }

    mod batches {
        use super::*;

        #[tokio::test]
        async fn mixed_sources_report_deterministic() {
            let mock = MockAssistant::new().reply(HOLE_JSON).reply("not json");
            let n = normalizer(StaticSettings::enabled(), &mock);

            let batch = n
                .resolve_batch("drill 2 holes\ncreate a 15mm cylinder 30mm tall", true)
                .await;
            assert_eq!(batch.len(), 2);
            assert_eq!(batch.items()[0].source, Source::Assisted);
            assert_eq!(batch.items()[1].source, Source::Deterministic);
            assert_eq!(batch.source(), Source::Deterministic);
        }

        #[tokio::test]
        async fn all_assisted_reports_assisted() {
            let mock = MockAssistant::new().always(HOLE_JSON);
            let n = normalizer(StaticSettings::enabled(), &mock);

            let batch = n.resolve_batch("drill 2 holes; drill 2 more holes", true).await;
            assert_eq!(batch.source(), Source::Assisted);
            assert_eq!(mock.calls(), vec!["drill 2 holes", "drill 2 more holes"]);
        }

        #[tokio::test]
        async fn unknown_segment_keeps_its_slot() {
            let n = Normalizer::new(Box::new(StaticSettings::disabled()), None);
            let batch = n
                .resolve_batch("create a 20mm cube\nsing a song\nfillet the edges 1mm", false)
                .await;

            let actions: Vec<Action> = batch.operations().map(|op| op.action()).collect();
            assert_eq!(
                actions,
                vec![Action::CreateFeature, Action::Unknown, Action::Fillet]
            );
        }

        #[tokio::test]
        async fn result_has_schema_and_plan() {
            let n = Normalizer::new(Box::new(StaticSettings::disabled()), None);
            let result = n.resolve_batch("make a 20mm cube", false).await.to_result();

            assert_eq!(result.schema_version, "1.0");
            assert_eq!(result.source, Source::Deterministic);
            assert_eq!(result.plan.len(), 1);
            assert_eq!(result.operations.len(), 1);
        }

        #[tokio::test]
        async fn empty_instruction_is_empty_batch() {
            let n = Normalizer::new(Box::new(StaticSettings::disabled()), None);
            let batch = n.resolve_batch("  \n ; ", false).await;
            assert!(batch.is_empty());
            assert_eq!(batch.source(), Source::Deterministic);
        }
    }
}

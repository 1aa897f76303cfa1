//! parse::openai
//!
//! OpenAI-compatible chat-completions client for the assisted stage.
//!
//! The client sends one fixed system prompt describing the canonical schema
//! followed by the instruction segment, and returns the first choice's
//! message content verbatim.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};

use super::assist::{AssistError, Assistant};
use crate::core::config::Config;

/// Sampling temperature for structured output.
pub const TEMPERATURE: f64 = 0.1;

/// System prompt describing the canonical operation schema.
pub const SYSTEM_PROMPT: &str = r#"You are a CAD command parser. Convert one natural language instruction into one JSON command.

Return ONLY valid JSON matching this exact schema:
{
  "action": "create_feature" | "create_hole" | "extrude" | "fillet" | "chamfer" | "pattern",
  "parameters": {
    "count": integer | null,
    "diameter_mm": number | null,
    "height_mm": number | null,
    "width_mm": number | null,
    "length_mm": number | null,
    "depth_mm": number | null,
    "radius_mm": number | null,
    "angle_deg": number | null,
    "shape": "base_plate" | "plate" | "block" | "box" | "cube" | "cylinder" | null,
    "pattern": {
      "type": "circular" | "linear" | null,
      "count": integer | null,
      "angle_deg": number | null,
      "radius_mm": number | null,
      "center_x_mm": number | null,
      "center_y_mm": number | null,
      "center_z_mm": number | null
    } | null,
    "center_x_mm": number | null,
    "center_y_mm": number | null,
    "center_z_mm": number | null,
    "axis": "X" | "Y" | "Z" | null,
    "use_top_face": boolean | null,
    "extrude_midplane": boolean | null,
    "draft_angle_deg": number | null,
    "draft_outward": boolean | null,
    "flip_direction": boolean | null,
    "fillet_target": string | null,
    "chamfer_distance_mm": number | null,
    "chamfer_target": string | null
  }
}

Rules:
- Use null for unspecified parameters
- Extract numeric values in millimetres and degrees
- Choose the most appropriate action type
- For patterns, include type, count, and angle if specified
- Return ONLY the JSON, no explanations or markdown"#;

/// Connection settings for [`OpenAiAssistant`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

impl OpenAiConfig {
    /// Settings from a loaded [`Config`], or `None` without an API key.
    pub fn from_config(config: &Config) -> Option<Self> {
        Some(Self {
            api_key: config.api_key()?.to_string(),
            base_url: config.base_url().to_string(),
            model: config.model().to_string(),
            max_tokens: config.max_tokens(),
        })
    }
}

/// Chat-completions client.
pub struct OpenAiAssistant {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiAssistant {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn headers(&self) -> Result<HeaderMap, AssistError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.config.api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).map_err(|e| AssistError::Network(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Request body for one instruction.
    pub fn payload(&self, instruction: &str) -> Value {
        json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": instruction },
            ],
            "temperature": TEMPERATURE,
            "max_tokens": self.config.max_tokens,
        })
    }

    fn content(body: &Value) -> Option<&str> {
        body.get("choices")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|v| v.as_str())
    }
}

#[async_trait]
impl Assistant for OpenAiAssistant {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, instruction: &str) -> Result<String, AssistError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(url)
            .headers(self.headers()?)
            .json(&self.payload(instruction))
            .send()
            .await
            .map_err(|e| AssistError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AssistError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(AssistError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let body: Value =
            serde_json::from_str(&text).map_err(|e| AssistError::InvalidJson(e.to_string()))?;
        match Self::content(&body) {
            Some(content) if !content.trim().is_empty() => Ok(content.to_string()),
            _ => Err(AssistError::EmptyResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assistant() -> OpenAiAssistant {
        OpenAiAssistant::new(OpenAiConfig {
            api_key: "sk-test".to_string(),
            base_url: "http://localhost".to_string(),
            model: "gpt-4o".to_string(),
            max_tokens: 500,
        })
    }

    #[test]
    fn payload_carries_prompt_and_limits() {
        let payload = assistant().payload("drill a 5mm hole");
        assert_eq!(payload["model"], "gpt-4o");
        assert_eq!(payload["temperature"], 0.1);
        assert_eq!(payload["max_tokens"], 500);
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][1]["content"], "drill a 5mm hole");
    }

    #[test]
    fn content_reads_first_choice() {
        let body = json!({"choices": [{"message": {"content": "{}"}}]});
        assert_eq!(OpenAiAssistant::content(&body), Some("{}"));
        assert_eq!(OpenAiAssistant::content(&json!({"choices": []})), None);
    }

    #[test]
    fn config_requires_key() {
        let config = Config::default();
        assert!(OpenAiConfig::from_config(&config).is_none());
    }
}

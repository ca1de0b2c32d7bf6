//! Remote text generation backends.
//!
//! The [`Generator`] trait decouples the flow from the actual model backend
//! (currently the Gemini REST API). Tests use scripted generators that return
//! predetermined replies without touching the network.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::io::config::ModelConfig;

/// Parameters for a single generation call.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Fully rendered prompt text.
    pub prompt: String,
    /// JSON Schema the reply is expected to satisfy.
    pub output_schema: Value,
}

/// Abstraction over text generation backends.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Return the raw model reply. Transport, quota and model errors are
    /// returned as `Err`; a reply that merely has the wrong shape is not.
    async fn generate(&self, request: &GenerateRequest) -> Result<String>;
}

/// Generator backed by the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: Option<f32>,
}

impl std::fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiGenerator")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl GeminiGenerator {
    pub fn new(config: &ModelConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
            temperature: config.temperature,
        })
    }

    /// Build a generator, reading the API key from `config.api_key_env`.
    pub fn from_env(config: &ModelConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("environment variable {} is not set", config.api_key_env))?;
        Self::new(config, api_key)
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_body(&self, request: &GenerateRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_json_schema: response_schema(&request.output_schema),
                temperature: self.temperature,
            },
        }
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    #[instrument(skip_all, fields(model = %self.model, prompt_bytes = request.prompt.len()))]
    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let body = self.build_body(request);
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("send gemini request")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "gemini request failed");
            return Err(map_http_error(status, &text));
        }

        let parsed: GenerateContentResponse =
            response.json().await.context("parse gemini response")?;
        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
        {
            return Err(anyhow!("gemini blocked the prompt: {reason}"));
        }
        let text = extract_text(parsed);
        debug!(bytes = text.len(), "gemini reply received");
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_json_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Schema forwarded to the API, minus the `$schema` dialect marker.
fn response_schema(schema: &Value) -> Option<Value> {
    let mut object = schema.as_object()?.clone();
    object.remove("$schema");
    (!object.is_empty()).then(|| Value::Object(object))
}

/// Concatenated text of the first candidate; empty when there is none.
fn extract_text(response: GenerateContentResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default()
}

fn map_http_error(status: StatusCode, body: &str) -> anyhow::Error {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .map(|wrapper| match (wrapper.error.status, wrapper.error.message) {
            (Some(status_text), Some(msg)) => format!("{status_text}: {msg}"),
            (None, Some(msg)) => msg,
            (Some(status_text), None) => status_text,
            (None, None) => body.to_string(),
        })
        .unwrap_or_else(|| body.to_string());
    anyhow!("gemini returned HTTP {}: {}", status.as_u16(), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> GeminiGenerator {
        GeminiGenerator::new(&ModelConfig::default(), "test-key").expect("client")
    }

    #[test]
    fn endpoint_includes_model() {
        let config = ModelConfig {
            base_url: "http://localhost:9999/v1beta/".to_string(),
            model: "gemini-test".to_string(),
            ..ModelConfig::default()
        };
        let generator = GeminiGenerator::new(&config, "key").expect("client");
        assert_eq!(
            generator.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn request_body_asks_for_json() {
        let request = GenerateRequest {
            prompt: "write".to_string(),
            output_schema: serde_json::json!({
                "$schema": "https://json-schema.org/draft/2020-12/schema",
                "type": "object"
            }),
        };
        let body = serde_json::to_value(generator().build_body(&request)).expect("serialize");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "write");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert!(body["generationConfig"]["temperature"].is_number());
        assert_eq!(
            body["generationConfig"]["responseJsonSchema"],
            serde_json::json!({"type": "object"})
        );
    }

    #[test]
    fn empty_schema_is_not_forwarded() {
        assert_eq!(response_schema(&serde_json::json!({})), None);
        assert_eq!(response_schema(&serde_json::json!(true)), None);
    }

    #[test]
    fn extract_text_joins_parts_of_first_candidate() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                {"content": {"parts": [{"text": "{\"story"}, {"text": "Starters\": []}"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .expect("parse");
        assert_eq!(extract_text(response), "{\"storyStarters\": []}");
    }

    #[test]
    fn extract_text_is_empty_without_candidates() {
        let response: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({})).expect("parse");
        assert_eq!(extract_text(response), "");
    }

    #[test]
    fn http_error_uses_api_message() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, body);
        assert_eq!(
            err.to_string(),
            "gemini returned HTTP 429: RESOURCE_EXHAUSTED: Quota exceeded"
        );
    }

    #[test]
    fn http_error_falls_back_to_raw_body() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.to_string(), "gemini returned HTTP 502: upstream down");
    }

    #[test]
    fn from_env_requires_key() {
        let config = ModelConfig {
            api_key_env: "SPARK_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..ModelConfig::default()
        };
        let err = GeminiGenerator::from_env(&config).unwrap_err();
        assert!(err.to_string().contains("SPARK_TEST_KEY_THAT_IS_NEVER_SET"));
    }
}

//! Gemini client
//!
//! Implements [`RemoteModel`] over the `generateContent` REST endpoint.
//! The reqwest client carries the configured timeout, so a stuck remote
//! call surfaces as a request error and the in-flight future is dropped
//! rather than left to finish unobserved.

use crate::generate::{GenerationError, RemoteModel};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use webloom_common::config::AiConfig;

/// Client for the Gemini generateContent API
pub struct GeminiClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    /// Build the client from configuration. Returns `None` (and logs)
    /// when no API key is configured, leaving the pipeline on the
    /// fallback path.
    pub fn from_config(config: &AiConfig) -> Option<Self> {
        let Some(api_key) = config.api_key.clone().filter(|k| !k.is_empty()) else {
            tracing::warn!(
                "GEMINI_API_KEY not set; AI answering is disabled and questions \
                 will receive fallback answers"
            );
            return None;
        };

        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(error = %e, "Failed to build HTTP client; AI answering is disabled");
                return None;
            }
        };

        tracing::info!(model = %config.model, "Remote model client initialized");

        Some(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl RemoteModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);

        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status { status, body });
        }

        let payload: GenerateContentResponse = response.json().await?;
        extract_text(&payload)
    }
}

/// Pull the answer text out of a generateContent response
fn extract_text(response: &GenerateContentResponse) -> Result<String, GenerationError> {
    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| GenerationError::Malformed("no candidates in response".to_string()))?;

    let content = candidate
        .content
        .as_ref()
        .ok_or_else(|| GenerationError::Malformed("candidate without content".to_string()))?;

    let text: String = content
        .parts
        .iter()
        .map(|part| part.text.as_str())
        .collect();

    if text.trim().is_empty() {
        return Err(GenerationError::Malformed("empty answer text".to_string()));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_from_response() {
        let payload: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [
                    {
                        "content": {
                            "parts": [
                                {"text": "The answer "},
                                {"text": "spans two parts."}
                            ],
                            "role": "model"
                        },
                        "finishReason": "STOP"
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(extract_text(&payload).unwrap(), "The answer spans two parts.");
    }

    #[test]
    fn test_empty_response_is_malformed() {
        let payload: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            extract_text(&payload),
            Err(GenerationError::Malformed(_))
        ));

        let payload: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "  "}]}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            extract_text(&payload),
            Err(GenerationError::Malformed(_))
        ));
    }

    #[test]
    fn test_client_absent_without_api_key() {
        let config = AiConfig {
            api_key: None,
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            timeout_secs: 30,
        };
        assert!(GeminiClient::from_config(&config).is_none());
    }
}

use crate::ai::Generator;
use crate::config::Config;
use crate::error::{PipeLlmError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// API 키 환경 변수
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Gemini REST API (`generateContent`) 호출
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    endpoint: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiGenerator {
    pub fn new(api_key: String, config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| PipeLlmError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!(
                "{}/{}:generateContent",
                config.api_base.trim_end_matches('/'),
                config.model
            ),
        })
    }

    /// `GEMINI_API_KEY`에서 키를 읽어 생성
    pub fn from_env(config: &Config) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(PipeLlmError::MissingApiKey)?;
        Self::new(api_key, config)
    }

    fn request_body(full_prompt: &str, thinking_budget: u32) -> GenerateRequest<'_> {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: full_prompt }],
            }],
            generation_config: GenerationConfig {
                thinking_config: ThinkingConfig { thinking_budget },
            },
        }
    }

    /// 응답 본문에서 첫 번째 후보의 텍스트를 추출
    fn extract_text(body: &str) -> String {
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap_or_default();

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<String>()
            });

        match text {
            Some(text) => text,
            None => format!("[No output or response blocked]\n{}", body.trim()),
        }
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, full_prompt: &str, thinking_budget: u32) -> String {
        debug!(endpoint = %self.endpoint, thinking_budget, "Calling Gemini");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::request_body(full_prompt, thinking_budget))
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => return format!("Network error: {}", e.without_url()),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return format!("Network error: {}", e.without_url()),
        };

        if !status.is_success() {
            return format!("HTTP {}: {}", status.as_u16(), body);
        }

        Self::extract_text(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GeminiGenerator::request_body("hi", 4096)).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(
            body["generationConfig"]["thinkingConfig"]["thinkingBudget"],
            4096
        );
    }

    #[test]
    fn test_extract_joins_parts_of_first_candidate() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Hello, "}, {"text": "world"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }"#;
        assert_eq!(GeminiGenerator::extract_text(body), "Hello, world");
    }

    #[test]
    fn test_extract_blocked_response() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let text = GeminiGenerator::extract_text(body);
        assert!(text.starts_with("[No output or response blocked]"));
        assert!(text.contains("SAFETY"));
    }

    #[test]
    fn test_endpoint_uses_config() {
        let config = Config {
            api_base: "http://localhost:9999/models/".to_string(),
            model: "test-model".to_string(),
            ..Config::default()
        };
        let generator = GeminiGenerator::new("key".to_string(), &config).unwrap();
        assert_eq!(
            generator.endpoint,
            "http://localhost:9999/models/test-model:generateContent"
        );
        assert_eq!(generator.name(), "gemini");
    }

    #[tokio::test]
    async fn test_unreachable_host_returns_error_text() {
        let config = Config {
            api_base: "http://127.0.0.1:9/models".to_string(),
            request_timeout_secs: 2,
            ..Config::default()
        };
        let generator = GeminiGenerator::new("key".to_string(), &config).unwrap();
        let text = generator.generate("hello", 0).await;
        assert!(text.starts_with("Network error:"));
    }
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::utils::config::GeminiConfig;

pub const TEMPERATURE: f32 = 0.7;
pub const TOP_P: f32 = 0.9;
pub const MAX_OUTPUT_TOKENS: u32 = 2048;

/// Provider-side failure; the detail is for logs only.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct GenerationFailed(pub String);

/// External generative text provider.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationFailed>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
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
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        let client = reqwest::Client::new();
        Self { config, client }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationFailed> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| GenerationFailed("GEMINI_API_KEY is not configured".to_string()))?;

        let generation_config = GenerationConfig {
            temperature: TEMPERATURE,
            top_p: TOP_P,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        };
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": generation_config,
        });

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationFailed(format!("Failed to reach provider: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GenerationFailed(format!(
                "Provider returned {}: {}",
                status, detail
            )));
        }

        let parsed = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| GenerationFailed(format!("Failed to parse provider response: {}", e)))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationFailed("Provider returned no text".to_string()));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_uses_model() {
        let client = GeminiClient::new(GeminiConfig {
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://example.test/v1beta/".to_string(),
        });
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn sampling_parameters_serialize_in_camel_case() {
        let value = serde_json::to_value(GenerationConfig {
            temperature: TEMPERATURE,
            top_p: TOP_P,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        })
        .unwrap();
        assert_eq!(value["maxOutputTokens"], 2048);
        assert!(value.get("topP").is_some());
    }

    #[test]
    fn response_text_joins_parts() {
        let parsed: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"<p>a</p>"},{"text":"<p>b</p>"}]}}]}"#,
        )
        .unwrap();
        let parts = &parsed.candidates[0].content.as_ref().unwrap().parts;
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].text.as_deref(), Some("<p>a</p>"));
    }

    #[actix_web::test]
    async fn missing_api_key_fails_without_network() {
        let client = GeminiClient::new(GeminiConfig {
            api_key: None,
            model: "m".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
        });
        assert!(client.generate("hi").await.is_err());
    }
}

//! Gemini `generateContent` transport (primary provider).

use super::{build_provider_http_client, classify_status, map_http_error, GenerationRequest, GenerationTransport};
use crate::error::{AttemptError, GenerationError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiTransport {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiTransport {
    pub fn new(api_key: String, base_url: Option<String>) -> Result<Self, GenerationError> {
        let client = build_provider_http_client()?;
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

pub(crate) fn build_request_body(request: &GenerationRequest) -> Value {
    let mut parts = vec![json!({ "text": request.prompt })];
    if let Some(image) = &request.image {
        parts.push(json!({
            "inline_data": {
                "mime_type": image.media_type,
                "data": image.base64(),
            }
        }));
    }

    let mut generation_config = serde_json::Map::new();
    if let Some(temperature) = request.options.temperature {
        generation_config.insert("temperature".to_string(), json!(temperature));
    }
    if let Some(max_tokens) = request.options.max_output_tokens {
        generation_config.insert("maxOutputTokens".to_string(), json!(max_tokens));
    }
    if request.options.json_response {
        generation_config.insert("responseMimeType".to_string(), json!("application/json"));
    }

    json!({
        "contents": [{ "role": "user", "parts": parts }],
        "generationConfig": generation_config,
    })
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

/// Concatenated text of the first candidate; empty when the path is absent.
pub(crate) fn extract_text(body: &str) -> Result<String, AttemptError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| AttemptError::Transport(format!("Failed to parse response: {}", e)))?;
    Ok(response
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
        .unwrap_or_default())
}

#[async_trait]
impl GenerationTransport for GeminiTransport {
    async fn invoke(&self, model: &str, request: &GenerationRequest) -> Result<String, AttemptError> {
        let response = self
            .client
            .post(self.endpoint(model))
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&build_request_body(request))
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_http_error)?;
        if !status.is_success() {
            return Err(classify_status(status.as_u16(), &body));
        }
        extract_text(&body)
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}

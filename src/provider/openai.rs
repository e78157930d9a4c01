//! OpenAI-compatible chat completions transport (secondary provider).

use super::{build_provider_http_client, classify_status, map_http_error, GenerationRequest, GenerationTransport};
use crate::error::{AttemptError, GenerationError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiTransport {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiTransport {
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
}

pub(crate) fn build_request_body(model: &str, request: &GenerationRequest) -> Value {
    let content = match &request.image {
        Some(image) => json!([
            { "type": "text", "text": request.prompt },
            {
                "type": "image_url",
                "image_url": {
                    "url": format!("data:{};base64,{}", image.media_type, image.base64())
                }
            }
        ]),
        None => json!(request.prompt),
    };

    let mut body = json!({
        "model": model,
        "messages": [{ "role": "user", "content": content }],
    });
    if let Some(temperature) = request.options.temperature {
        body["temperature"] = json!(temperature);
    }
    if let Some(max_tokens) = request.options.max_output_tokens {
        body["max_tokens"] = json!(max_tokens);
    }
    if request.options.json_response {
        body["response_format"] = json!({ "type": "json_object" });
    }
    body
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub(crate) fn extract_text(body: &str) -> Result<String, AttemptError> {
    let completion: ChatCompletion = serde_json::from_str(body)
        .map_err(|e| AttemptError::Transport(format!("Failed to parse response: {}", e)))?;
    Ok(completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .unwrap_or_default())
}

#[async_trait]
impl GenerationTransport for OpenAiTransport {
    async fn invoke(&self, model: &str, request: &GenerationRequest) -> Result<String, AttemptError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&build_request_body(model, request))
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
        "openai"
    }
}

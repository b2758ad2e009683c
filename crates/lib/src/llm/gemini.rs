//! Gemini API client (https://generativelanguage.googleapis.com by default).
//! Non-streaming `generateContent` only; system messages become `systemInstruction`.

use crate::config::LlmConfig;
use crate::llm::{ChatMessage, LlmBackend, LlmError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

/// Client for the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    model: String,
    temperature: f32,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(
        base_url: Option<String>,
        model: impl Into<String>,
        temperature: f32,
        api_key: impl Into<String>,
    ) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url,
            model: model.into(),
            temperature,
            api_key: api_key.into(),
            client,
        }
    }

    /// Client for the model, temperature and endpoint in `config`.
    pub fn from_config(config: &LlmConfig, api_key: impl Into<String>) -> Self {
        Self::new(
            config.base_url.clone(),
            config.model.clone(),
            config.temperature,
            api_key,
        )
    }

    /// POST /v1beta/models/{model}:generateContent
    pub async fn generate(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = build_request(&messages, self.temperature);
        log::debug!(
            "gemini: generateContent model={} contents={} system={}",
            self.model,
            body.contents.len(),
            body.system_instruction.is_some()
        );
        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("{} {}", status, body)));
        }
        let data: GenerateResponse = res.json().await?;
        let text = data.text();
        if text.trim().is_empty() {
            return Err(LlmError::Empty);
        }
        Ok(text)
    }
}

#[async_trait]
impl LlmBackend for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        self.generate(messages).await
    }
}

fn gemini_role(role: &str) -> &'static str {
    if role == "assistant" {
        "model"
    } else {
        "user"
    }
}

/// Split system messages into `systemInstruction`; map assistant to Gemini's "model" role.
fn build_request(messages: &[ChatMessage], temperature: f32) -> GenerateRequest {
    let mut system = Vec::new();
    let mut contents = Vec::new();
    for m in messages {
        match m.role.as_str() {
            "system" => system.push(Part {
                text: m.content.clone(),
            }),
            role => contents.push(Content {
                role: Some(gemini_role(role).to_string()),
                parts: vec![Part {
                    text: m.content.clone(),
                }],
            }),
        }
    }
    GenerateRequest {
        system_instruction: if system.is_empty() {
            None
        } else {
            Some(Content {
                role: None,
                parts: system,
            })
        },
        contents,
        generation_config: GenerationConfig { temperature },
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect::<String>())
            .unwrap_or_default()
    }
}

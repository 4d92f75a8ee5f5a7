//! LLM Provider implementations

use async_trait::async_trait;
use bibleverse_types::VerseResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract::extract_verse;
use crate::prompt::VersePrompts;
use crate::types::*;

/// Trait for verse-generating providers
///
/// Providers differ only in how the prompt is framed, how the single
/// outbound request is shaped, and where the generated text sits in the
/// response. Everything after that is shared.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Get the provider kind
    fn kind(&self) -> ProviderKind;

    /// Whether an API key is available
    fn is_configured(&self) -> bool;

    /// Prompt for a situation
    fn build_prompt(&self, situation: &str) -> String;

    /// Perform the outbound call and return the raw response body
    async fn send(&self, prompt: &str) -> Result<Value>;

    /// Pull the generated text out of a raw response body
    fn extract_text(&self, raw: &Value) -> Result<String>;

    /// Generate model text for a situation
    async fn generate_text(&self, situation: &str) -> Result<String> {
        let prompt = self.build_prompt(situation);
        let raw = self.send(&prompt).await?;
        self.extract_text(&raw)
    }

    /// Generate and parse a verse for a situation
    async fn recommend(&self, situation: &str) -> Result<VerseResult> {
        let text = self.generate_text(situation).await?;
        extract_verse(&text).map_err(|e| {
            tracing::warn!(provider = %self.kind(), error = %e, output = %text, "Could not extract verse from model output");
            LLMError::Extraction(e)
        })
    }
}

/// Read a JSON body, turning non-2xx responses into [`LLMError::UpstreamStatus`]
async fn read_json(provider: ProviderKind, response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(provider = %provider, status = status.as_u16(), body = %body, "Upstream API error");
        return Err(LLMError::UpstreamStatus {
            status: status.as_u16(),
            body,
        });
    }

    response.json().await.map_err(|e| LLMError::InvalidResponse {
        message: e.to_string(),
    })
}

fn network_error(e: reqwest::Error) -> LLMError {
    let message = if e.is_timeout() {
        format!("request timed out: {}", e)
    } else {
        e.to_string()
    };
    LLMError::NetworkError { message }
}

fn require_key(provider: ProviderKind, api_key: &Option<String>) -> Result<&str> {
    api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or(LLMError::ApiKeyMissing { provider })
}

fn env_key(kind: ProviderKind) -> Option<String> {
    std::env::var(kind.api_key_env())
        .ok()
        .filter(|k| !k.trim().is_empty())
}

// ============================================================================
// Hugging Face Provider (Default)
// ============================================================================

/// Configuration for the Hugging Face Inference API
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl HuggingFaceConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api-inference.huggingface.co";
    pub const DEFAULT_MODEL: &'static str = "mistralai/Mistral-7B-Instruct-v0.3";

    /// Defaults with the API key read from `HUGGINGFACE_API_KEY`
    pub fn from_env() -> Self {
        Self {
            api_key: env_key(ProviderKind::HuggingFace),
            ..Self::default()
        }
    }
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
        }
    }
}

/// Hugging Face Inference API provider
pub struct HuggingFaceProvider {
    config: HuggingFaceConfig,
    client: reqwest::Client,
}

impl HuggingFaceProvider {
    pub fn new(config: HuggingFaceConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }
}

#[derive(Serialize)]
struct HuggingFaceRequest<'a> {
    inputs: &'a str,
    parameters: HuggingFaceParameters,
}

#[derive(Serialize)]
struct HuggingFaceParameters {
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
    return_full_text: bool,
}

#[async_trait]
impl LLMProvider for HuggingFaceProvider {
    fn name(&self) -> &'static str {
        "Hugging Face"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::HuggingFace
    }

    fn is_configured(&self) -> bool {
        require_key(self.kind(), &self.config.api_key).is_ok()
    }

    fn build_prompt(&self, situation: &str) -> String {
        VersePrompts::mistral_instruct(situation)
    }

    async fn send(&self, prompt: &str) -> Result<Value> {
        let api_key = require_key(self.kind(), &self.config.api_key)?;

        let request = HuggingFaceRequest {
            inputs: prompt,
            parameters: HuggingFaceParameters {
                max_new_tokens: 1200,
                temperature: 0.7,
                top_p: 0.95,
                return_full_text: false,
            },
        };

        let url = format!(
            "{}/models/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(network_error)?;

        read_json(self.kind(), response).await
    }

    /// Text-generation models answer with `[{"generated_text": ...}]`, some
    /// deployments with a bare object. Anything else is handed on as JSON
    /// text so that extraction can still find a verse in it.
    fn extract_text(&self, raw: &Value) -> Result<String> {
        let generated = match raw {
            Value::Array(items) => {
                let first = items.first().ok_or_else(|| LLMError::InvalidResponse {
                    message: "empty generation list".to_string(),
                })?;
                match first.get("generated_text").and_then(Value::as_str) {
                    Some(text) => text.to_string(),
                    None => match first {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    },
                }
            }
            Value::Object(map) => match map.get("generated_text").and_then(Value::as_str) {
                Some(text) => text.to_string(),
                None => raw.to_string(),
            },
            other => other.to_string(),
        };
        Ok(generated)
    }
}

// ============================================================================
// Gemini Provider
// ============================================================================

/// Configuration for the Google Gemini API
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl GeminiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";
    pub const DEFAULT_MODEL: &'static str = "gemini-1.5-flash";

    /// Defaults with the API key read from `GEMINI_API_KEY`
    pub fn from_env() -> Self {
        Self {
            api_key: env_key(ProviderKind::Gemini),
            ..Self::default()
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
        }
    }
}

/// Google Gemini API provider
pub struct GeminiProvider {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<Value>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn is_configured(&self) -> bool {
        require_key(self.kind(), &self.config.api_key).is_ok()
    }

    fn build_prompt(&self, situation: &str) -> String {
        VersePrompts::combined(situation)
    }

    async fn send(&self, prompt: &str) -> Result<Value> {
        let api_key = require_key(self.kind(), &self.config.api_key)?;

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: 0.7,
                top_p: 0.95,
                max_output_tokens: 2048,
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(network_error)?;

        read_json(self.kind(), response).await
    }

    fn extract_text(&self, raw: &Value) -> Result<String> {
        let response: GeminiResponse =
            serde_json::from_value(raw.clone()).map_err(|e| LLMError::InvalidResponse {
                message: e.to_string(),
            })?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text);

        match text {
            Some(text) => Ok(text),
            None => Err(LLMError::InvalidResponse {
                message: match response.prompt_feedback {
                    Some(feedback) => format!("no candidate text (prompt feedback: {})", feedback),
                    None => "no candidate text".to_string(),
                },
            }),
        }
    }
}

// ============================================================================
// Anthropic Provider
// ============================================================================

/// Configuration for the Anthropic API
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl AnthropicConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com";
    pub const DEFAULT_MODEL: &'static str = "claude-3-5-sonnet-20241022";
    pub const API_VERSION: &'static str = "2023-06-01";

    /// Defaults with the API key read from `ANTHROPIC_API_KEY`
    pub fn from_env() -> Self {
        Self {
            api_key: env_key(ProviderKind::Anthropic),
            ..Self::default()
        }
    }
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
        }
    }
}

/// Anthropic Claude API provider
pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "Anthropic"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn is_configured(&self) -> bool {
        require_key(self.kind(), &self.config.api_key).is_ok()
    }

    // The persona travels in the `system` field
    fn build_prompt(&self, situation: &str) -> String {
        VersePrompts::instructions(situation)
    }

    async fn send(&self, prompt: &str) -> Result<Value> {
        let api_key = require_key(self.kind(), &self.config.api_key)?;

        let request = AnthropicRequest {
            model: &self.config.model,
            max_tokens: 2048,
            temperature: 0.7,
            system: VersePrompts::PERSONA,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", AnthropicConfig::API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(network_error)?;

        read_json(self.kind(), response).await
    }

    fn extract_text(&self, raw: &Value) -> Result<String> {
        let response: AnthropicResponse =
            serde_json::from_value(raw.clone()).map_err(|e| LLMError::InvalidResponse {
                message: e.to_string(),
            })?;

        response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .find_map(|block| block.text)
            .ok_or_else(|| LLMError::InvalidResponse {
                message: "no text block in response".to_string(),
            })
    }
}

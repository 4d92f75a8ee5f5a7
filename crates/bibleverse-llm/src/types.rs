//! Common types for provider calls

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::ExtractionError;

/// Errors that can occur while generating a verse
#[derive(Error, Debug)]
pub enum LLMError {
    #[error("API key not configured for {provider}")]
    ApiKeyMissing { provider: ProviderKind },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Upstream returned HTTP {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl LLMError {
    /// Hugging Face answers 503 while a cold model is being loaded
    pub fn is_model_loading(&self) -> bool {
        matches!(self, Self::UpstreamStatus { status: 503, .. })
    }

    /// Short label for logs and metrics
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::ApiKeyMissing { .. } => "api_key_missing",
            Self::ConfigurationError { .. } => "configuration",
            Self::NetworkError { .. } => "network",
            Self::UpstreamStatus { .. } => "upstream_status",
            Self::InvalidResponse { .. } => "invalid_response",
            Self::Extraction(_) => "extraction",
        }
    }
}

pub type Result<T> = std::result::Result<T, LLMError>;

/// Which upstream service generates verses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Hugging Face Inference API
    HuggingFace,
    /// Google Gemini API
    Gemini,
    /// Anthropic Claude API
    Anthropic,
}

impl ProviderKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "huggingface" | "hugging_face" | "hugging-face" | "hf" => Some(Self::HuggingFace),
            "gemini" | "google" => Some(Self::Gemini),
            "anthropic" | "claude" => Some(Self::Anthropic),
            _ => None,
        }
    }

    /// Environment variable holding the API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::HuggingFace => "HUGGINGFACE_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HuggingFace => write!(f, "huggingface"),
            Self::Gemini => write!(f, "gemini"),
            Self::Anthropic => write!(f, "anthropic"),
        }
    }
}

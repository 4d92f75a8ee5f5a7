//! LLM Router - selects the single configured provider

use std::sync::Arc;
use std::time::Duration;

use bibleverse_types::VerseResult;

use crate::providers::*;
use crate::types::*;

/// Default upper bound for one outbound call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Holds the provider chosen by configuration
#[derive(Clone)]
pub struct LLMRouter {
    provider: Arc<dyn LLMProvider>,
    kind: ProviderKind,
}

impl LLMRouter {
    /// Create a router with a specific provider
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        let kind = provider.kind();
        Self { provider, kind }
    }

    /// Get the current provider
    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    /// Get the provider kind
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_configured()
    }

    /// Generate a verse using the current provider
    pub async fn recommend(&self, situation: &str) -> Result<VerseResult> {
        self.provider.recommend(situation).await
    }
}

impl std::fmt::Debug for LLMRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMRouter")
            .field("provider", &self.provider.name())
            .field("kind", &self.kind)
            .finish()
    }
}

/// Builder for LLM router with explicit configuration
pub struct LLMRouterBuilder {
    kind: Option<ProviderKind>,
    timeout: Duration,
    huggingface_config: Option<HuggingFaceConfig>,
    gemini_config: Option<GeminiConfig>,
    anthropic_config: Option<AnthropicConfig>,
}

impl LLMRouterBuilder {
    pub fn new() -> Self {
        Self {
            kind: None,
            timeout: DEFAULT_TIMEOUT,
            huggingface_config: None,
            gemini_config: None,
            anthropic_config: None,
        }
    }

    pub fn with_kind(mut self, kind: ProviderKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_huggingface(mut self, config: HuggingFaceConfig) -> Self {
        self.huggingface_config = Some(config);
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini_config = Some(config);
        self
    }

    pub fn with_anthropic(mut self, config: AnthropicConfig) -> Self {
        self.anthropic_config = Some(config);
        self
    }

    /// Build the router
    ///
    /// Providers without an explicit config use their defaults with the API
    /// key read from the environment. A missing key is not an error here;
    /// requests report it instead.
    pub fn build(self) -> Result<LLMRouter> {
        if self.timeout.is_zero() {
            return Err(LLMError::ConfigurationError {
                message: "timeout must be greater than zero".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| LLMError::ConfigurationError {
                message: e.to_string(),
            })?;

        let kind = self.kind.unwrap_or(ProviderKind::HuggingFace);
        let provider: Arc<dyn LLMProvider> = match kind {
            ProviderKind::HuggingFace => Arc::new(HuggingFaceProvider::new(
                self.huggingface_config
                    .unwrap_or_else(HuggingFaceConfig::from_env),
                client,
            )),
            ProviderKind::Gemini => Arc::new(GeminiProvider::new(
                self.gemini_config.unwrap_or_else(GeminiConfig::from_env),
                client,
            )),
            ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(
                self.anthropic_config
                    .unwrap_or_else(AnthropicConfig::from_env),
                client,
            )),
        };

        if !provider.is_configured() {
            tracing::warn!(
                provider = %kind,
                env = kind.api_key_env(),
                "API key not found; verse requests will fail until it is set"
            );
        }

        Ok(LLMRouter::new(provider))
    }
}

impl Default for LLMRouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! Server Configuration
//!
//! Layered from `config/default`, `config/local`, an optional file given on
//! the command line and `BIBLEVERSE__SECTION__KEY` environment variables.
//! CLI flags are applied on top in `main`.
//!
//! API keys are never part of this file; providers read them from
//! `HUGGINGFACE_API_KEY`, `GEMINI_API_KEY` or `ANTHROPIC_API_KEY`.

use anyhow::Context;
use bibleverse_llm::{AnthropicConfig, GeminiConfig, HuggingFaceConfig, ProviderKind};
use bibleverse_types::FailurePolicy;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server binding configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Verse provider configuration
    #[serde(default)]
    pub llm: LlmSettings,

    /// Failure handling
    #[serde(default)]
    pub verse: VerseSettings,

    /// API configuration
    #[serde(default)]
    pub api: ApiSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server binding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Time allowed for in-flight requests after a shutdown signal
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl ServerSettings {
    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }

    /// Get the shutdown timeout duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Verse provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// huggingface, gemini or anthropic
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Upper bound for one outbound call, in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub huggingface: ProviderSettings,

    #[serde(default)]
    pub gemini: ProviderSettings,

    #[serde(default)]
    pub anthropic: ProviderSettings,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            timeout_secs: default_llm_timeout(),
            huggingface: ProviderSettings::default(),
            gemini: ProviderSettings::default(),
            anthropic: ProviderSettings::default(),
        }
    }
}

impl LlmSettings {
    /// The configured provider
    pub fn provider_kind(&self) -> anyhow::Result<ProviderKind> {
        ProviderKind::from_str(&self.provider).with_context(|| {
            format!(
                "Unknown LLM provider '{}' (expected huggingface, gemini or anthropic)",
                self.provider
            )
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Hugging Face client settings with the key taken from the environment
    pub fn huggingface_config(&self) -> HuggingFaceConfig {
        let mut config = HuggingFaceConfig::from_env();
        self.huggingface.apply(&mut config.model, &mut config.base_url);
        config
    }

    /// Gemini client settings with the key taken from the environment
    pub fn gemini_config(&self) -> GeminiConfig {
        let mut config = GeminiConfig::from_env();
        self.gemini.apply(&mut config.model, &mut config.base_url);
        config
    }

    /// Anthropic client settings with the key taken from the environment
    pub fn anthropic_config(&self) -> AnthropicConfig {
        let mut config = AnthropicConfig::from_env();
        self.anthropic.apply(&mut config.model, &mut config.base_url);
        config
    }
}

/// Per-provider overrides; unset fields keep the provider defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl ProviderSettings {
    fn apply(&self, model: &mut String, base_url: &mut String) {
        if let Some(m) = &self.model {
            *model = m.clone();
        }
        if let Some(url) = &self.base_url {
            *base_url = url.trim_end_matches('/').to_string();
        }
    }
}

/// Verse failure handling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerseSettings {
    /// fallback or error
    #[serde(default = "default_failure_policy")]
    pub failure_policy: String,

    /// JSON file replacing the built-in fallback verses
    #[serde(default)]
    pub fallback_path: Option<PathBuf>,
}

impl Default for VerseSettings {
    fn default() -> Self {
        Self {
            failure_policy: default_failure_policy(),
            fallback_path: None,
        }
    }
}

impl VerseSettings {
    pub fn policy(&self) -> anyhow::Result<FailurePolicy> {
        FailurePolicy::from_str(&self.failure_policy).with_context(|| {
            format!(
                "Unknown failure policy '{}' (expected fallback or error)",
                self.failure_policy
            )
        })
    }
}

/// API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// CORS allowed origins
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable response compression
    #[serde(default = "default_true")]
    pub enable_compression: bool,

    /// Enable request tracing
    #[serde(default = "default_true")]
    pub enable_tracing: bool,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Directory served at `/`; the bundled page is used when unset
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: default_cors_origins(),
            enable_compression: true,
            enable_tracing: true,
            max_body_size: default_max_body_size(),
            static_dir: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Serve Prometheus metrics on a separate port
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

// =============================================================================
// Default Functions
// =============================================================================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_shutdown_timeout() -> u64 {
    5
}

fn default_provider() -> String {
    "huggingface".to_string()
}

fn default_llm_timeout() -> u64 {
    60
}

fn default_failure_policy() -> String {
    FailurePolicy::default().to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_max_body_size() -> usize {
    64 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl ServerConfig {
    /// Load configuration from environment and optional config file
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("BIBLEVERSE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("api.cors_origins"),
        );

        builder
            .build()?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Check every setting that would otherwise fail at request time
    pub fn validate(&self) -> anyhow::Result<()> {
        self.llm.provider_kind()?;
        self.verse.policy()?;
        self.server.socket_addr()?;

        if self.llm.timeout_secs == 0 {
            anyhow::bail!("llm.timeout_secs must be greater than zero");
        }
        if self.api.max_body_size == 0 {
            anyhow::bail!("api.max_body_size must be greater than zero");
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            anyhow::bail!(
                "Unknown log format '{}' (expected pretty or json)",
                self.logging.format
            );
        }
        if let Some(dir) = &self.api.static_dir {
            if !dir.is_dir() {
                anyhow::bail!("api.static_dir {} is not a directory", dir.display());
            }
        }
        if self.metrics.enabled && self.metrics.port == self.server.port {
            anyhow::bail!("metrics.port must differ from server.port");
        }

        Ok(())
    }
}

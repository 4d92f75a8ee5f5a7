//! Bible Verse Server
//!
//! Serves the verse recommendation API and the single-page UI.
//!
//! # Features
//!
//! - One configured verse provider (Hugging Face, Gemini or Anthropic)
//! - Fallback verses when the provider fails, or plain errors if preferred
//! - OpenAPI document at `/api-docs/openapi.json`
//! - Prometheus metrics export
//! - Graceful shutdown handling
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (Hugging Face, key from HUGGINGFACE_API_KEY)
//! bibleverse-server
//!
//! # Use Gemini and surface failures instead of serving fallback verses
//! bibleverse-server --provider gemini --failure-policy error
//!
//! # Start with environment overrides
//! BIBLEVERSE__SERVER__PORT=8080 bibleverse-server
//! ```

mod config;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{response::Html, routing::get, Router};
use bibleverse_api::{create_router, ApiConfig, AppState};
use bibleverse_llm::{LLMRouter, LLMRouterBuilder, ProviderKind};
use bibleverse_types::FallbackTable;
use clap::Parser;
use tokio::signal;
use tower_http::services::ServeDir;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::ServerConfig;

/// Page served at `/` when no static directory is configured
const INDEX_HTML: &str = include_str!("../static/index.html");

// =============================================================================
// CLI Arguments
// =============================================================================

/// Bible Verse Server - verse recommendations for life situations
#[derive(Parser, Debug)]
#[command(name = "bibleverse-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long, env = "BIBLEVERSE_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "BIBLEVERSE_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "BIBLEVERSE_PORT")]
    port: Option<u16>,

    /// Verse provider (huggingface, gemini, anthropic)
    #[arg(long, env = "BIBLEVERSE_PROVIDER")]
    provider: Option<String>,

    /// Behavior when the provider fails (fallback, error)
    #[arg(long, env = "BIBLEVERSE_FAILURE_POLICY")]
    failure_policy: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "BIBLEVERSE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "BIBLEVERSE_LOG_FORMAT")]
    log_format: Option<String>,

    /// Directory with the UI's static files
    #[arg(long, env = "BIBLEVERSE_STATIC_DIR")]
    static_dir: Option<std::path::PathBuf>,
}

impl Args {
    /// Override loaded configuration with CLI arguments
    fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(provider) = self.provider {
            config.llm.provider = provider;
        }
        if let Some(policy) = self.failure_policy {
            config.verse.failure_policy = policy;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Some(dir) = self.static_dir {
            config.api.static_dir = Some(dir);
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut server_config = ServerConfig::load(args.config.as_deref())?;
    args.apply(&mut server_config);

    // Initialize logging
    init_logging(&server_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Bible Verse Server"
    );

    // Validate configuration
    server_config.validate()?;
    let policy = server_config.verse.policy()?;

    // Initialize provider and fallback verses
    let llm = init_llm(&server_config)?;
    let fallback = init_fallback(&server_config)?;

    tracing::info!(
        provider = %llm.kind(),
        configured = llm.is_configured(),
        failure_policy = %policy,
        fallback_entries = fallback.len(),
        "Verse service ready"
    );

    // Create application state
    let state = Arc::new(AppState::new(llm, fallback, policy));

    // Create API configuration
    let api_config = ApiConfig {
        enable_cors: server_config.api.enable_cors,
        cors_origins: server_config.api.cors_origins.clone(),
        enable_compression: server_config.api.enable_compression,
        enable_tracing: server_config.api.enable_tracing,
        max_body_size: server_config.api.max_body_size,
    };

    // Create router
    let app = with_ui(create_router(state, api_config), &server_config);

    // Start metrics server if enabled
    if server_config.metrics.enabled {
        start_metrics_server(&server_config.metrics)?;
    }

    // Get bind address
    let addr = server_config.server.socket_addr()?;

    tracing::info!(
        host = %server_config.server.host,
        port = %server_config.server.port,
        "Server listening"
    );

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(server_config.server.shutdown_timeout()))
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

// =============================================================================
// Initialization Functions
// =============================================================================

/// Initialize tracing/logging
fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("Invalid log level '{}'", config.level))?;

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber
                .with(fmt::layer().json().with_target(true))
                .init();
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true))
                .init();
        }
    }

    Ok(())
}

/// Build the router for the configured provider
fn init_llm(config: &ServerConfig) -> anyhow::Result<LLMRouter> {
    let kind = config.llm.provider_kind()?;

    let builder = LLMRouterBuilder::new()
        .with_kind(kind)
        .with_timeout(config.llm.timeout());

    let builder = match kind {
        ProviderKind::HuggingFace => builder.with_huggingface(config.llm.huggingface_config()),
        ProviderKind::Gemini => builder.with_gemini(config.llm.gemini_config()),
        ProviderKind::Anthropic => builder.with_anthropic(config.llm.anthropic_config()),
    };

    Ok(builder.build()?)
}

/// Load the fallback verses, from file when configured
fn init_fallback(config: &ServerConfig) -> anyhow::Result<FallbackTable> {
    match &config.verse.fallback_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading fallback verses");
            FallbackTable::from_path(path)
                .with_context(|| format!("Invalid fallback file {}", path.display()))
        }
        None => Ok(FallbackTable::builtin()?),
    }
}

/// Serve the UI at `/`, from disk when a static directory is configured
fn with_ui(app: Router, config: &ServerConfig) -> Router {
    match &config.api.static_dir {
        Some(dir) => {
            app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true))
        }
        None => app.route("/", get(|| async { Html(INDEX_HTML) })),
    }
}

/// Start Prometheus metrics server
fn start_metrics_server(config: &config::MetricsConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    tracing::info!(port = config.port, "Starting metrics server");

    // The exporter serves /metrics from its own background task
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus exporter")?;

    Ok(())
}

// =============================================================================
// Graceful Shutdown
// =============================================================================

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
///
/// In-flight requests get `timeout` to finish before the process exits.
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    tracing::info!(
        timeout_secs = timeout.as_secs(),
        "Waiting for in-flight requests to complete..."
    );

    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        tracing::warn!("Shutdown timeout elapsed, exiting");
        std::process::exit(0);
    });
}

// =============================================================================
// Tests
// =============================================================================

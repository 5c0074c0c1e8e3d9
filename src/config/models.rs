//! Configuration data structures for the code-translator relay.
//!
//! This module defines the schema for the application settings: the HTTP
//! server, the upstream chat-completion providers, input limits and logging.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::models::catalog::{ModelTier, ProviderFamily};
use serde::{Deserialize, Serialize};

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port, workers).
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream chat-completion providers, one entry per model family.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Maximum accepted source length per model tier.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Performance and resource management settings.
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `3000`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of tokio worker threads.
    /// Default: Number of logical CPU cores.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Largest accepted request body in bytes.
    /// Default: `1048576` (1 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Answer CORS preflights for any origin, for UIs served elsewhere.
    /// Default: `false`
    #[serde(default)]
    pub cors_allow_any_origin: bool,
}

/// Where the bearer credential for a provider comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialSource {
    /// A per-deployment secret held in this process's configuration.
    Server,
    /// The caller supplies `apiKey` with every request.
    Client,
}

/// How completions from a provider are delivered back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
    /// Relay the upstream byte stream as it arrives.
    Stream,
    /// Await the full completion, sanitize it and answer with JSON.
    Buffered,
}

/// Settings for a single upstream provider family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL; `/chat/completions` is appended to it.
    pub api_base_url: String,

    /// Server-side credential, used when `credential_source` is `server`.
    #[serde(default)]
    pub api_key: Option<String>,

    pub credential_source: CredentialSource,

    pub delivery: Delivery,

    /// Bound on a buffered exchange, and on the wait for response headers
    /// when streaming.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Longest allowed gap between two streamed chunks.
    #[serde(default = "default_stream_idle_timeout")]
    pub stream_idle_timeout_seconds: u64,
}

/// Per-family provider table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_openai_provider")]
    pub openai: ProviderConfig,

    #[serde(default = "default_deepseek_provider")]
    pub deepseek: ProviderConfig,
}

impl ProvidersConfig {
    pub fn get(&self, family: ProviderFamily) -> &ProviderConfig {
        match family {
            ProviderFamily::OpenAi => &self.openai,
            ProviderFamily::DeepSeek => &self.deepseek,
        }
    }
}

/// Input length limits, counted in characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Default: `6000`
    #[serde(default = "default_basic_max_chars")]
    pub basic_max_chars: usize,

    /// Default: `12000`
    #[serde(default = "default_standard_max_chars")]
    pub standard_max_chars: usize,
}

impl LimitsConfig {
    pub fn max_chars(&self, tier: ModelTier) -> usize {
        match tier {
            ModelTier::Basic => self.basic_max_chars,
            ModelTier::Standard => self.standard_max_chars,
        }
    }
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`, `compact`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Whether to mask API keys echoed back in upstream error bodies.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub sanitize_tokens: bool,
}

/// Settings for tuning application performance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Maximum number of idle connections per host in the HTTP pool.
    /// Default: `32`
    #[serde(default = "default_pool_size")]
    pub connection_pool_size: usize,

    /// Whether to gzip JSON responses. Event streams are never compressed.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub enable_compression: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
            max_body_bytes: default_max_body_bytes(),
            cors_allow_any_origin: false,
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai: default_openai_provider(),
            deepseek: default_deepseek_provider(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            basic_max_chars: default_basic_max_chars(),
            standard_max_chars: default_standard_max_chars(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            sanitize_tokens: true,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            connection_pool_size: default_pool_size(),
            enable_compression: true,
        }
    }
}

// Helper functions for serde defaults and shared constants
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_openai_provider() -> ProviderConfig {
    ProviderConfig {
        api_base_url: "https://api.openai.com/v1".to_string(),
        api_key: None,
        credential_source: CredentialSource::Client,
        delivery: Delivery::Stream,
        timeout_seconds: default_timeout(),
        stream_idle_timeout_seconds: default_stream_idle_timeout(),
    }
}

fn default_deepseek_provider() -> ProviderConfig {
    ProviderConfig {
        api_base_url: "https://api.deepseek.com".to_string(),
        api_key: None,
        credential_source: CredentialSource::Server,
        delivery: Delivery::Buffered,
        timeout_seconds: default_timeout(),
        stream_idle_timeout_seconds: default_stream_idle_timeout(),
    }
}

fn default_timeout() -> u64 {
    120
}

fn default_stream_idle_timeout() -> u64 {
    60
}

fn default_basic_max_chars() -> usize {
    6000
}

fn default_standard_max_chars() -> usize {
    12000
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_pool_size() -> usize {
    32
}

//! Structured logging and security-focused trace utilities.
//!
//! This module configures the `tracing` ecosystem for the application,
//! supporting multiple output formats and providing utilities to prevent
//! API keys from leaking into logs.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::LoggingConfig;
use crate::error::Result;
use regex::Regex;
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber for the application.
///
/// Supports three output formats:
/// - `json`: Structured JSON logs for production ingestion.
/// - `compact`: Single-line human-readable output.
/// - `pretty` (default): Human-readable, colorized output for development.
///
/// Log levels are controlled via the `RUST_LOG` environment variable or
/// the provided `LoggingConfig`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    // Configure filter from environment or config file
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        "compact" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().compact())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

static SECRET_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_secret_regex() -> &'static Regex {
    SECRET_REGEX.get_or_init(|| {
        // OpenAI-style keys (`sk-...`, `sk-proj-...`) and bearer header values
        Regex::new(r"(?i)\bsk-[A-Za-z0-9_\-*]{4,}|\bbearer\s+[A-Za-z0-9._\-~+/=*]+")
            .expect("Invalid regex pattern")
    })
}

/// Sanitizes API keys from log messages.
///
/// Providers sometimes echo a (partially masked) key back in error bodies,
/// e.g. `Incorrect API key provided: sk-abc***xyz`. Every match is replaced
/// with `[REDACTED]` so the text can be logged safely.
pub fn sanitize(input: &str) -> String {
    get_secret_regex()
        .replace_all(input, "[REDACTED]")
        .into_owned()
}

/// Cut a string to at most `max` characters for log output.
pub fn truncate(input: &str, max: usize) -> String {
    if input.chars().count() <= max {
        input.to_string()
    } else {
        let mut out: String = input.chars().take(max).collect();
        out.push_str("...");
        out
    }
}

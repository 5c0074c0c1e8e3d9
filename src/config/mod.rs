// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{ProxyError, Result};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. CLI arguments (highest, applied by the caller)
    /// 2. Environment variables (`CODE_TRANSLATOR__SERVER__PORT`, plus the
    ///    legacy `OPENAI_API_HOST` / `OPENAI_API_KEY` / `DEEPSEEK_API_KEY`)
    /// 3. Config file (`path`, or `~/.code-translator/config.toml` if present)
    /// 4. Defaults (lowest)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::from(Self::default_config_path()).required(false),
        };

        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            .add_source(file)
            .add_source(
                Environment::with_prefix("CODE_TRANSLATOR")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_override_option("providers.openai.api_base_url", non_empty_env("OPENAI_API_HOST"))?
            .set_override_option("providers.openai.api_key", non_empty_env("OPENAI_API_KEY"))?
            .set_override_option("providers.deepseek.api_key", non_empty_env("DEEPSEEK_API_KEY"))?
            .build()
            .map_err(|e| ProxyError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ProxyError::Config(e.to_string()))
    }

    fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".code-translator")
            .join("config.toml")
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

// CLI module for code-translator
// Author: kelexine (https://github.com/kelexine)

use crate::config::AppConfig;
use clap::Parser;
use std::path::PathBuf;

/// code-translator - relay that translates source code through an LLM chat-completion API
#[derive(Parser, Debug)]
#[command(name = "code-translator", version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML config file (default: ~/.code-translator/config.toml)
    #[arg(long, env = "CODE_TRANSLATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind, overriding the config file
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on, overriding the config file
    #[arg(long, short = 'p', env = "PORT")]
    pub port: Option<u16>,
}

impl Args {
    /// Apply flag overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

// code-translator - LLM-backed source code translation relay
// Author: kelexine (https://github.com/kelexine)

pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod prompt;
pub mod relay;
pub mod sanitize;
pub mod server;
pub mod upstream;
pub mod utils;

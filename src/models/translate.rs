//! Inbound translate API type definitions.
//!
//! These are the bodies exchanged with the browser UI: the translate request,
//! the buffered success body and the error body.

// Author: kelexine (https://github.com/kelexine)

use serde::{Deserialize, Serialize};

/// Body of `POST /translate`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    /// Language the source is written in, e.g. `JavaScript`.
    pub input_language: String,

    /// Language to translate into, e.g. `Python`.
    pub output_language: String,

    /// The source text to translate.
    pub input_code: String,

    /// Model id; must be in the catalog.
    pub model: String,

    /// Caller-held credential, used when the provider delegates keys to clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

// Hand-written so the caller's key never ends up in logs.
impl std::fmt::Debug for TranslateRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslateRequest")
            .field("input_language", &self.input_language)
            .field("output_language", &self.output_language)
            .field("input_code_chars", &self.input_code.chars().count())
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Buffered-mode success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub code: String,
}

/// Error body for every failed translate call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// Error types for the code-translator relay
// Author: kelexine (https://github.com/kelexine)

use crate::models::ErrorBody;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Code must be under {max} characters. Current length: {len}")]
    InputTooLong { len: usize, max: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported model: {model}. Supported models: {supported}")]
    UnsupportedModel { model: String, supported: String },

    #[error("Missing API key: {0}")]
    MissingCredential(String),

    #[error("Upstream API error (HTTP {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Upstream response did not contain choices[0].message.content")]
    UpstreamContentMissing,

    #[error("Upstream request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Stream aborted: {0}")]
    StreamAbort(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    /// HTTP status the relay answers with. Only a method mismatch gets a
    /// dedicated status; every other failure surfaces as a 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::MethodNotAllowed => "method_not_allowed",
            ProxyError::InvalidRequest(_) | ProxyError::InputTooLong { .. } => "validation_error",
            ProxyError::Config(_)
            | ProxyError::ConfigParsing(_)
            | ProxyError::UnsupportedModel { .. }
            | ProxyError::MissingCredential(_) => "configuration_error",
            ProxyError::Upstream { .. } | ProxyError::Http(_) => "upstream_error",
            ProxyError::UpstreamContentMissing => "upstream_content_missing",
            ProxyError::Timeout(_) => "timeout",
            ProxyError::StreamAbort(_) => "stream_abort",
            _ => "internal_error",
        }
    }
}

// Convert ProxyError to HTTP responses for Axum
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;

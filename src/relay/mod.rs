//! Translate request relay.
//!
//! Drives one translate request through validation, prompt construction and
//! the upstream call, and hands back either a live byte stream or the
//! sanitized code. HTTP concerns (status codes, headers, body encoding) stay
//! in the server layer; this module is usable without axum.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::{AppConfig, CredentialSource, Delivery, LimitsConfig, ProviderConfig, ProvidersConfig};
use crate::error::{ProxyError, Result};
use crate::models::catalog;
use crate::models::{ProviderFamily, TranslateRequest, UpstreamRequest};
use crate::prompt::build_prompt;
use crate::sanitize::sanitize_completion;
use crate::upstream::{Credential, UpstreamByteStream, UpstreamClient, UpstreamResponse};
use tracing::{debug, info};

/// Outcome of a successful translate call.
pub enum TranslateResult {
    /// Upstream bytes to pass through verbatim.
    Stream(UpstreamByteStream),
    /// Sanitized code from a buffered completion.
    Code(String),
}

impl TranslateResult {
    pub fn mode(&self) -> &'static str {
        match self {
            TranslateResult::Stream(_) => "stream",
            TranslateResult::Code(_) => "buffered",
        }
    }
}

pub struct Relay {
    client: UpstreamClient,
    providers: ProvidersConfig,
    limits: LimitsConfig,
}

impl Relay {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            client: UpstreamClient::new(&config.performance)?,
            providers: config.providers.clone(),
            limits: config.limits.clone(),
        })
    }

    pub fn providers(&self) -> &ProvidersConfig {
        &self.providers
    }

    /// Run one translate request.
    ///
    /// Every check happens before the upstream call, so a rejected request
    /// never reaches the provider. Exactly one upstream attempt is made.
    pub async fn translate(&self, req: TranslateRequest) -> Result<TranslateResult> {
        // Validating
        let spec = catalog::lookup(&req.model)?;
        validate_request(&req, self.limits.max_chars(spec.tier))?;

        let provider = self.providers.get(spec.family);
        let credential = resolve_credential(spec.family, provider, req.api_key.as_deref())?;

        // Dispatched
        let upstream_req = UpstreamRequest {
            prompt: build_prompt(&req.input_language, &req.output_language, &req.input_code),
            model: req.model,
            stream: provider.delivery == Delivery::Stream,
        };

        info!(
            "Dispatching translation {} -> {} to {} (model={}, stream={})",
            req.input_language,
            req.output_language,
            spec.family.as_str(),
            upstream_req.model,
            upstream_req.stream
        );

        match self
            .client
            .send(spec.family, provider, &upstream_req, &credential)
            .await?
        {
            UpstreamResponse::Stream(stream) => Ok(TranslateResult::Stream(stream)),
            UpstreamResponse::Buffered(content) => {
                let code = sanitize_completion(&content);
                debug!(
                    "Sanitized completion: {} chars in, {} chars out",
                    content.chars().count(),
                    code.chars().count()
                );
                Ok(TranslateResult::Code(code))
            }
        }
    }
}

/// Shallow field checks plus the per-tier length limit.
///
/// Source and target language being equal is left to the caller.
pub fn validate_request(req: &TranslateRequest, max_chars: usize) -> Result<()> {
    if req.input_language.trim().is_empty() || req.output_language.trim().is_empty() {
        return Err(ProxyError::InvalidRequest(
            "inputLanguage and outputLanguage are required".to_string(),
        ));
    }

    if req.input_code.trim().is_empty() {
        return Err(ProxyError::InvalidRequest("Please enter some code.".to_string()));
    }

    let len = req.input_code.chars().count();
    if len > max_chars {
        return Err(ProxyError::InputTooLong { len, max: max_chars });
    }

    Ok(())
}

/// Pick the bearer credential for a call.
///
/// Client-delegated providers use the caller's `apiKey` and fall back to a
/// configured server key when the caller sends none. Server providers only
/// ever use the configured key; a caller key is ignored.
pub fn resolve_credential(
    family: ProviderFamily,
    provider: &ProviderConfig,
    caller_key: Option<&str>,
) -> Result<Credential> {
    let caller_key = caller_key.map(str::trim).filter(|k| !k.is_empty());
    let server_key = provider
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty());

    match provider.credential_source {
        CredentialSource::Client => caller_key
            .or(server_key)
            .map(Credential::new)
            .ok_or_else(|| {
                ProxyError::MissingCredential(format!(
                    "the {} provider expects the caller to send apiKey",
                    family.as_str()
                ))
            }),
        CredentialSource::Server => server_key.map(Credential::new).ok_or_else(|| {
            ProxyError::Config(format!(
                "no server API key configured for the {} provider",
                family.as_str()
            ))
        }),
    }
}

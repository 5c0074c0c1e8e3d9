// Chat-completion API client (streaming and buffered)
// Author: kelexine (https://github.com/kelexine)

use super::{Credential, RelayStream, UpstreamByteStream, UpstreamResponse};
use crate::config::{PerformanceConfig, ProviderConfig};
use crate::error::{ProxyError, Result};
use crate::metrics;
use crate::models::upstream::{extract_content, ChatCompletionRequest, UpstreamRequest};
use crate::models::ProviderFamily;
use crate::utils::logging::{sanitize, truncate};
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Client for OpenAI-compatible chat-completion endpoints.
///
/// One instance is shared by every request; it only owns the pooled HTTP
/// client. Provider settings and credentials are passed per call, so nothing
/// here carries request state.
pub struct UpstreamClient {
    http_client: Client,
}

impl UpstreamClient {
    /// Create a new client with a pooled, keep-alive HTTP connection set.
    ///
    /// No global request timeout is set here: it would also cut long streams.
    /// Timeouts are applied per call from the provider settings instead.
    pub fn new(performance: &PerformanceConfig) -> Result<Self> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(performance.connection_pool_size)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .build()
            .map_err(|e| ProxyError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Created upstream HTTP client with connection pooling and keep-alive");

        Ok(Self { http_client })
    }

    /// Issue one chat-completion call in the mode `request.stream` selects.
    ///
    /// A single attempt is made; failures are returned to the caller as-is.
    pub async fn send(
        &self,
        family: ProviderFamily,
        provider: &ProviderConfig,
        request: &UpstreamRequest,
        credential: &Credential,
    ) -> Result<UpstreamResponse> {
        if request.stream {
            self.stream(family, provider, request, credential)
                .await
                .map(UpstreamResponse::Stream)
        } else {
            self.complete(family, provider, request, credential)
                .await
                .map(UpstreamResponse::Buffered)
        }
    }

    /// Buffered call: await the whole body and return the completion text.
    pub async fn complete(
        &self,
        family: ProviderFamily,
        provider: &ProviderConfig,
        request: &UpstreamRequest,
        credential: &Credential,
    ) -> Result<String> {
        let timeout = provider.timeout_seconds;
        let started = Instant::now();

        debug!("Calling {} chat completions (buffered) for model: {}", family.as_str(), request.model);

        let response = self
            .build_request(provider, request, credential)
            .timeout(Duration::from_secs(timeout))
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        let response = Self::check_status(family, false, started, response).await?;
        let status = response.status().as_u16();

        let response_text = response
            .text()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        metrics::record_upstream_call(family.as_str(), false, status, started.elapsed().as_secs_f64());

        debug!(
            "Raw completion body (first 500 chars): {}",
            truncate(&response_text, 500)
        );

        let body: serde_json::Value = match serde_json::from_str(&response_text) {
            Ok(body) => body,
            Err(e) => {
                warn!("Upstream returned a non-JSON completion body: {}", e);
                return Err(ProxyError::UpstreamContentMissing);
            }
        };

        extract_content(&body)
            .map(str::to_string)
            .ok_or(ProxyError::UpstreamContentMissing)
    }

    /// Streaming call: wait for response headers, then hand back the raw body
    /// stream without buffering or re-framing it.
    pub async fn stream(
        &self,
        family: ProviderFamily,
        provider: &ProviderConfig,
        request: &UpstreamRequest,
        credential: &Credential,
    ) -> Result<UpstreamByteStream> {
        let timeout = provider.timeout_seconds;
        let started = Instant::now();

        debug!("Calling {} chat completions (stream) for model: {}", family.as_str(), request.model);

        let pending = self
            .build_request(provider, request, credential)
            .header(ACCEPT, "text/event-stream")
            .send();

        // Covers the headers and, on a non-2xx status, the error body read
        let response = tokio::time::timeout(Duration::from_secs(timeout), async {
            let response = pending.await.map_err(|e| transport_error(e, timeout))?;
            Self::check_status(family, true, started, response).await
        })
        .await
        .map_err(|_| ProxyError::Timeout(timeout))??;

        metrics::record_upstream_call(
            family.as_str(),
            true,
            response.status().as_u16(),
            started.elapsed().as_secs_f64(),
        );

        Ok(RelayStream::new(
            response.bytes_stream().boxed(),
            family.as_str(),
            Duration::from_secs(provider.stream_idle_timeout_seconds),
        ))
    }

    fn build_request(
        &self,
        provider: &ProviderConfig,
        request: &UpstreamRequest,
        credential: &Credential,
    ) -> RequestBuilder {
        self.http_client
            .post(completions_url(&provider.api_base_url))
            .bearer_auth(credential.expose())
            .header(CONTENT_TYPE, "application/json")
            .json(&ChatCompletionRequest::from(request))
    }

    /// Turn a non-2xx response into `ProxyError::Upstream` carrying the raw
    /// body text. The body is not assumed to be JSON.
    async fn check_status(
        family: ProviderFamily,
        streaming: bool,
        started: Instant,
        response: Response,
    ) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        metrics::record_upstream_call(
            family.as_str(),
            streaming,
            status.as_u16(),
            started.elapsed().as_secs_f64(),
        );
        error!(
            "{} API error: HTTP {} - Response body: {}",
            family.as_str(),
            status,
            sanitize(&truncate(&error_text, 1000))
        );

        Err(ProxyError::Upstream {
            status: status.as_u16(),
            body: error_text,
        })
    }
}

/// `<base>/chat/completions`, tolerating a trailing slash on the base.
pub fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn transport_error(e: reqwest::Error, timeout_seconds: u64) -> ProxyError {
    if e.is_timeout() {
        ProxyError::Timeout(timeout_seconds)
    } else {
        ProxyError::Http(e)
    }
}

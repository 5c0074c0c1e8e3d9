// HTTP request handlers
// Author: kelexine (https://github.com/kelexine)

use super::routes::AppState;
use crate::config::{CredentialSource, Delivery};
use crate::error::ProxyError;
use crate::metrics;
use crate::models::catalog::{self, ProviderFamily};
use crate::models::{TranslateRequest, TranslateResponse};
use crate::relay::TranslateResult;
use crate::upstream::UpstreamByteStream;
use crate::utils::logging::{sanitize, truncate};
use axum::body::{Body, Bytes};
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: HashMap<String, HealthCheck>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub message: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut checks = HashMap::new();
    let mut overall_status = HealthStatus::Healthy;

    for family in [ProviderFamily::OpenAi, ProviderFamily::DeepSeek] {
        let provider = state.relay.providers().get(family);
        let has_server_key = provider
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty());
        let delivery = match provider.delivery {
            Delivery::Stream => "stream",
            Delivery::Buffered => "buffered",
        };

        let check = match provider.credential_source {
            CredentialSource::Server if !has_server_key => {
                overall_status = HealthStatus::Degraded;
                HealthCheck {
                    status: "error".to_string(),
                    message: "No server API key configured".to_string(),
                }
            }
            CredentialSource::Server => HealthCheck {
                status: "ok".to_string(),
                message: format!("{} ({}), server key", provider.api_base_url, delivery),
            },
            CredentialSource::Client => HealthCheck {
                status: "ok".to_string(),
                message: format!(
                    "{} ({}), caller-supplied key{}",
                    provider.api_base_url,
                    delivery,
                    if has_server_key { " with server fallback" } else { "" }
                ),
            },
        };
        checks.insert(format!("provider_{}", family.as_str()), check);
    }

    checks.insert(
        "models".to_string(),
        HealthCheck {
            status: "ok".to_string(),
            message: catalog::supported_models().join(", "),
        },
    );

    Json(HealthResponse {
        status: overall_status,
        checks,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Handler for `POST /translate`
pub async fn translate_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    // Body rejections (size limit, read failure) share the relay's error shape
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let reason = rejection.body_text();
            error!("Failed to read translate request body: {}", reason);
            return failure(
                &state,
                "unknown",
                ProxyError::InvalidRequest(format!("Unreadable request body: {}", reason)),
            );
        }
    };

    // Parse by hand so a malformed body gets the relay's error shape
    let req: TranslateRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            error!("Failed to deserialize translate request: {}", e);
            return failure(
                &state,
                "unknown",
                ProxyError::InvalidRequest(format!("Malformed request body: {}", e)),
            );
        }
    };

    let model_label = catalog::canonical_id(&req.model).unwrap_or("unknown");

    info!(
        "Received translate request: model={}, {} -> {}, {} chars",
        req.model,
        req.input_language,
        req.output_language,
        req.input_code.chars().count()
    );

    match state.relay.translate(req).await {
        Ok(result) => {
            metrics::record_request(model_label, result.mode(), 200);
            match result {
                TranslateResult::Stream(stream) => stream_response(stream),
                TranslateResult::Code(code) => Json(TranslateResponse { code }).into_response(),
            }
        }
        Err(e) => failure(&state, model_label, e),
    }
}

/// Any non-POST method on the translate routes.
pub async fn method_not_allowed() -> ProxyError {
    metrics::record_error(ProxyError::MethodNotAllowed.kind());
    ProxyError::MethodNotAllowed
}

pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

fn failure(state: &AppState, model: &str, err: ProxyError) -> Response {
    let message = err.to_string();
    let message = if state.config.logging.sanitize_tokens {
        sanitize(&message)
    } else {
        message
    };
    error!("Translate request failed ({}): {}", err.kind(), truncate(&message, 1000));

    metrics::record_error(err.kind());
    metrics::record_request(model, "none", err.status_code().as_u16());
    err.into_response()
}

/// Pass the upstream bytes through under an event-stream content type.
///
/// Once these headers are sent the status can no longer change: a later
/// upstream failure just ends the body and the connection is closed.
fn stream_response(stream: UpstreamByteStream) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header("X-Accel-Buffering", "no")
        .body(Body::from_stream(stream))
        .unwrap_or_else(|e| {
            ProxyError::Internal(format!("Failed to build stream response: {}", e)).into_response()
        })
}

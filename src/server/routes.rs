// HTTP routes configuration
// Author: kelexine (https://github.com/kelexine)

use super::handlers::{health_handler, method_not_allowed, metrics_handler, translate_handler};
use super::middleware::{cors_layer, request_id_layers};
use crate::config::AppConfig;
use crate::error::Result;
use crate::relay::Relay;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub relay: Arc<Relay>,
}

pub fn create_router(config: AppConfig) -> Result<Router> {
    let relay = Relay::new(&config)?;
    let max_body_bytes = config.server.max_body_bytes;
    let enable_compression = config.performance.enable_compression;
    let cors_allow_any_origin = config.server.cors_allow_any_origin;

    let state = AppState {
        config: Arc::new(config),
        relay: Arc::new(relay),
    };

    let (set_request_id, propagate_request_id) = request_id_layers();

    // POST only; every other method answers 405 with a JSON error body.
    // The size limit is enforced by the handler's body extractor, so the
    // fallback never reads the body and an oversize POST still gets `{error}`.
    let translate = post(translate_handler)
        .fallback(method_not_allowed)
        .layer(DefaultBodyLimit::max(max_body_bytes));

    let mut app = Router::new()
        .route("/translate", translate.clone())
        .route("/api/translate", translate)
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler));

    // The default predicate skips text/event-stream, so streams stay unbuffered
    if enable_compression {
        app = app.layer(CompressionLayer::new());
    }
    if cors_allow_any_origin {
        app = app.layer(cors_layer());
    }

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id)
        .layer(set_request_id)
        .with_state(state);

    Ok(app)
}

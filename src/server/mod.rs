//! Axum-based HTTP server implementation for the code-translator relay.
//!
//! This module is responsible for setting up the HTTP server, configuring
//! routes and turning relay outcomes into HTTP responses for the browser UI.
//!
//! # Components
//!
//! - `handlers`: Implementation of individual endpoints (translate, health, metrics).
//! - `middleware`: Request ID tracking and CORS.
//! - `routes`: The main router configuration that ties everything together.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod handlers;
mod middleware;
mod routes;

pub use handlers::{HealthCheck, HealthResponse, HealthStatus};
pub use routes::{create_router, AppState};

// code-translator - LLM-backed source code translation relay
// Author: kelexine (https://github.com/kelexine)

use anyhow::Result;
use clap::Parser;
use code_translator::cli::Args;
use code_translator::config::{AppConfig, CredentialSource};
use code_translator::models::catalog::{models_for, ProviderFamily};
use code_translator::server::create_router;
use code_translator::utils::logging;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting code-translator v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Build the runtime with the configured worker count
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers.max(1))
        .enable_all()
        .build()?;

    runtime.block_on(run(config))
}

async fn run(config: AppConfig) -> Result<()> {
    for family in [ProviderFamily::OpenAi, ProviderFamily::DeepSeek] {
        let provider = config.providers.get(family);
        info!(
            "Provider {}: {} (delivery={:?}, credentials={:?}, models: {})",
            family.as_str(),
            provider.api_base_url,
            provider.delivery,
            provider.credential_source,
            models_for(family).join(", ")
        );
        if provider.api_key.is_none() && provider.credential_source == CredentialSource::Server {
            warn!("Provider {} has no server API key; its models will fail", family.as_str());
        }
    }

    // Phase 4: Build and start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let app = create_router(config)?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 5: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

//! Brand Server
//!
//! Manages brand details for the order form. Details are entered directly or
//! extracted from uploaded PDFs.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use brand_server::config::Config;
use brand_server::db::MongoBrandStore;
use brand_server::extract::{PdfToTextConfig, PdfToTextExtractor, TextExtractor};
use brand_server::routes;
use brand_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env first so RUST_LOG from it applies
    let dotenv = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "brand_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    if let Err(e) = dotenv {
        tracing::info!("No .env file loaded ({}); relying on process environment", e);
    }

    let config = Config::from_env().context("Invalid configuration")?;

    tracing::info!("Starting Brand Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "MongoDB database: {}, collection: {}",
        config.database.database,
        config.database.collection
    );

    // Connect and ensure indexes before accepting traffic
    let store = MongoBrandStore::connect(&config.database)
        .await
        .context("Failed to initialize MongoDB")?;

    let extractor = PdfToTextExtractor::new(PdfToTextConfig::from(&config.extractor));
    if extractor.is_available().await {
        tracing::info!("PDF extraction via {}", extractor.name());
    } else {
        tracing::warn!(
            "{} not found; PDF uploads will fail until poppler-utils is installed",
            extractor.name()
        );
    }

    let app_state = AppState::new(
        Arc::new(store.clone()),
        Arc::new(extractor),
        config.limits.clone(),
    );

    let cors = routes::cors_layer(&config.server.cors_allowed_origins)
        .context("Invalid CORS_ALLOWED_ORIGINS")?;

    let app = routes::router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.server.host, config.server.port))?;
    tracing::info!("Brand Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    store.client().clone().shutdown().await;
    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}

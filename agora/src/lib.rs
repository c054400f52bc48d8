/*!
# Agora Server

HTTP boundary for the Agora community forum and structured-debate platform.

Handlers authenticate the caller, hand the request to the
[`DeliberationService`](services::DeliberationService) and map failures
through [`AgoraError`](error::AgoraError).
*/

use std::net::SocketAddr;
use std::sync::Arc;

use agora_core::{ModerationScanner, TermLists};
use agora_store::InMemoryStore;
use anyhow::{Context, Result};
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod auth;
pub mod config;
pub mod error;
pub mod health;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use crate::config::AppConfig;
use crate::state::{AppState, SharedState};

/// Build the router over an existing state
pub fn app(state: SharedState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health::check_health))
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Load the moderation term lists named by the configuration, or the built-in ones
pub fn load_scanner(config: &AppConfig) -> Result<ModerationScanner> {
    let terms = match &config.moderation_terms {
        Some(path) => {
            info!("Loading moderation terms from {}", path.display());
            TermLists::from_json_file(path)
                .with_context(|| format!("AGORA_MODERATION_TERMS={}", path.display()))?
        }
        None => TermLists::default(),
    };
    Ok(ModerationScanner::new(terms)?)
}

/// State backed by a fresh in-memory store
pub fn in_memory_state(config: AppConfig) -> Result<SharedState> {
    let scanner = load_scanner(&config)?;
    let store = Arc::new(InMemoryStore::new());
    Ok(Arc::new(AppState::new(config, store, scanner)))
}

/// Bind and serve until Ctrl+C or SIGTERM
pub async fn serve(config: AppConfig) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(environment = ?config.environment, "Initializing state...");
    let state = in_memory_state(config)?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Agora running on {}", addr);

    axum::serve(listener, app(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(err) => {
                warn!("Failed to install Ctrl+C handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                warn!("Failed to install signal handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

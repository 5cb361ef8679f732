//! Leiserchess Web Server
//!
//! Serves the browser GUI and relays its move requests to one long-running
//! engine process.
//! Endpoints:
//! - GET  /                     - The GUI (`index.html`)
//! - GET  /<path>.{html,js,css,png} - GUI files under the serving root
//! - POST /move/                - Ask the engine for a move (form fields)

use anyhow::{Context, Result};
use axum::{routing::post, Router};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uci_bridge::{EngineProcess, MoveBridge};

mod central_config;
mod config;
mod error;
mod handlers;
mod static_files;
mod types;

use config::Config;
use handlers::{play_move, serve_file};

/// Shared application state
pub struct AppState {
    /// Worker that owns the engine process
    pub bridge: MoveBridge,
    /// Directory GUI files are served from
    pub static_root: PathBuf,
}

/// Create the application router with the given state.
/// This is separated out for testing purposes.
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/move/", post(play_move).fallback(serve_file))
        .route("/move/*rest", post(play_move).fallback(serve_file))
        .fallback(serve_file)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create application state around a stub engine (no process, no logging)
#[cfg(test)]
pub async fn create_test_state(
    stub: uci_bridge::stub::StubEngine,
    static_root: &std::path::Path,
) -> Arc<AppState> {
    let mut engine = stub.spawn();
    engine.handshake().await.expect("stub handshake failed");
    let bridge = MoveBridge::spawn(engine).expect("stub engine not ready");

    Arc::new(AppState {
        bridge,
        static_root: static_root.to_path_buf(),
    })
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

/// Creates a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping server...");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load();
    config.validate()?;
    init_tracing(&config.log_level)?;
    central_config::log_config_source();
    info!(
        "Configuration: engine={}, static_root={}",
        config.engine_path, config.static_root
    );

    // The engine must be ready before the listener exists
    let mut engine = EngineProcess::spawn(&config.engine_path, &config.engine_args)
        .with_context(|| format!("Failed to start engine '{}'", config.engine_path))?;
    engine
        .handshake()
        .await
        .context("Engine did not complete the handshake")?;
    let bridge = MoveBridge::spawn(engine)?;

    let state = Arc::new(AppState {
        bridge: bridge.clone(),
        static_root: PathBuf::from(&config.static_root),
    });
    let app = create_app(state);

    let addr = config.addr();
    info!("Starting Leiserchess at {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    bridge.shutdown().await;
    info!("Server shut down gracefully");
    Ok(())
}

// ============================================================================
// Integration Tests
// ============================================================================

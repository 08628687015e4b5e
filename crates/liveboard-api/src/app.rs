//! Application builder: wires router and middleware, then serves.

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use liveboard_core::error::{AppError, ErrorKind};
use liveboard_core::result::AppResult;
use liveboard_realtime::ChatEngine;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Serves `state` on the configured address until Ctrl+C or SIGTERM, then
/// shuts the chat engine down.
pub async fn serve(state: AppState) -> AppResult<()> {
    state.engine.start().await?;

    let addr = state.config.server.bind_address();
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e)
    })?;

    info!(address = %addr, "LiveBoard server listening");

    let engine = state.engine.clone();
    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal(engine.clone()))
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))?;

    engine.release_presence().await;
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM, then closes every socket so graceful
/// shutdown is not held up by long-lived WebSocket connections.
async fn shutdown_signal(engine: ChatEngine) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received");
    engine.shutdown();
}

//! Application builder: wires configuration, persistence and storage into
//! a served Axum app.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tracing::info;

use assetdeck_core::config::AppConfig;
use assetdeck_core::error::AppError;
use assetdeck_database::AssetStore;
use assetdeck_storage::StorageManager;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(config: AppConfig, store: Arc<dyn AssetStore>, storage: StorageManager) -> Router {
    build_router(AppState::new(config, store, storage))
}

/// Open the configured backends and serve until `shutdown` resolves.
pub async fn run_server(
    config: AppConfig,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), AppError> {
    info!(
        database = ?config.database.backend,
        storage = ?config.storage.provider,
        "Starting AssetDeck server"
    );

    let store = assetdeck_database::open_store(&config.database).await?;
    let storage = StorageManager::from_config(&config.storage).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let app = build_app(config, store, storage);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(address = %addr, "AssetDeck server listening");

    let (done_tx, done_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown.await;
        info!("Shutdown signal received, draining connections");
        let _ = done_tx.send(());
    });

    let server = tokio::spawn(async move { server.await });

    tokio::select! {
        result = server => {
            result
                .map_err(|e| AppError::internal(format!("Server task failed: {e}")))?
                .map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = async {
            let _ = done_rx.await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(grace_seconds = grace.as_secs(), "Graceful shutdown timed out");
        }
    }

    info!("AssetDeck server stopped");
    Ok(())
}

//! Route definitions for the AssetDeck HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = upload_body_limit(&state);

    let api_routes = Router::new()
        .merge(folder_routes())
        .merge(resource_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Largest request body: a full batch of maximum-size files. Oversized
/// files must still reach the ingest service to be reported per file.
fn upload_body_limit(state: &AppState) -> usize {
    let storage = &state.config.storage;
    let limit = storage
        .max_upload_size_bytes
        .saturating_mul(storage.max_batch_files.max(1) as u64)
        .saturating_add(1024 * 1024);
    usize::try_from(limit).unwrap_or(usize::MAX)
}

/// Folder CRUD, tree, removal and download
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/folders",
            get(handlers::folder::list_root_folders).post(handlers::folder::create_folder),
        )
        .route("/folders/tree", get(handlers::folder::get_tree))
        .route(
            "/folders/{id}",
            get(handlers::folder::get_folder)
                .put(handlers::folder::rename_folder)
                .delete(handlers::folder::delete_folder),
        )
        .route("/folders/{id}/children", get(handlers::folder::list_children))
        .route("/folders/{id}/resources", get(handlers::folder::list_resources))
        .route("/folders/{id}/move", put(handlers::folder::move_folder))
        .route("/folders/{id}/copy", post(handlers::folder::copy_folder))
        .route("/folders/{id}/clear", post(handlers::folder::clear_folder))
        .route("/folders/{id}/download", get(handlers::folder::download_folder))
}

/// Batch upload and single-resource operations
fn resource_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/resources/upload",
            post(handlers::resource::upload_resources),
        )
        .route(
            "/resources/{id}",
            get(handlers::resource::get_resource)
                .put(handlers::resource::update_resource)
                .delete(handlers::resource::delete_resource),
        )
        .route("/resources/{id}/move", put(handlers::resource::move_resource))
        .route("/resources/{id}/usage", post(handlers::resource::record_usage))
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

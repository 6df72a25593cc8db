//! # assetdeck-api
//!
//! HTTP API layer for AssetDeck built on Axum.
//!
//! Provides the REST endpoints for folders and resources, middleware
//! (CORS, request logging), the owner extractor, DTOs and the mapping
//! from `AppError` to the JSON error envelope.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;

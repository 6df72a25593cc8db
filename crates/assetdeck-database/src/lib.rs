//! # assetdeck-database
//!
//! Persistence for folders and resources. Every operation runs inside an
//! [`AssetTx`] obtained from an [`AssetStore`]; the transaction boundary
//! is the only concurrency primitive. Two backends are provided:
//! PostgreSQL through sqlx, and an in-memory store used by tests and
//! throwaway deployments.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod store;

use std::sync::Arc;

use tracing::info;

use assetdeck_core::config::{DatabaseBackend, DatabaseConfig};
use assetdeck_core::result::AppResult;

pub use connection::DatabasePool;
pub use memory::MemoryAssetStore;
pub use postgres::PgAssetStore;
pub use store::{AssetStore, AssetTx, FolderRepository, ResourceRepository};

/// Open the store selected by configuration, running migrations when asked.
pub async fn open_store(config: &DatabaseConfig) -> AppResult<Arc<dyn AssetStore>> {
    match config.backend {
        DatabaseBackend::Memory => {
            info!("Using in-memory asset store");
            Ok(Arc::new(MemoryAssetStore::new()))
        }
        DatabaseBackend::Postgres => {
            let pool = DatabasePool::connect(config).await?;
            if config.run_migrations {
                migration::run_migrations(pool.pool()).await?;
            }
            Ok(Arc::new(PgAssetStore::new(pool.into_pool())))
        }
    }
}

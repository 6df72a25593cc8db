//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use assetdeck_core::config::AppConfig;
use assetdeck_database::AssetStore;
use assetdeck_storage::{ImageProbe, StorageManager};

use assetdeck_service::folder::{ArchiveService, FolderService, RemovalService, TreeService};
use assetdeck_service::resource::{IngestService, ResourceService};

/// Shared application state, cloned into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Persistence backend.
    pub store: Arc<dyn AssetStore>,
    /// Physical file storage.
    pub storage: StorageManager,

    /// Folder CRUD, rename, move and copy.
    pub folder_service: Arc<FolderService>,
    /// Tree reconciliation.
    pub tree_service: Arc<TreeService>,
    /// Folder delete and clear.
    pub removal_service: Arc<RemovalService>,
    /// Folder download.
    pub archive_service: Arc<ArchiveService>,
    /// Single-resource operations.
    pub resource_service: Arc<ResourceService>,
    /// Batch upload.
    pub ingest_service: Arc<IngestService>,
}

impl AppState {
    /// Wire every service on top of a store and storage manager.
    pub fn new(config: AppConfig, store: Arc<dyn AssetStore>, storage: StorageManager) -> Self {
        let folder_service = Arc::new(FolderService::new(Arc::clone(&store)));
        let tree_service = Arc::new(TreeService::new(Arc::clone(&store)));
        let removal_service = Arc::new(RemovalService::new(Arc::clone(&store), storage.clone()));
        let archive_service = Arc::new(ArchiveService::new(Arc::clone(&store), storage.clone()));
        let resource_service = Arc::new(ResourceService::new(Arc::clone(&store), storage.clone()));
        let ingest_service = Arc::new(IngestService::new(
            Arc::clone(&store),
            storage.clone(),
            Arc::new(ImageProbe),
            &config.storage,
        ));

        Self {
            config: Arc::new(config),
            store,
            storage,
            folder_service,
            tree_service,
            removal_service,
            archive_service,
            resource_service,
            ingest_service,
        }
    }
}

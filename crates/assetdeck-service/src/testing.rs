//! Shared fixtures for service tests.

use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use assetdeck_core::config::StorageConfig;
use assetdeck_core::path;
use assetdeck_database::{AssetStore, MemoryAssetStore};
use assetdeck_entity::category::AssetCategory;
use assetdeck_entity::folder::Folder;
use assetdeck_entity::resource::{CreateResource, Resource};
use assetdeck_storage::providers::MemoryStorageProvider;
use assetdeck_storage::{ImageProbe, StorageManager};

use crate::context::RequestContext;
use crate::folder::{ArchiveService, CreateFolderRequest, FolderService, RemovalService, TreeService};
use crate::resource::{IngestService, ResourceService};

/// Encode a blank PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::new(width, height);
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

/// Every service wired to in-memory backends, acting as one owner.
pub struct Harness {
    pub ctx: RequestContext,
    pub store: Arc<dyn AssetStore>,
    pub objects: MemoryStorageProvider,
    pub storage: StorageManager,
    pub folders: FolderService,
    pub tree: TreeService,
    pub removal: RemovalService,
    pub archive: ArchiveService,
    pub resources: ResourceService,
    pub ingest: IngestService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_storage_config(StorageConfig::default())
    }

    pub fn with_storage_config(config: StorageConfig) -> Self {
        let store: Arc<dyn AssetStore> = Arc::new(MemoryAssetStore::new());
        let objects = MemoryStorageProvider::new();
        let storage = StorageManager::new(Arc::new(objects.clone()));
        Self {
            ctx: RequestContext::new(Uuid::new_v4()),
            folders: FolderService::new(store.clone()),
            tree: TreeService::new(store.clone()),
            removal: RemovalService::new(store.clone(), storage.clone()),
            archive: ArchiveService::new(store.clone(), storage.clone()),
            resources: ResourceService::new(store.clone(), storage.clone()),
            ingest: IngestService::new(
                store.clone(),
                storage.clone(),
                Arc::new(ImageProbe),
                &config,
            ),
            store,
            objects,
            storage,
        }
    }

    /// Number of physical objects in storage.
    pub async fn storage_objects(&self) -> usize {
        self.objects.len().await
    }

    /// The texture category root folder.
    pub async fn root(&self, category: AssetCategory) -> Folder {
        self.folders
            .list_roots(&self.ctx, category)
            .await
            .expect("list roots")
            .into_iter()
            .find(Folder::is_category_root)
            .expect("category root")
    }

    /// Create a texture folder.
    pub async fn folder(&self, parent: Option<&Folder>, name: &str) -> Folder {
        self.folders
            .create_folder(
                &self.ctx,
                CreateFolderRequest {
                    category: parent.map(|p| p.category).unwrap_or(AssetCategory::Texture),
                    parent_id: parent.map(|p| p.id),
                    name: name.to_string(),
                },
            )
            .await
            .expect("create folder")
    }

    /// Store `content` and record a resource for it, bypassing ingest
    /// checks so tests can use arbitrary bytes.
    pub async fn resource(&self, folder: &Folder, name: &str, content: &[u8]) -> Resource {
        let stored = self
            .storage
            .write_object(Bytes::copy_from_slice(content))
            .await
            .expect("store object");
        let mut tx = self.store.begin().await.expect("begin");
        let resource = tx
            .create_resource(&CreateResource {
                owner_id: folder.owner_id,
                category: folder.category,
                folder_id: folder.id,
                name: name.to_string(),
                description: None,
                file_path: path::join(&folder.path, name),
                file_hash: stored.hash,
                file_name: format!("{name}.png"),
                width: None,
                height: None,
                format: Some("png".to_string()),
                file_size: content.len() as i64,
                tags: Vec::new(),
                is_public: false,
                properties: None,
            })
            .await
            .expect("create resource");
        tx.commit().await.expect("commit");
        resource
    }
}

//! Folder download as a ZIP archive.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use assetdeck_core::path;
use assetdeck_core::result::AppResult;
use assetdeck_database::AssetStore;
use assetdeck_entity::resource::Resource;
use assetdeck_storage::{StorageManager, ZipArchiver};

use super::load_folder;
use crate::context::RequestContext;

/// A finished folder archive.
#[derive(Debug, Clone)]
pub struct FolderArchive {
    /// Suggested download name, e.g. `sprites.zip`.
    pub file_name: String,
    /// ZIP bytes.
    pub data: Bytes,
    /// Files written into the archive.
    pub included: usize,
    /// Resources found in the subtree.
    pub total: usize,
}

/// Packs a folder subtree into an archive.
#[derive(Debug, Clone)]
pub struct ArchiveService {
    /// Persistence.
    store: Arc<dyn AssetStore>,
    /// Physical files.
    storage: StorageManager,
}

impl ArchiveService {
    /// Creates a new archive service.
    pub fn new(store: Arc<dyn AssetStore>, storage: StorageManager) -> Self {
        Self { store, storage }
    }

    /// Archive every resource in the folder and its descendants. Entries
    /// mirror the folder-relative location of each resource; files that
    /// cannot be read are skipped.
    pub async fn download_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<FolderArchive> {
        let (folder, resources) = {
            let mut tx = self.store.begin().await?;
            let folder = load_folder(tx.as_mut(), ctx.owner_id, folder_id).await?;
            let mut ids = vec![folder.id];
            ids.extend(
                tx.find_descendants(folder.scope(), &folder.path)
                    .await?
                    .iter()
                    .map(|d| d.id),
            );
            let resources = tx.list_by_folder_ids(&ids).await?;
            (folder, resources)
        };

        let mut archive = ZipArchiver::new();
        for resource in &resources {
            let entry = entry_name(&folder.path, resource);
            let data = match self.storage.read_object(&resource.file_hash).await {
                Ok(data) => data,
                Err(e) => {
                    warn!(
                        resource_id = %resource.id,
                        hash = %resource.file_hash,
                        error = %e,
                        "Skipping unreadable file in archive"
                    );
                    continue;
                }
            };
            archive.add_entry(&entry, &data)?;
        }

        let included = archive.len();
        let total = resources.len();
        let data = archive.finish()?;

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder_id,
            path = %folder.path,
            included,
            total,
            bytes = data.len(),
            "Folder archived"
        );

        Ok(FolderArchive {
            file_name: format!("{}.zip", folder.name),
            data,
            included,
            total,
        })
    }
}

/// Archive entry name: the resource's path below `folder_path`, `/`
/// separated, with the original file extension.
fn entry_name(folder_path: &str, resource: &Resource) -> String {
    let segments = path::relative_segments(&resource.file_path, folder_path)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| vec![resource.name.as_str()]);
    let mut name = segments.join("/");
    if let Some(ext) = resource.extension() {
        name.push('.');
        name.push_str(&ext);
    }
    name
}

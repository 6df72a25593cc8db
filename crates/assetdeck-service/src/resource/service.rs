//! Single-resource operations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use assetdeck_core::error::AppError;
use assetdeck_core::path;
use assetdeck_core::result::AppResult;
use assetdeck_database::{AssetStore, AssetTx};
use assetdeck_entity::folder::Folder;
use assetdeck_entity::resource::Resource;
use assetdeck_storage::StorageManager;

use crate::context::RequestContext;
use crate::folder::removal::{purge_resources, unlink_files};
use crate::folder::{RemovalReport, check_no_subfolder, load_folder};

/// Fields of a resource that may be edited. `None` leaves a field as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateResourceRequest {
    /// New name, unique within the folder.
    pub name: Option<String>,
    /// New description; an empty string clears it.
    pub description: Option<String>,
    /// Replacement tag list.
    pub tags: Option<Vec<String>>,
    /// New visibility.
    pub is_public: Option<bool>,
    /// Replacement domain properties.
    pub properties: Option<serde_json::Value>,
}

/// Reads and edits individual resources.
#[derive(Debug, Clone)]
pub struct ResourceService {
    /// Persistence.
    store: Arc<dyn AssetStore>,
    /// Physical files.
    storage: StorageManager,
}

impl ResourceService {
    /// Creates a new resource service.
    pub fn new(store: Arc<dyn AssetStore>, storage: StorageManager) -> Self {
        Self { store, storage }
    }

    /// Gets a resource by ID.
    pub async fn get(&self, ctx: &RequestContext, resource_id: Uuid) -> AppResult<Resource> {
        let mut tx = self.store.begin().await?;
        load_resource(tx.as_mut(), ctx.owner_id, resource_id).await
    }

    /// Lists the resources directly inside a folder.
    pub async fn list(&self, ctx: &RequestContext, folder_id: Uuid) -> AppResult<Vec<Resource>> {
        let mut tx = self.store.begin().await?;
        let folder = load_folder(tx.as_mut(), ctx.owner_id, folder_id).await?;
        tx.list_by_folder(folder.id).await
    }

    /// Edits a resource. Renaming fails with a conflict if the folder
    /// already holds a resource with the new name.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        resource_id: Uuid,
        req: UpdateResourceRequest,
    ) -> AppResult<Resource> {
        let mut tx = self.store.begin().await?;
        let mut resource = load_resource(tx.as_mut(), ctx.owner_id, resource_id).await?;

        if let Some(name) = req.name.filter(|n| *n != resource.name) {
            path::validate_segment(&name)?;
            let folder = load_folder(tx.as_mut(), ctx.owner_id, resource.folder_id).await?;
            check_name_free(tx.as_mut(), &folder, &name).await?;
            resource.file_path = path::join(&folder.path, &name);
            resource.name = name;
        }
        if let Some(description) = req.description {
            resource.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(tags) = req.tags {
            resource.tags = tags;
        }
        if let Some(is_public) = req.is_public {
            resource.is_public = is_public;
        }
        if let Some(properties) = req.properties {
            resource.properties = Some(properties);
        }

        let updated = tx.update_resource(&resource).await?;
        tx.commit().await?;

        info!(
            owner_id = %ctx.owner_id,
            resource_id = %resource_id,
            path = %updated.file_path,
            "Resource updated"
        );

        Ok(updated)
    }

    /// Moves a resource into another folder of the same category.
    pub async fn move_resource(
        &self,
        ctx: &RequestContext,
        resource_id: Uuid,
        target_folder_id: Uuid,
    ) -> AppResult<Resource> {
        let mut tx = self.store.begin().await?;
        let mut resource = load_resource(tx.as_mut(), ctx.owner_id, resource_id).await?;
        if resource.folder_id == target_folder_id {
            return Ok(resource);
        }

        let target = load_folder(tx.as_mut(), ctx.owner_id, target_folder_id).await?;
        if target.category != resource.category {
            return Err(AppError::validation(format!(
                "Cannot move a {} resource into a {} folder",
                resource.category, target.category
            )));
        }
        check_name_free(tx.as_mut(), &target, &resource.name).await?;

        let old_path = std::mem::take(&mut resource.file_path);
        resource.folder_id = target.id;
        resource.file_path = path::join(&target.path, &resource.name);
        let moved = tx.update_resource(&resource).await?;
        tx.commit().await?;

        info!(
            owner_id = %ctx.owner_id,
            resource_id = %resource_id,
            old_path = %old_path,
            new_path = %moved.file_path,
            "Resource moved"
        );

        Ok(moved)
    }

    /// Deletes a resource, unlinking its physical file when nothing else
    /// references it.
    pub async fn delete(&self, ctx: &RequestContext, resource_id: Uuid) -> AppResult<RemovalReport> {
        let mut tx = self.store.begin().await?;
        let resource = load_resource(tx.as_mut(), ctx.owner_id, resource_id).await?;

        let mut report = RemovalReport::default();
        let orphaned =
            purge_resources(tx.as_mut(), std::slice::from_ref(&resource), &mut report).await?;
        tx.commit().await?;

        unlink_files(self.store.as_ref(), &self.storage, &orphaned, &mut report).await;

        info!(
            owner_id = %ctx.owner_id,
            resource_id = %resource_id,
            path = %resource.file_path,
            files_unlinked = report.files_unlinked,
            "Resource deleted"
        );

        Ok(report)
    }

    /// Increments the usage counter of a resource.
    pub async fn record_usage(&self, ctx: &RequestContext, resource_id: Uuid) -> AppResult<Resource> {
        let mut tx = self.store.begin().await?;
        let mut resource = load_resource(tx.as_mut(), ctx.owner_id, resource_id).await?;
        resource.usage_count = resource.usage_count.saturating_add(1);
        let updated = tx.update_resource(&resource).await?;
        tx.commit().await?;
        Ok(updated)
    }
}

async fn load_resource(tx: &mut dyn AssetTx, owner_id: Uuid, id: Uuid) -> AppResult<Resource> {
    tx.find_resource(owner_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Resource {id} not found")))
}

/// Fail with a conflict when `name` is taken in `folder` by a resource or
/// a subfolder.
async fn check_name_free(tx: &mut dyn AssetTx, folder: &Folder, name: &str) -> AppResult<()> {
    if tx.find_by_folder_and_name(folder.id, name).await?.is_some() {
        return Err(AppError::conflict(format!(
            "Resource \"{name}\" already exists"
        )));
    }
    check_no_subfolder(tx, folder, name).await
}

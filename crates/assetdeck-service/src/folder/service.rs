//! Folder create, rename, move and copy.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use assetdeck_core::error::AppError;
use assetdeck_core::path;
use assetdeck_core::result::AppResult;
use assetdeck_database::{AssetStore, AssetTx};
use assetdeck_entity::action::Action;
use assetdeck_entity::category::AssetCategory;
use assetdeck_entity::folder::{CreateFolder, Folder, FolderScope};

use super::{check_no_resource, ensure_root, load_folder, require_action};
use crate::context::RequestContext;

/// Upper bound on generated copy names tried before giving up.
const MAX_COPY_SUFFIX: u32 = 10_000;

/// Request to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    /// Category partition.
    pub category: AssetCategory,
    /// Parent folder ID (None for a top-level folder).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
}

/// Manages the folder hierarchy.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Persistence.
    store: Arc<dyn AssetStore>,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(store: Arc<dyn AssetStore>) -> Self {
        Self { store }
    }

    /// Lists top-level folders of a category, creating its root folder
    /// first if needed.
    pub async fn list_roots(
        &self,
        ctx: &RequestContext,
        category: AssetCategory,
    ) -> AppResult<Vec<Folder>> {
        let scope = ctx.scope(category);
        let mut tx = self.store.begin().await?;
        ensure_root(tx.as_mut(), scope).await?;
        let folders = tx.list_children(scope, None).await?;
        tx.commit().await?;
        Ok(folders)
    }

    /// Gets a folder by ID.
    pub async fn get_folder(&self, ctx: &RequestContext, folder_id: Uuid) -> AppResult<Folder> {
        let mut tx = self.store.begin().await?;
        load_folder(tx.as_mut(), ctx.owner_id, folder_id).await
    }

    /// Lists the direct child folders of a folder.
    pub async fn list_children(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<Vec<Folder>> {
        let mut tx = self.store.begin().await?;
        let folder = load_folder(tx.as_mut(), ctx.owner_id, folder_id).await?;
        tx.list_children(folder.scope(), Some(folder.id)).await
    }

    /// Creates a new folder.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        req: CreateFolderRequest,
    ) -> AppResult<Folder> {
        path::validate_segment(&req.name)?;

        let scope = ctx.scope(req.category);
        let mut tx = self.store.begin().await?;
        ensure_root(tx.as_mut(), scope).await?;

        let parent = match req.parent_id {
            Some(parent_id) => {
                let parent = load_folder(tx.as_mut(), ctx.owner_id, parent_id).await?;
                if parent.category != req.category {
                    return Err(AppError::validation(format!(
                        "Parent folder belongs to category '{}', not '{}'",
                        parent.category, req.category
                    )));
                }
                Some(parent)
            }
            None => None,
        };

        let parent_path = parent.as_ref().map(|p| p.path.as_str()).unwrap_or("");
        let new_path = path::join(parent_path, &req.name);

        if tx.find_folder_by_path(scope, &new_path).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Folder path '{new_path}' already exists"
            )));
        }
        check_no_resource(tx.as_mut(), req.parent_id, &req.name).await?;

        let folder = tx
            .create_folder(&CreateFolder {
                owner_id: ctx.owner_id,
                category: req.category,
                parent_id: req.parent_id,
                name: req.name,
                path: new_path,
            })
            .await?;
        tx.commit().await?;

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder.id,
            path = %folder.path,
            "Folder created"
        );

        Ok(folder)
    }

    /// Renames a folder and rewrites the paths of its whole subtree.
    pub async fn rename_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        new_name: &str,
    ) -> AppResult<Folder> {
        path::validate_segment(new_name)?;

        let mut tx = self.store.begin().await?;
        let folder = load_folder(tx.as_mut(), ctx.owner_id, folder_id).await?;
        ensure_root(tx.as_mut(), folder.scope()).await?;
        require_action(&folder, Action::Rename)?;

        if folder.name == new_name {
            return Ok(folder);
        }

        let parent_path = path::parent_of(&folder.path).unwrap_or("");
        let new_path = path::join(parent_path, new_name);
        check_path_free(tx.as_mut(), folder.scope(), &new_path, folder.id).await?;
        check_no_resource(tx.as_mut(), folder.parent_id, new_name).await?;

        let old_path = folder.path.clone();
        let renamed =
            relocate_subtree(tx.as_mut(), &folder, folder.parent_id, new_name, &new_path).await?;
        tx.commit().await?;

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder_id,
            old_path = %old_path,
            new_path = %renamed.path,
            "Folder renamed"
        );

        Ok(renamed)
    }

    /// Moves a folder under a new parent (`None` for the top level).
    pub async fn move_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        target_parent_id: Option<Uuid>,
    ) -> AppResult<Folder> {
        let mut tx = self.store.begin().await?;
        let folder = load_folder(tx.as_mut(), ctx.owner_id, folder_id).await?;
        ensure_root(tx.as_mut(), folder.scope()).await?;
        require_action(&folder, Action::Move)?;

        if target_parent_id == folder.parent_id {
            return Ok(folder);
        }

        let target = resolve_target(tx.as_mut(), ctx, &folder, target_parent_id, "move").await?;
        let target_path = target.as_ref().map(|t| t.path.as_str()).unwrap_or("");
        let new_path = path::join(target_path, &folder.name);
        check_path_free(tx.as_mut(), folder.scope(), &new_path, folder.id).await?;
        check_no_resource(tx.as_mut(), target_parent_id, &folder.name).await?;

        let old_path = folder.path.clone();
        let moved =
            relocate_subtree(tx.as_mut(), &folder, target_parent_id, &folder.name, &new_path)
                .await?;
        tx.commit().await?;

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder_id,
            old_path = %old_path,
            new_path = %moved.path,
            "Folder moved"
        );

        Ok(moved)
    }

    /// Copies a folder, its descendants and their resources under a new
    /// parent. Physical files are shared with the originals.
    pub async fn copy_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        target_parent_id: Option<Uuid>,
    ) -> AppResult<Folder> {
        let mut tx = self.store.begin().await?;
        let source = load_folder(tx.as_mut(), ctx.owner_id, folder_id).await?;
        let scope = source.scope();
        ensure_root(tx.as_mut(), scope).await?;
        require_action(&source, Action::Copy)?;

        let target = resolve_target(tx.as_mut(), ctx, &source, target_parent_id, "copy").await?;
        let target_path = target.as_ref().map(|t| t.path.as_str()).unwrap_or("");

        // Snapshot the subtree before anything is inserted.
        let mut descendants = tx.find_descendants(scope, &source.path).await?;
        descendants.sort_by(|a, b| a.depth().cmp(&b.depth()).then(a.path.cmp(&b.path)));
        let mut source_ids = vec![source.id];
        source_ids.extend(descendants.iter().map(|d| d.id));
        let resources = tx.list_by_folder_ids(&source_ids).await?;

        let copy_name =
            available_copy_name(tx.as_mut(), scope, target.as_ref(), &source.name).await?;
        let copy_root = tx
            .create_folder(&CreateFolder {
                owner_id: ctx.owner_id,
                category: source.category,
                parent_id: target_parent_id,
                path: path::join(target_path, &copy_name),
                name: copy_name,
            })
            .await?;

        let mut translated: HashMap<Uuid, Folder> = HashMap::new();
        translated.insert(source.id, copy_root.clone());

        for original in &descendants {
            let new_parent = original
                .parent_id
                .and_then(|p| translated.get(&p))
                .ok_or_else(|| {
                    AppError::internal(format!(
                        "Folder '{}' has no parent inside the copied subtree",
                        original.path
                    ))
                })?;
            let new_path = path::rewrite_prefix(&original.path, &source.path, &copy_root.path)
                .ok_or_else(|| {
                    AppError::internal(format!(
                        "Folder '{}' is not below '{}'",
                        original.path, source.path
                    ))
                })?;
            let cloned = tx
                .create_folder(&CreateFolder {
                    owner_id: ctx.owner_id,
                    category: original.category,
                    parent_id: Some(new_parent.id),
                    name: original.name.clone(),
                    path: new_path,
                })
                .await?;
            translated.insert(original.id, cloned);
        }

        for resource in &resources {
            let folder = translated.get(&resource.folder_id).ok_or_else(|| {
                AppError::internal(format!(
                    "Resource {} lies outside the copied subtree",
                    resource.id
                ))
            })?;
            tx.create_resource(&resource.duplicate_into(folder.id, &folder.path))
                .await?;
        }

        tx.commit().await?;

        info!(
            owner_id = %ctx.owner_id,
            source_id = %source.id,
            copy_id = %copy_root.id,
            path = %copy_root.path,
            folders = translated.len(),
            resources = resources.len(),
            "Folder copied"
        );

        Ok(copy_root)
    }
}

/// Fail with a conflict when a folder other than `except` occupies `path`.
async fn check_path_free(
    tx: &mut dyn AssetTx,
    scope: FolderScope,
    path: &str,
    except: Uuid,
) -> AppResult<()> {
    match tx.find_folder_by_path(scope, path).await? {
        Some(existing) if existing.id != except => Err(AppError::conflict(format!(
            "Folder path '{path}' already exists"
        ))),
        _ => Ok(()),
    }
}

/// Resolve the destination of a move or copy and reject cycles and
/// cross-category targets.
async fn resolve_target(
    tx: &mut dyn AssetTx,
    ctx: &RequestContext,
    folder: &Folder,
    target_parent_id: Option<Uuid>,
    verb: &str,
) -> AppResult<Option<Folder>> {
    let Some(target_id) = target_parent_id else {
        return Ok(None);
    };
    if target_id == folder.id {
        return Err(AppError::validation(format!(
            "Cannot {verb} a folder into itself"
        )));
    }

    let target = load_folder(tx, ctx.owner_id, target_id).await?;
    if target.category != folder.category {
        return Err(AppError::validation(format!(
            "Cannot {verb} a folder across categories"
        )));
    }
    if path::is_descendant(&target.path, &folder.path) {
        return Err(AppError::validation(format!(
            "Cannot {verb} folder '{}' into its own descendant '{}'",
            folder.path, target.path
        )));
    }
    Ok(Some(target))
}

/// Pick `"<name> copy"`, `"<name> copy 2"`, ... whichever is free first,
/// among both folders and resources of `parent`.
async fn available_copy_name(
    tx: &mut dyn AssetTx,
    scope: FolderScope,
    parent: Option<&Folder>,
    name: &str,
) -> AppResult<String> {
    let parent_path = parent.map(|p| p.path.as_str()).unwrap_or("");
    for n in 1..=MAX_COPY_SUFFIX {
        let candidate = copy_name(name, n);
        let candidate_path = path::join(parent_path, &candidate);
        if tx.find_folder_by_path(scope, &candidate_path).await?.is_some() {
            continue;
        }
        let resource_taken = match parent {
            Some(parent) => tx.find_by_folder_and_name(parent.id, &candidate).await?.is_some(),
            None => false,
        };
        if !resource_taken {
            return Ok(candidate);
        }
    }
    Err(AppError::conflict(format!(
        "Too many copies of '{name}' in this folder"
    )))
}

fn copy_name(name: &str, n: u32) -> String {
    if n == 1 {
        format!("{name} copy")
    } else {
        format!("{name} copy {n}")
    }
}

/// Give `folder` a new parent, name and path, rewrite every descendant
/// path under the new prefix, and refresh the cached `file_path` of each
/// resource in the subtree.
async fn relocate_subtree(
    tx: &mut dyn AssetTx,
    folder: &Folder,
    new_parent_id: Option<Uuid>,
    new_name: &str,
    new_path: &str,
) -> AppResult<Folder> {
    let descendants = tx.find_descendants(folder.scope(), &folder.path).await?;

    let updated = tx
        .update_folder_path(folder.id, new_parent_id, new_name, new_path)
        .await?;
    tx.relocate_resources(updated.id, &updated.path).await?;

    for d in &descendants {
        let rewritten = path::rewrite_prefix(&d.path, &folder.path, new_path).ok_or_else(|| {
            AppError::internal(format!("Folder '{}' is not below '{}'", d.path, folder.path))
        })?;
        tx.update_folder_path(d.id, d.parent_id, &d.name, &rewritten)
            .await?;
        tx.relocate_resources(d.id, &rewritten).await?;
    }

    Ok(updated)
}

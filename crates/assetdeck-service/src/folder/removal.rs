//! Folder delete and clear with reference-counted file cleanup.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use assetdeck_core::result::AppResult;
use assetdeck_database::{AssetStore, AssetTx};
use assetdeck_entity::action::Action;
use assetdeck_entity::folder::Folder;
use assetdeck_entity::resource::Resource;
use assetdeck_storage::StorageManager;

use super::{load_folder, require_action};
use crate::context::RequestContext;

/// Outcome of a delete or clear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalReport {
    /// Folder rows removed.
    pub folders_deleted: u64,
    /// Resource rows removed.
    pub resources_deleted: u64,
    /// Physical files removed from storage.
    pub files_unlinked: u64,
    /// Physical files kept because other resources still reference them.
    pub files_preserved: u64,
    /// Physical files that should have been removed but could not be.
    pub files_failed: u64,
}

/// Deletes folders and purges resources.
#[derive(Debug, Clone)]
pub struct RemovalService {
    /// Persistence.
    store: Arc<dyn AssetStore>,
    /// Physical files.
    storage: StorageManager,
}

impl RemovalService {
    /// Creates a new removal service.
    pub fn new(store: Arc<dyn AssetStore>, storage: StorageManager) -> Self {
        Self { store, storage }
    }

    /// Delete a folder, all of its descendants and every resource inside.
    pub async fn delete_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<RemovalReport> {
        let mut tx = self.store.begin().await?;
        let folder = load_folder(tx.as_mut(), ctx.owner_id, folder_id).await?;
        require_action(&folder, Action::Delete)?;

        let subtree = collect_subtree(tx.as_mut(), &folder).await?;
        let resources = tx.list_by_folder_ids(&subtree).await?;

        let mut report = RemovalReport::default();
        let orphaned = purge_resources(tx.as_mut(), &resources, &mut report).await?;
        report.folders_deleted = tx.delete_folders(&subtree).await?;
        tx.commit().await?;

        unlink_files(self.store.as_ref(), &self.storage, &orphaned, &mut report).await;

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder_id,
            path = %folder.path,
            folders_deleted = report.folders_deleted,
            resources_deleted = report.resources_deleted,
            files_unlinked = report.files_unlinked,
            files_preserved = report.files_preserved,
            files_failed = report.files_failed,
            "Folder deleted"
        );

        Ok(report)
    }

    /// Remove every resource in a folder's subtree but keep all folders.
    pub async fn clear_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<RemovalReport> {
        let mut tx = self.store.begin().await?;
        let folder = load_folder(tx.as_mut(), ctx.owner_id, folder_id).await?;
        require_action(&folder, Action::Clear)?;

        let subtree = collect_subtree(tx.as_mut(), &folder).await?;
        let resources = tx.list_by_folder_ids(&subtree).await?;

        let mut report = RemovalReport::default();
        let orphaned = purge_resources(tx.as_mut(), &resources, &mut report).await?;
        tx.commit().await?;

        unlink_files(self.store.as_ref(), &self.storage, &orphaned, &mut report).await;

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder_id,
            path = %folder.path,
            resources_deleted = report.resources_deleted,
            files_unlinked = report.files_unlinked,
            files_preserved = report.files_preserved,
            files_failed = report.files_failed,
            "Folder cleared"
        );

        Ok(report)
    }
}

/// IDs of `folder` and all of its descendants.
async fn collect_subtree(tx: &mut dyn AssetTx, folder: &Folder) -> AppResult<Vec<Uuid>> {
    let descendants = tx.find_descendants(folder.scope(), &folder.path).await?;
    let mut ids = Vec::with_capacity(descendants.len() + 1);
    ids.push(folder.id);
    ids.extend(descendants.iter().map(|d| d.id));
    Ok(ids)
}

/// Delete resource rows and return the hashes no longer referenced by any
/// resource. Must run before the transaction commits; unlinking the
/// returned hashes must happen after.
pub(crate) async fn purge_resources(
    tx: &mut dyn AssetTx,
    resources: &[Resource],
    report: &mut RemovalReport,
) -> AppResult<Vec<String>> {
    let mut local_counts: BTreeMap<&str, u64> = BTreeMap::new();
    for r in resources {
        *local_counts.entry(r.file_hash.as_str()).or_default() += 1;
    }

    let ids: Vec<Uuid> = resources.iter().map(|r| r.id).collect();
    report.resources_deleted = tx.delete_resources(&ids).await?;

    let mut orphaned = Vec::new();
    for (hash, local) in local_counts {
        let remaining = tx.count_by_file_hash(hash).await?;
        if remaining == 0 {
            debug!(hash, references = local, "Physical file no longer referenced");
            orphaned.push(hash.to_string());
        } else {
            debug!(hash, references = local, remaining, "Physical file still referenced");
            report.files_preserved += 1;
        }
    }
    Ok(orphaned)
}

/// Unlink committed orphans. Each hash is counted again under the storage
/// unlink guard, so a file referenced by an upload that committed after the
/// purge is kept. Failures are logged and counted, never propagated: the
/// rows are already gone, so at worst a file is orphaned.
pub(crate) async fn unlink_files(
    store: &dyn AssetStore,
    storage: &StorageManager,
    hashes: &[String],
    report: &mut RemovalReport,
) {
    if hashes.is_empty() {
        return;
    }
    let _guard = storage.unlink_guard().await;

    for hash in hashes {
        match count_references(store, hash).await {
            Ok(0) => {}
            Ok(remaining) => {
                debug!(hash = %hash, remaining, "Physical file referenced again before unlink");
                report.files_preserved += 1;
                continue;
            }
            Err(e) => {
                warn!(hash = %hash, error = %e, "Failed to recount physical file references");
                report.files_failed += 1;
                continue;
            }
        }

        match storage.unlink(hash).await {
            Ok(()) => report.files_unlinked += 1,
            Err(e) => {
                warn!(hash = %hash, error = %e, "Failed to unlink physical file");
                report.files_failed += 1;
            }
        }
    }
}

async fn count_references(store: &dyn AssetStore, hash: &str) -> AppResult<u64> {
    let mut tx = store.begin().await?;
    let count = tx.count_by_file_hash(hash).await?;
    tx.commit().await?;
    Ok(count)
}

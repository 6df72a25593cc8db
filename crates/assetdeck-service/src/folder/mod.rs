//! Folder operations, tree reconciliation, removal and download.

pub mod archive;
pub mod removal;
pub mod service;
pub mod tree;

pub use archive::{ArchiveService, FolderArchive};
pub use removal::{RemovalReport, RemovalService};
pub use service::{CreateFolderRequest, FolderService};
pub use tree::{TreeService, reconcile};

use uuid::Uuid;

use assetdeck_core::error::AppError;
use assetdeck_core::path;
use assetdeck_core::result::AppResult;
use assetdeck_database::AssetTx;
use assetdeck_entity::action::Action;
use assetdeck_entity::folder::{CreateFolder, Folder, FolderScope};

/// Make sure the root folder of `scope` exists and return it.
pub(crate) async fn ensure_root(tx: &mut dyn AssetTx, scope: FolderScope) -> AppResult<Folder> {
    tx.ensure_folder(&CreateFolder::category_root(scope)).await
}

/// Load a folder owned by `owner_id` or fail with not-found.
pub(crate) async fn load_folder(tx: &mut dyn AssetTx, owner_id: Uuid, id: Uuid) -> AppResult<Folder> {
    tx.find_folder(owner_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
}

/// Fail with a conflict when a resource named `name` sits directly in
/// `parent_id`, where a folder of that name would share its path.
pub(crate) async fn check_no_resource(
    tx: &mut dyn AssetTx,
    parent_id: Option<Uuid>,
    name: &str,
) -> AppResult<()> {
    let Some(parent_id) = parent_id else {
        return Ok(());
    };
    if tx.find_by_folder_and_name(parent_id, name).await?.is_some() {
        return Err(AppError::conflict(format!(
            "A resource named '{name}' already exists in this folder"
        )));
    }
    Ok(())
}

/// Fail with a conflict when `folder` has a subfolder named `name`, where a
/// resource of that name would share its path.
pub(crate) async fn check_no_subfolder(
    tx: &mut dyn AssetTx,
    folder: &Folder,
    name: &str,
) -> AppResult<()> {
    let child_path = path::join(&folder.path, name);
    if tx.find_folder_by_path(folder.scope(), &child_path).await?.is_some() {
        return Err(AppError::conflict(format!(
            "A folder named '{name}' already exists in this folder"
        )));
    }
    Ok(())
}

/// Fail unless the folder's node type permits `action`.
pub(crate) fn require_action(folder: &Folder, action: Action) -> AppResult<()> {
    if folder.node_kind().allows(action) {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Cannot {action} the category root folder '{}'",
            folder.name
        )))
    }
}

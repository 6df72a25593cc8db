//! Repository and transaction traits.
//!
//! Repository methods live on the transaction so that every read and
//! write of one logical operation shares the same snapshot and commits
//! or rolls back together.

use async_trait::async_trait;
use uuid::Uuid;

use assetdeck_core::result::AppResult;
use assetdeck_entity::folder::{CreateFolder, Folder, FolderScope};
use assetdeck_entity::resource::{CreateResource, Resource};

/// Folder queries and mutations.
///
/// Every lookup is scoped by owner (and category where paths are
/// involved); a folder of another owner behaves as if it did not exist.
#[async_trait]
pub trait FolderRepository: Send {
    /// Find a folder by ID within the owner's scope.
    async fn find_folder(&mut self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Folder>>;

    /// Find a folder by its exact path.
    async fn find_folder_by_path(
        &mut self,
        scope: FolderScope,
        path: &str,
    ) -> AppResult<Option<Folder>>;

    /// All proper descendants of `path`, ordered by path.
    async fn find_descendants(&mut self, scope: FolderScope, path: &str)
    -> AppResult<Vec<Folder>>;

    /// Direct children of a folder (`None` lists top-level folders), by name.
    async fn list_children(
        &mut self,
        scope: FolderScope,
        parent_id: Option<Uuid>,
    ) -> AppResult<Vec<Folder>>;

    /// Every folder in the scope, ordered by path.
    async fn list_folders(&mut self, scope: FolderScope) -> AppResult<Vec<Folder>>;

    /// Insert a folder. Fails with a conflict if the path is taken.
    async fn create_folder(&mut self, data: &CreateFolder) -> AppResult<Folder>;

    /// Insert a folder unless one already exists at the same path, and
    /// return whichever row occupies the path afterwards.
    async fn ensure_folder(&mut self, data: &CreateFolder) -> AppResult<Folder>;

    /// Set a folder's parent, name and path.
    async fn update_folder_path(
        &mut self,
        id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        path: &str,
    ) -> AppResult<Folder>;

    /// Delete folders by ID. Returns the number of rows removed.
    async fn delete_folders(&mut self, ids: &[Uuid]) -> AppResult<u64>;
}

/// Resource queries and mutations.
#[async_trait]
pub trait ResourceRepository: Send {
    /// Find a resource by ID within the owner's scope.
    async fn find_resource(&mut self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Resource>>;

    /// Resources directly inside a folder, by name.
    async fn list_by_folder(&mut self, folder_id: Uuid) -> AppResult<Vec<Resource>>;

    /// Resources inside any of the given folders, ordered by path.
    async fn list_by_folder_ids(&mut self, folder_ids: &[Uuid]) -> AppResult<Vec<Resource>>;

    /// Every resource in the scope.
    async fn list_resources(&mut self, scope: FolderScope) -> AppResult<Vec<Resource>>;

    /// Find a resource by folder and name.
    async fn find_by_folder_and_name(
        &mut self,
        folder_id: Uuid,
        name: &str,
    ) -> AppResult<Option<Resource>>;

    /// Which of `names` are already taken in the folder.
    async fn find_existing_names(
        &mut self,
        folder_id: Uuid,
        names: &[String],
    ) -> AppResult<Vec<String>>;

    /// Insert a resource. Fails with a conflict if the name is taken.
    async fn create_resource(&mut self, data: &CreateResource) -> AppResult<Resource>;

    /// Persist the mutable fields of a resource.
    async fn update_resource(&mut self, resource: &Resource) -> AppResult<Resource>;

    /// Recompute `file_path` for every resource in a folder.
    async fn relocate_resources(&mut self, folder_id: Uuid, folder_path: &str) -> AppResult<u64>;

    /// Delete resources by ID. Returns the number of rows removed.
    async fn delete_resources(&mut self, ids: &[Uuid]) -> AppResult<u64>;

    /// Number of resources, across all owners, referencing a physical file.
    async fn count_by_file_hash(&mut self, file_hash: &str) -> AppResult<u64>;
}

/// An open transaction. Dropping it without calling [`AssetTx::commit`]
/// discards every change made through it.
#[async_trait]
pub trait AssetTx: FolderRepository + ResourceRepository + Send {
    /// Make all changes durable.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// Entry point to the persistence layer.
#[async_trait]
pub trait AssetStore: Send + Sync + std::fmt::Debug + 'static {
    /// Backend name, e.g. `postgres`.
    fn backend(&self) -> &str;

    /// Begin a transaction.
    async fn begin(&self) -> AppResult<Box<dyn AssetTx>>;

    /// Check connectivity.
    async fn health_check(&self) -> AppResult<bool>;
}

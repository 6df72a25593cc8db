//! In-memory store.
//!
//! A transaction takes the store lock for its whole lifetime and works on
//! a private copy of the state that replaces the shared state on commit.
//! Unique keys and foreign keys are checked the same way the PostgreSQL
//! schema checks them.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use assetdeck_core::error::AppError;
use assetdeck_core::path;
use assetdeck_core::result::AppResult;
use assetdeck_entity::folder::{CreateFolder, Folder, FolderScope};
use assetdeck_entity::resource::{CreateResource, Resource};

use crate::store::{AssetStore, AssetTx, FolderRepository, ResourceRepository};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    folders: BTreeMap<Uuid, Folder>,
    resources: BTreeMap<Uuid, Resource>,
}

impl MemoryState {
    fn path_taken(&self, scope: FolderScope, path: &str, except: Option<Uuid>) -> bool {
        self.folders.values().any(|f| {
            f.scope() == scope && f.path == path && Some(f.id) != except
        })
    }

    fn name_taken(&self, folder_id: Uuid, name: &str, except: Option<Uuid>) -> bool {
        self.resources.values().any(|r| {
            r.folder_id == folder_id && r.name == name && Some(r.id) != except
        })
    }

    fn check_parent(&self, parent_id: Option<Uuid>) -> AppResult<()> {
        match parent_id {
            Some(id) if !self.folders.contains_key(&id) => Err(AppError::database(format!(
                "Foreign key violation: parent folder {id} does not exist"
            ))),
            _ => Ok(()),
        }
    }

    fn check_folder(&self, folder_id: Uuid) -> AppResult<()> {
        if self.folders.contains_key(&folder_id) {
            Ok(())
        } else {
            Err(AppError::database(format!(
                "Foreign key violation: folder {folder_id} does not exist"
            )))
        }
    }

    fn scope_folders(&self, scope: FolderScope) -> impl Iterator<Item = &Folder> {
        self.folders.values().filter(move |f| f.scope() == scope)
    }
}

/// Asset store kept entirely in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryAssetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    fn backend(&self) -> &str {
        "memory"
    }

    async fn begin(&self) -> AppResult<Box<dyn AssetTx>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// A transaction over [`MemoryAssetStore`].
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl AssetTx for MemoryTx {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[async_trait]
impl FolderRepository for MemoryTx {
    async fn find_folder(&mut self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Folder>> {
        Ok(self
            .working
            .folders
            .get(&id)
            .filter(|f| f.owner_id == owner_id)
            .cloned())
    }

    async fn find_folder_by_path(
        &mut self,
        scope: FolderScope,
        path: &str,
    ) -> AppResult<Option<Folder>> {
        Ok(self
            .working
            .scope_folders(scope)
            .find(|f| f.path == path)
            .cloned())
    }

    async fn find_descendants(
        &mut self,
        scope: FolderScope,
        path: &str,
    ) -> AppResult<Vec<Folder>> {
        let mut found: Vec<Folder> = self
            .working
            .scope_folders(scope)
            .filter(|f| path::is_strict_descendant(&f.path, path))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(found)
    }

    async fn list_children(
        &mut self,
        scope: FolderScope,
        parent_id: Option<Uuid>,
    ) -> AppResult<Vec<Folder>> {
        let mut found: Vec<Folder> = self
            .working
            .scope_folders(scope)
            .filter(|f| f.parent_id == parent_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn list_folders(&mut self, scope: FolderScope) -> AppResult<Vec<Folder>> {
        let mut found: Vec<Folder> = self.working.scope_folders(scope).cloned().collect();
        found.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(found)
    }

    async fn create_folder(&mut self, data: &CreateFolder) -> AppResult<Folder> {
        let scope = FolderScope::new(data.owner_id, data.category);
        if self.working.path_taken(scope, &data.path, None) {
            return Err(AppError::conflict(format!(
                "Folder path '{}' already exists",
                data.path
            )));
        }
        self.working.check_parent(data.parent_id)?;

        let now = Utc::now();
        let folder = Folder {
            id: Uuid::new_v4(),
            owner_id: data.owner_id,
            category: data.category,
            parent_id: data.parent_id,
            name: data.name.clone(),
            path: data.path.clone(),
            created_at: now,
            updated_at: now,
        };
        self.working.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn ensure_folder(&mut self, data: &CreateFolder) -> AppResult<Folder> {
        let scope = FolderScope::new(data.owner_id, data.category);
        if let Some(existing) = self.find_folder_by_path(scope, &data.path).await? {
            return Ok(existing);
        }
        self.create_folder(data).await
    }

    async fn update_folder_path(
        &mut self,
        id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        path: &str,
    ) -> AppResult<Folder> {
        let scope = self
            .working
            .folders
            .get(&id)
            .map(Folder::scope)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;
        if self.working.path_taken(scope, path, Some(id)) {
            return Err(AppError::conflict(format!(
                "Folder path '{path}' already exists"
            )));
        }
        self.working.check_parent(parent_id)?;

        let folder = self
            .working
            .folders
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;
        folder.parent_id = parent_id;
        folder.name = name.to_string();
        folder.path = path.to_string();
        folder.updated_at = Utc::now();
        Ok(folder.clone())
    }

    async fn delete_folders(&mut self, ids: &[Uuid]) -> AppResult<u64> {
        let doomed: HashSet<Uuid> = ids.iter().copied().collect();

        if let Some(r) = self
            .working
            .resources
            .values()
            .find(|r| doomed.contains(&r.folder_id))
        {
            return Err(AppError::database(format!(
                "Foreign key violation: resource {} still references folder {}",
                r.id, r.folder_id
            )));
        }
        if let Some(f) = self.working.folders.values().find(|f| {
            !doomed.contains(&f.id) && f.parent_id.is_some_and(|p| doomed.contains(&p))
        }) {
            return Err(AppError::database(format!(
                "Foreign key violation: folder {} still references its parent",
                f.id
            )));
        }

        let mut removed = 0;
        for id in &doomed {
            if self.working.folders.remove(id).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl ResourceRepository for MemoryTx {
    async fn find_resource(&mut self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Resource>> {
        Ok(self
            .working
            .resources
            .get(&id)
            .filter(|r| r.owner_id == owner_id)
            .cloned())
    }

    async fn list_by_folder(&mut self, folder_id: Uuid) -> AppResult<Vec<Resource>> {
        let mut found: Vec<Resource> = self
            .working
            .resources
            .values()
            .filter(|r| r.folder_id == folder_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn list_by_folder_ids(&mut self, folder_ids: &[Uuid]) -> AppResult<Vec<Resource>> {
        let wanted: HashSet<&Uuid> = folder_ids.iter().collect();
        let mut found: Vec<Resource> = self
            .working
            .resources
            .values()
            .filter(|r| wanted.contains(&r.folder_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.file_path.cmp(&b.file_path));
        Ok(found)
    }

    async fn list_resources(&mut self, scope: FolderScope) -> AppResult<Vec<Resource>> {
        let mut found: Vec<Resource> = self
            .working
            .resources
            .values()
            .filter(|r| r.owner_id == scope.owner_id && r.category == scope.category)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.file_path.cmp(&b.file_path));
        Ok(found)
    }

    async fn find_by_folder_and_name(
        &mut self,
        folder_id: Uuid,
        name: &str,
    ) -> AppResult<Option<Resource>> {
        Ok(self
            .working
            .resources
            .values()
            .find(|r| r.folder_id == folder_id && r.name == name)
            .cloned())
    }

    async fn find_existing_names(
        &mut self,
        folder_id: Uuid,
        names: &[String],
    ) -> AppResult<Vec<String>> {
        Ok(names
            .iter()
            .filter(|n| self.working.name_taken(folder_id, n, None))
            .cloned()
            .collect())
    }

    async fn create_resource(&mut self, data: &CreateResource) -> AppResult<Resource> {
        self.working.check_folder(data.folder_id)?;
        if self.working.name_taken(data.folder_id, &data.name, None) {
            return Err(AppError::conflict(format!(
                "Resource \"{}\" already exists",
                data.name
            )));
        }

        let now = Utc::now();
        let resource = Resource {
            id: Uuid::new_v4(),
            owner_id: data.owner_id,
            category: data.category,
            folder_id: data.folder_id,
            name: data.name.clone(),
            description: data.description.clone(),
            file_path: data.file_path.clone(),
            file_hash: data.file_hash.clone(),
            file_name: data.file_name.clone(),
            width: data.width,
            height: data.height,
            format: data.format.clone(),
            file_size: data.file_size,
            tags: data.tags.clone(),
            usage_count: 0,
            is_public: data.is_public,
            properties: data.properties.clone(),
            created_at: now,
            updated_at: now,
        };
        self.working.resources.insert(resource.id, resource.clone());
        Ok(resource)
    }

    async fn update_resource(&mut self, resource: &Resource) -> AppResult<Resource> {
        self.working.check_folder(resource.folder_id)?;
        if self
            .working
            .name_taken(resource.folder_id, &resource.name, Some(resource.id))
        {
            return Err(AppError::conflict(format!(
                "Resource \"{}\" already exists",
                resource.name
            )));
        }

        let stored = self
            .working
            .resources
            .get_mut(&resource.id)
            .ok_or_else(|| AppError::not_found(format!("Resource {} not found", resource.id)))?;
        stored.folder_id = resource.folder_id;
        stored.name = resource.name.clone();
        stored.description = resource.description.clone();
        stored.file_path = resource.file_path.clone();
        stored.tags = resource.tags.clone();
        stored.usage_count = resource.usage_count;
        stored.is_public = resource.is_public;
        stored.properties = resource.properties.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn relocate_resources(&mut self, folder_id: Uuid, folder_path: &str) -> AppResult<u64> {
        let now = Utc::now();
        let mut updated = 0;
        for r in self
            .working
            .resources
            .values_mut()
            .filter(|r| r.folder_id == folder_id)
        {
            r.file_path = path::join(folder_path, &r.name);
            r.updated_at = now;
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_resources(&mut self, ids: &[Uuid]) -> AppResult<u64> {
        let mut removed = 0;
        for id in ids {
            if self.working.resources.remove(id).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn count_by_file_hash(&mut self, file_hash: &str) -> AppResult<u64> {
        Ok(self
            .working
            .resources
            .values()
            .filter(|r| r.file_hash == file_hash)
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetdeck_core::error::ErrorKind;
    use assetdeck_entity::category::AssetCategory;

    fn scope() -> FolderScope {
        FolderScope::new(Uuid::new_v4(), AssetCategory::Texture)
    }

    fn new_folder(scope: FolderScope, parent: Option<&Folder>, name: &str) -> CreateFolder {
        CreateFolder {
            owner_id: scope.owner_id,
            category: scope.category,
            parent_id: parent.map(|p| p.id),
            name: name.to_string(),
            path: path::join(parent.map(|p| p.path.as_str()).unwrap_or(""), name),
        }
    }

    fn new_resource(folder: &Folder, name: &str, hash: &str) -> CreateResource {
        CreateResource {
            owner_id: folder.owner_id,
            category: folder.category,
            folder_id: folder.id,
            name: name.to_string(),
            description: None,
            file_path: path::join(&folder.path, name),
            file_hash: hash.to_string(),
            file_name: format!("{name}.png"),
            width: Some(16),
            height: Some(16),
            format: Some("png".to_string()),
            file_size: 64,
            tags: Vec::new(),
            is_public: false,
            properties: None,
        }
    }

    #[tokio::test]
    async fn test_commit_publishes_changes() {
        let store = MemoryAssetStore::new();
        let scope = scope();

        let mut tx = store.begin().await.unwrap();
        tx.create_folder(&new_folder(scope, None, "sprites"))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(tx.find_folder_by_path(scope, "sprites").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_drop_rolls_back() {
        let store = MemoryAssetStore::new();
        let scope = scope();

        {
            let mut tx = store.begin().await.unwrap();
            tx.create_folder(&new_folder(scope, None, "sprites"))
                .await
                .unwrap();
        }

        let mut tx = store.begin().await.unwrap();
        assert!(tx.find_folder_by_path(scope, "sprites").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_path_is_conflict() {
        let store = MemoryAssetStore::new();
        let scope = scope();
        let mut tx = store.begin().await.unwrap();
        tx.create_folder(&new_folder(scope, None, "sprites"))
            .await
            .unwrap();

        let err = tx
            .create_folder(&new_folder(scope, None, "sprites"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        // Same path in another owner's scope is fine.
        tx.create_folder(&new_folder(self::scope(), None, "sprites"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_ensure_folder_returns_existing_row() {
        let store = MemoryAssetStore::new();
        let scope = scope();
        let mut tx = store.begin().await.unwrap();

        let first = tx
            .ensure_folder(&CreateFolder::category_root(scope))
            .await
            .unwrap();
        let second = tx
            .ensure_folder(&CreateFolder::category_root(scope))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(tx.list_folders(scope).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_descendants_match_whole_segments() {
        let store = MemoryAssetStore::new();
        let scope = scope();
        let mut tx = store.begin().await.unwrap();

        let ab = tx.create_folder(&new_folder(scope, None, "ab")).await.unwrap();
        let abc = tx.create_folder(&new_folder(scope, None, "abc")).await.unwrap();
        tx.create_folder(&new_folder(scope, Some(&ab), "x")).await.unwrap();
        tx.create_folder(&new_folder(scope, Some(&abc), "y")).await.unwrap();

        let found = tx.find_descendants(scope, "ab").await.unwrap();
        let paths: Vec<_> = found.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["ab.x"]);
    }

    #[tokio::test]
    async fn test_folder_delete_blocked_by_remaining_resources() {
        let store = MemoryAssetStore::new();
        let scope = scope();
        let mut tx = store.begin().await.unwrap();

        let folder = tx.create_folder(&new_folder(scope, None, "ui")).await.unwrap();
        let res = tx
            .create_resource(&new_resource(&folder, "icon", "h1"))
            .await
            .unwrap();

        let err = tx.delete_folders(&[folder.id]).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);

        tx.delete_resources(&[res.id]).await.unwrap();
        assert_eq!(tx.delete_folders(&[folder.id]).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_folder_delete_blocked_by_remaining_children() {
        let store = MemoryAssetStore::new();
        let scope = scope();
        let mut tx = store.begin().await.unwrap();

        let parent = tx.create_folder(&new_folder(scope, None, "a")).await.unwrap();
        let child = tx
            .create_folder(&new_folder(scope, Some(&parent), "b"))
            .await
            .unwrap();

        assert!(tx.delete_folders(&[parent.id]).await.is_err());
        assert_eq!(tx.delete_folders(&[parent.id, child.id]).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_resource_name_unique_per_folder() {
        let store = MemoryAssetStore::new();
        let scope = scope();
        let mut tx = store.begin().await.unwrap();

        let a = tx.create_folder(&new_folder(scope, None, "a")).await.unwrap();
        let b = tx.create_folder(&new_folder(scope, None, "b")).await.unwrap();
        tx.create_resource(&new_resource(&a, "stone", "h1")).await.unwrap();

        let err = tx
            .create_resource(&new_resource(&a, "stone", "h2"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        tx.create_resource(&new_resource(&b, "stone", "h1")).await.unwrap();

        let taken = tx
            .find_existing_names(a.id, &["stone".to_string(), "dirt".to_string()])
            .await
            .unwrap();
        assert_eq!(taken, vec!["stone".to_string()]);
        assert_eq!(tx.count_by_file_hash("h1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_relocate_resources_rewrites_file_path() {
        let store = MemoryAssetStore::new();
        let scope = scope();
        let mut tx = store.begin().await.unwrap();

        let folder = tx.create_folder(&new_folder(scope, None, "sprites")).await.unwrap();
        let res = tx
            .create_resource(&new_resource(&folder, "icon", "h1"))
            .await
            .unwrap();

        tx.update_folder_path(folder.id, None, "assets", "assets")
            .await
            .unwrap();
        assert_eq!(tx.relocate_resources(folder.id, "assets").await.unwrap(), 1);

        let moved = tx.find_resource(scope.owner_id, res.id).await.unwrap().unwrap();
        assert_eq!(moved.file_path, "assets.icon");
    }

    #[tokio::test]
    async fn test_lookups_are_owner_scoped() {
        let store = MemoryAssetStore::new();
        let scope = scope();
        let mut tx = store.begin().await.unwrap();

        let folder = tx.create_folder(&new_folder(scope, None, "ui")).await.unwrap();
        assert!(tx.find_folder(Uuid::new_v4(), folder.id).await.unwrap().is_none());
        assert!(tx.find_folder(scope.owner_id, folder.id).await.unwrap().is_some());
    }
}

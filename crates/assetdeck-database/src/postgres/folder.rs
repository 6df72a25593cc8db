//! Folder repository over PostgreSQL.

use async_trait::async_trait;
use uuid::Uuid;

use assetdeck_core::error::{AppError, ErrorKind};
use assetdeck_core::result::AppResult;
use assetdeck_entity::folder::{CreateFolder, Folder, FolderScope};

use super::{PgTx, descendant_pattern, map_read_err, map_write_err};
use crate::store::FolderRepository;

#[async_trait]
impl FolderRepository for PgTx {
    async fn find_folder(&mut self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_read_err("Failed to find folder"))
    }

    async fn find_folder_by_path(
        &mut self,
        scope: FolderScope,
        path: &str,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 AND category = $2 AND path = $3",
        )
        .bind(scope.owner_id)
        .bind(scope.category)
        .bind(path)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_read_err("Failed to find folder by path"))
    }

    async fn find_descendants(
        &mut self,
        scope: FolderScope,
        path: &str,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders \
             WHERE owner_id = $1 AND category = $2 AND path LIKE $3 \
             ORDER BY path ASC",
        )
        .bind(scope.owner_id)
        .bind(scope.category)
        .bind(descendant_pattern(path))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_read_err("Failed to list descendants"))
    }

    async fn list_children(
        &mut self,
        scope: FolderScope,
        parent_id: Option<Uuid>,
    ) -> AppResult<Vec<Folder>> {
        let query = match parent_id {
            Some(parent_id) => sqlx::query_as::<_, Folder>(
                "SELECT * FROM folders \
                 WHERE owner_id = $1 AND category = $2 AND parent_id = $3 \
                 ORDER BY name ASC",
            )
            .bind(scope.owner_id)
            .bind(scope.category)
            .bind(parent_id),
            None => sqlx::query_as::<_, Folder>(
                "SELECT * FROM folders \
                 WHERE owner_id = $1 AND category = $2 AND parent_id IS NULL \
                 ORDER BY name ASC",
            )
            .bind(scope.owner_id)
            .bind(scope.category),
        };

        query
            .fetch_all(&mut *self.tx)
            .await
            .map_err(map_read_err("Failed to list child folders"))
    }

    async fn list_folders(&mut self, scope: FolderScope) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 AND category = $2 ORDER BY path ASC",
        )
        .bind(scope.owner_id)
        .bind(scope.category)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_read_err("Failed to list folders"))
    }

    async fn create_folder(&mut self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (owner_id, category, parent_id, name, path) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(data.owner_id)
        .bind(data.category)
        .bind(data.parent_id)
        .bind(&data.name)
        .bind(&data.path)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            map_write_err(e, "Failed to create folder", || {
                format!("Folder path '{}' already exists", data.path)
            })
        })
    }

    async fn ensure_folder(&mut self, data: &CreateFolder) -> AppResult<Folder> {
        let inserted = sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (owner_id, category, parent_id, name, path) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (owner_id, category, path) DO NOTHING RETURNING *",
        )
        .bind(data.owner_id)
        .bind(data.category)
        .bind(data.parent_id)
        .bind(&data.name)
        .bind(&data.path)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_read_err("Failed to ensure folder"))?;

        if let Some(folder) = inserted {
            return Ok(folder);
        }

        self.find_folder_by_path(
            FolderScope::new(data.owner_id, data.category),
            &data.path,
        )
        .await?
        .ok_or_else(|| {
            AppError::new(
                ErrorKind::Database,
                format!("Folder '{}' vanished during insert", data.path),
            )
        })
    }

    async fn update_folder_path(
        &mut self,
        id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        path: &str,
    ) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET parent_id = $2, name = $3, path = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(parent_id)
        .bind(name)
        .bind(path)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| {
            map_write_err(e, "Failed to update folder path", || {
                format!("Folder path '{path}' already exists")
            })
        })?
        .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    async fn delete_folders(&mut self, ids: &[Uuid]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM folders WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut *self.tx)
            .await
            .map_err(map_read_err("Failed to delete folders"))?;
        Ok(result.rows_affected())
    }
}

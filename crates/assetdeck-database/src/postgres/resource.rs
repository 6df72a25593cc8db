//! Resource repository over PostgreSQL.

use async_trait::async_trait;
use uuid::Uuid;

use assetdeck_core::error::AppError;
use assetdeck_core::result::AppResult;
use assetdeck_entity::folder::FolderScope;
use assetdeck_entity::resource::{CreateResource, Resource};

use super::{PgTx, map_read_err, map_write_err};
use crate::store::ResourceRepository;

#[async_trait]
impl ResourceRepository for PgTx {
    async fn find_resource(&mut self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Resource>> {
        sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_read_err("Failed to find resource"))
    }

    async fn list_by_folder(&mut self, folder_id: Uuid) -> AppResult<Vec<Resource>> {
        sqlx::query_as::<_, Resource>(
            "SELECT * FROM resources WHERE folder_id = $1 ORDER BY name ASC",
        )
        .bind(folder_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_read_err("Failed to list resources"))
    }

    async fn list_by_folder_ids(&mut self, folder_ids: &[Uuid]) -> AppResult<Vec<Resource>> {
        if folder_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Resource>(
            "SELECT * FROM resources WHERE folder_id = ANY($1) ORDER BY file_path ASC",
        )
        .bind(folder_ids)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_read_err("Failed to list resources by folders"))
    }

    async fn list_resources(&mut self, scope: FolderScope) -> AppResult<Vec<Resource>> {
        sqlx::query_as::<_, Resource>(
            "SELECT * FROM resources WHERE owner_id = $1 AND category = $2 ORDER BY file_path ASC",
        )
        .bind(scope.owner_id)
        .bind(scope.category)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_read_err("Failed to list resources"))
    }

    async fn find_by_folder_and_name(
        &mut self,
        folder_id: Uuid,
        name: &str,
    ) -> AppResult<Option<Resource>> {
        sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE folder_id = $1 AND name = $2")
            .bind(folder_id)
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_read_err("Failed to find resource by name"))
    }

    async fn find_existing_names(
        &mut self,
        folder_id: Uuid,
        names: &[String],
    ) -> AppResult<Vec<String>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar::<_, String>(
            "SELECT name FROM resources WHERE folder_id = $1 AND name = ANY($2)",
        )
        .bind(folder_id)
        .bind(names)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_read_err("Failed to check existing resource names"))
    }

    async fn create_resource(&mut self, data: &CreateResource) -> AppResult<Resource> {
        sqlx::query_as::<_, Resource>(
            "INSERT INTO resources (owner_id, category, folder_id, name, description, file_path, \
             file_hash, file_name, width, height, format, file_size, tags, is_public, properties) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING *",
        )
        .bind(data.owner_id)
        .bind(data.category)
        .bind(data.folder_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.file_path)
        .bind(&data.file_hash)
        .bind(&data.file_name)
        .bind(data.width)
        .bind(data.height)
        .bind(&data.format)
        .bind(data.file_size)
        .bind(&data.tags)
        .bind(data.is_public)
        .bind(&data.properties)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            map_write_err(e, "Failed to create resource", || {
                format!("Resource \"{}\" already exists", data.name)
            })
        })
    }

    async fn update_resource(&mut self, resource: &Resource) -> AppResult<Resource> {
        sqlx::query_as::<_, Resource>(
            "UPDATE resources SET folder_id = $2, name = $3, description = $4, file_path = $5, \
             tags = $6, usage_count = $7, is_public = $8, properties = $9, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(resource.id)
        .bind(resource.folder_id)
        .bind(&resource.name)
        .bind(&resource.description)
        .bind(&resource.file_path)
        .bind(&resource.tags)
        .bind(resource.usage_count)
        .bind(resource.is_public)
        .bind(&resource.properties)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| {
            map_write_err(e, "Failed to update resource", || {
                format!("Resource \"{}\" already exists", resource.name)
            })
        })?
        .ok_or_else(|| AppError::not_found(format!("Resource {} not found", resource.id)))
    }

    async fn relocate_resources(&mut self, folder_id: Uuid, folder_path: &str) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE resources SET file_path = $2 || '.' || name, updated_at = NOW() \
             WHERE folder_id = $1",
        )
        .bind(folder_id)
        .bind(folder_path)
        .execute(&mut *self.tx)
        .await
        .map_err(map_read_err("Failed to relocate resources"))?;
        Ok(result.rows_affected())
    }

    async fn delete_resources(&mut self, ids: &[Uuid]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM resources WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut *self.tx)
            .await
            .map_err(map_read_err("Failed to delete resources"))?;
        Ok(result.rows_affected())
    }

    async fn count_by_file_hash(&mut self, file_hash: &str) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resources WHERE file_hash = $1")
            .bind(file_hash)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_read_err("Failed to count file references"))?;
        Ok(count as u64)
    }
}

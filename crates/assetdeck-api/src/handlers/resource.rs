//! Resource upload and single-resource handlers.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use uuid::Uuid;

use assetdeck_core::error::AppError;
use assetdeck_entity::category::AssetCategory;
use assetdeck_entity::resource::Resource;
use assetdeck_service::folder::RemovalReport;
use assetdeck_service::resource::{
    UpdateResourceRequest as SvcUpdateResource, UploadFile, UploadOptions, UploadTarget,
};

use crate::dto::request::{MoveResourceRequest, UpdateResourceRequest, validate_body};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::Owner;
use crate::state::AppState;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// POST /api/resources/upload (multipart)
///
/// Form fields: `target_folder_id`, or `category` with an optional dotted
/// `path`; optional `description`, comma separated `tags` and `is_public`;
/// then any number of file parts.
pub async fn upload_resources(
    State(state): State<AppState>,
    owner: Owner,
    mut multipart: Multipart,
) -> ApiResult<Vec<Resource>> {
    let mut folder_id: Option<Uuid> = None;
    let mut category: Option<AssetCategory> = None;
    let mut folder_path = String::new();
    let mut options = UploadOptions::default();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        if let Some(file_name) = field.file_name().map(String::from) {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
            files.push(UploadFile { file_name, data });
            continue;
        }

        let name = field.name().unwrap_or("").to_string();
        let text = field
            .text()
            .await
            .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
        match name.as_str() {
            "target_folder_id" => {
                folder_id = Some(
                    Uuid::parse_str(text.trim())
                        .map_err(|_| AppError::validation("Invalid target_folder_id"))?,
                );
            }
            "category" => category = Some(text.parse()?),
            "path" => folder_path = text.trim().to_string(),
            "description" => {
                options.description = Some(text).filter(|d| !d.trim().is_empty());
            }
            "tags" => {
                options.tags = text
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect();
            }
            "is_public" => {
                options.is_public = matches!(text.trim(), "true" | "1" | "on");
            }
            _ => {}
        }
    }

    let target = match (folder_id, category) {
        (Some(id), _) => UploadTarget::Folder(id),
        (None, Some(category)) => UploadTarget::Path {
            category,
            path: folder_path,
        },
        (None, None) => {
            return Err(AppError::validation("target_folder_id or category is required").into());
        }
    };

    let result = state
        .ingest_service
        .upload_many(&owner, target, files, options)
        .await?;

    Ok(Json(ApiResponse::from_batch(result)))
}

/// GET /api/resources/{id}
pub async fn get_resource(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> ApiResult<Resource> {
    let resource = state.resource_service.get(&owner, id).await?;
    Ok(Json(ApiResponse::ok(resource)))
}

/// PUT /api/resources/{id}
pub async fn update_resource(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateResourceRequest>,
) -> ApiResult<Resource> {
    validate_body(&req)?;
    let resource = state
        .resource_service
        .update(
            &owner,
            id,
            SvcUpdateResource {
                name: req.name,
                description: req.description,
                tags: req.tags,
                is_public: req.is_public,
                properties: req.properties,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(resource)))
}

/// PUT /api/resources/{id}/move
pub async fn move_resource(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveResourceRequest>,
) -> ApiResult<Resource> {
    let resource = state
        .resource_service
        .move_resource(&owner, id, req.target_folder_id)
        .await?;
    Ok(Json(ApiResponse::ok(resource)))
}

/// DELETE /api/resources/{id}
pub async fn delete_resource(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> ApiResult<RemovalReport> {
    let report = state.resource_service.delete(&owner, id).await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// POST /api/resources/{id}/usage
pub async fn record_usage(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> ApiResult<Resource> {
    let resource = state.resource_service.record_usage(&owner, id).await?;
    Ok(Json(ApiResponse::ok(resource)))
}

//! Folder CRUD, tree, removal and download handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use uuid::Uuid;

use assetdeck_core::error::AppError;
use assetdeck_entity::folder::{Folder, TreeNode};
use assetdeck_entity::resource::Resource;
use assetdeck_service::folder::{CreateFolderRequest as SvcCreateFolder, RemovalReport};

use crate::dto::request::{
    CategoryQuery, CreateFolderRequest, FolderTargetRequest, RenameFolderRequest, validate_body,
};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::Owner;
use crate::state::AppState;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// GET /api/folders?category=...
pub async fn list_root_folders(
    State(state): State<AppState>,
    owner: Owner,
    Query(query): Query<CategoryQuery>,
) -> ApiResult<Vec<Folder>> {
    let folders = state
        .folder_service
        .list_roots(&owner, query.category)
        .await?;
    Ok(Json(ApiResponse::ok(folders)))
}

/// GET /api/folders/tree?category=...
pub async fn get_tree(
    State(state): State<AppState>,
    owner: Owner,
    Query(query): Query<CategoryQuery>,
) -> ApiResult<TreeNode> {
    let tree = state.tree_service.build_tree(&owner, query.category).await?;
    Ok(Json(ApiResponse::ok(tree)))
}

/// GET /api/folders/{id}
pub async fn get_folder(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> ApiResult<Folder> {
    let folder = state.folder_service.get_folder(&owner, id).await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// GET /api/folders/{id}/children
pub async fn list_children(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<Folder>> {
    let children = state.folder_service.list_children(&owner, id).await?;
    Ok(Json(ApiResponse::ok(children)))
}

/// GET /api/folders/{id}/resources
pub async fn list_resources(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<Resource>> {
    let resources = state.resource_service.list(&owner, id).await?;
    Ok(Json(ApiResponse::ok(resources)))
}

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    owner: Owner,
    Json(req): Json<CreateFolderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Folder>>), ApiError> {
    validate_body(&req)?;
    let folder = state
        .folder_service
        .create_folder(
            &owner,
            SvcCreateFolder {
                category: req.category,
                parent_id: req.parent_id,
                name: req.name,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(folder))))
}

/// PUT /api/folders/{id}
pub async fn rename_folder(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameFolderRequest>,
) -> ApiResult<Folder> {
    validate_body(&req)?;
    let folder = state
        .folder_service
        .rename_folder(&owner, id, &req.name)
        .await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// PUT /api/folders/{id}/move
pub async fn move_folder(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
    Json(req): Json<FolderTargetRequest>,
) -> ApiResult<Folder> {
    let folder = state
        .folder_service
        .move_folder(&owner, id, req.target_parent_id)
        .await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// POST /api/folders/{id}/copy
pub async fn copy_folder(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
    Json(req): Json<FolderTargetRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Folder>>), ApiError> {
    let copy = state
        .folder_service
        .copy_folder(&owner, id, req.target_parent_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(copy))))
}

/// DELETE /api/folders/{id}
pub async fn delete_folder(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> ApiResult<RemovalReport> {
    let report = state.removal_service.delete_folder(&owner, id).await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// POST /api/folders/{id}/clear
pub async fn clear_folder(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> ApiResult<RemovalReport> {
    let report = state.removal_service.clear_folder(&owner, id).await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// GET /api/folders/{id}/download
pub async fn download_folder(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let archive = state.archive_service.download_folder(&owner, id).await?;
    let file_name = archive.file_name.replace('"', "_");

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        )
        .header(header::CONTENT_LENGTH, archive.data.len())
        .header("x-archive-included", archive.included)
        .header("x-archive-total", archive.total)
        .body(Body::from(archive.data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

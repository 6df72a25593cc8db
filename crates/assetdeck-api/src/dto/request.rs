//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use assetdeck_core::error::AppError;
use assetdeck_entity::category::AssetCategory;

/// Run the derive rules of a request body.
pub fn validate_body<T: Validate>(body: &T) -> Result<(), AppError> {
    body.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))
}

/// `?category=` query parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryQuery {
    /// Category partition.
    pub category: AssetCategory,
}

/// Create folder request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Category partition.
    pub category: AssetCategory,
    /// Parent folder ID (omit for a top-level folder).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    #[validate(length(min = 1, max = 255, message = "Folder name is required"))]
    pub name: String,
}

/// Rename folder request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenameFolderRequest {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "Folder name is required"))]
    pub name: String,
}

/// Move or copy target. `None` means the top level of the category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderTargetRequest {
    /// Destination parent folder.
    #[serde(default)]
    pub target_parent_id: Option<Uuid>,
}

/// Update resource request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateResourceRequest {
    /// New name.
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    /// New description.
    #[validate(length(max = 4096))]
    pub description: Option<String>,
    /// Replacement tags.
    pub tags: Option<Vec<String>>,
    /// Visibility.
    pub is_public: Option<bool>,
    /// Replacement domain properties.
    pub properties: Option<serde_json::Value>,
}

/// Move resource request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveResourceRequest {
    /// Destination folder.
    pub target_folder_id: Uuid,
}

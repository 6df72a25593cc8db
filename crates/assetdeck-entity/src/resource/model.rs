//! Resource entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use assetdeck_core::path;

use crate::category::AssetCategory;

/// A file-like asset record. Several resources may share one physical
/// file through `file_hash`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Resource {
    /// Unique resource identifier.
    pub id: Uuid,
    /// The resource owner.
    pub owner_id: Uuid,
    /// Category; always equal to the containing folder's category.
    pub category: AssetCategory,
    /// Containing folder. This is the authoritative location.
    pub folder_id: Uuid,
    /// Name, unique within the folder.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Cached `folder.path + "." + name`.
    pub file_path: String,
    /// SHA-256 hex digest of the physical content.
    pub file_hash: String,
    /// Original upload file name, including extension.
    pub file_name: String,
    /// Image width in pixels, when known.
    pub width: Option<i32>,
    /// Image height in pixels, when known.
    pub height: Option<i32>,
    /// Lowercase format, e.g. `png` or `json`.
    pub format: Option<String>,
    /// Size of the physical content in bytes.
    pub file_size: i64,
    /// Tags.
    pub tags: Vec<String>,
    /// Number of times the asset was referenced by content creators.
    pub usage_count: i32,
    /// Whether other users may see the resource.
    pub is_public: bool,
    /// Render properties, face mappings or PBR parameters. Opaque here.
    pub properties: Option<serde_json::Value>,
    /// When the resource was created.
    pub created_at: DateTime<Utc>,
    /// When the resource was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    /// Lowercase extension of the original file name, if any.
    pub fn extension(&self) -> Option<String> {
        file_extension(&self.file_name)
    }

    /// Data for a copy of this resource placed in another folder. The copy
    /// shares the physical file and starts with a zero usage counter.
    pub fn duplicate_into(&self, folder_id: Uuid, folder_path: &str) -> CreateResource {
        CreateResource {
            owner_id: self.owner_id,
            category: self.category,
            folder_id,
            name: self.name.clone(),
            description: self.description.clone(),
            file_path: path::join(folder_path, &self.name),
            file_hash: self.file_hash.clone(),
            file_name: self.file_name.clone(),
            width: self.width,
            height: self.height,
            format: self.format.clone(),
            file_size: self.file_size,
            tags: self.tags.clone(),
            is_public: self.is_public,
            properties: self.properties.clone(),
        }
    }
}

/// Data required to create a new resource record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResource {
    /// The resource owner.
    pub owner_id: Uuid,
    /// Category.
    pub category: AssetCategory,
    /// Containing folder.
    pub folder_id: Uuid,
    /// Name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Cached dotted path.
    pub file_path: String,
    /// Content hash.
    pub file_hash: String,
    /// Original file name.
    pub file_name: String,
    /// Width.
    pub width: Option<i32>,
    /// Height.
    pub height: Option<i32>,
    /// Format.
    pub format: Option<String>,
    /// Size in bytes.
    pub file_size: i64,
    /// Tags.
    pub tags: Vec<String>,
    /// Visibility.
    pub is_public: bool,
    /// Opaque domain payload.
    pub properties: Option<serde_json::Value>,
}

/// Split a file name into its stem and lowercase extension.
///
/// `"stone.PNG"` gives `("stone", Some("png"))`; a leading dot is part of
/// the stem, so `".hidden"` has no extension.
pub fn split_file_name(file_name: &str) -> (&str, Option<String>) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => (&file_name[..idx], Some(file_name[idx + 1..].to_lowercase())),
        _ => (file_name, None),
    }
}

/// Lowercase extension of `file_name`, if any.
pub fn file_extension(file_name: &str) -> Option<String> {
    split_file_name(file_name).1.filter(|ext| !ext.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_file_name() {
        assert_eq!(split_file_name("stone.png"), ("stone", Some("png".to_string())));
        assert_eq!(split_file_name("stone.PNG").1.as_deref(), Some("png"));
        assert_eq!(split_file_name("stone"), ("stone", None));
        assert_eq!(split_file_name(".hidden"), (".hidden", None));
        assert_eq!(
            split_file_name("grass.top.png"),
            ("grass.top", Some("png".to_string()))
        );
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("a.json").as_deref(), Some("json"));
        assert_eq!(file_extension("a."), None);
        assert_eq!(file_extension("a"), None);
    }
}

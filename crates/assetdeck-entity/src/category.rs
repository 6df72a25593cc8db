//! Asset categories partitioning the folder forest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use assetdeck_core::error::AppError;

/// Partition key for folders and resources. Folders of different
/// categories never interact.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "asset_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    /// Texture images.
    Texture,
    /// Voxel block definitions.
    Block,
    /// Material definitions.
    Material,
}

impl AssetCategory {
    /// All categories, in display order.
    pub const ALL: [AssetCategory; 3] = [Self::Texture, Self::Block, Self::Material];

    /// Name of the lazily created root folder for this category.
    pub fn root_name(&self) -> &'static str {
        match self {
            Self::Texture => "textures",
            Self::Block => "blocks",
            Self::Material => "materials",
        }
    }

    /// Whether uploads in this category must be decodable images.
    pub fn requires_image(&self) -> bool {
        matches!(self, Self::Texture)
    }

    /// Lowercase identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Texture => "texture",
            Self::Block => "block",
            Self::Material => "material",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "texture" | "textures" => Ok(Self::Texture),
            "block" | "blocks" => Ok(Self::Block),
            "material" | "materials" => Ok(Self::Material),
            other => Err(AppError::validation(format!("Unknown category '{other}'"))),
        }
    }
}

//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use assetdeck_core::path;

use crate::action::NodeKind;
use crate::category::AssetCategory;

/// A virtual folder. Its location is the materialized dotted `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// The folder owner.
    pub owner_id: Uuid,
    /// Category partition.
    pub category: AssetCategory,
    /// Parent folder ID (null for top-level folders).
    pub parent_id: Option<Uuid>,
    /// Leaf name, unique among siblings.
    pub name: String,
    /// Full dotted path including `name`, e.g. `sprites.ui`.
    pub path: String,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a top-level folder (no parent).
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check if this is the lazily created root folder of its category.
    pub fn is_category_root(&self) -> bool {
        self.is_top_level() && self.path == self.category.root_name()
    }

    /// Node type used for action checks and tree display.
    pub fn node_kind(&self) -> NodeKind {
        if self.is_category_root() {
            NodeKind::Root
        } else {
            NodeKind::Folder
        }
    }

    /// Depth in the tree (1 for top-level folders).
    pub fn depth(&self) -> usize {
        path::depth(&self.path)
    }

    /// The `(owner, category)` scope this folder belongs to.
    pub fn scope(&self) -> FolderScope {
        FolderScope {
            owner_id: self.owner_id,
            category: self.category,
        }
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// The folder owner.
    pub owner_id: Uuid,
    /// Category partition.
    pub category: AssetCategory,
    /// Parent folder (None for top-level).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
    /// Full materialized path.
    pub path: String,
}

impl CreateFolder {
    /// Build the record for the root folder of `scope`.
    pub fn category_root(scope: FolderScope) -> Self {
        let name = scope.category.root_name().to_string();
        Self {
            owner_id: scope.owner_id,
            category: scope.category,
            parent_id: None,
            path: name.clone(),
            name,
        }
    }
}

/// Uniqueness scope of folder paths: one forest per owner and category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FolderScope {
    /// The owner.
    pub owner_id: Uuid,
    /// The category.
    pub category: AssetCategory,
}

impl FolderScope {
    /// Creates a new scope.
    pub fn new(owner_id: Uuid, category: AssetCategory) -> Self {
        Self { owner_id, category }
    }
}

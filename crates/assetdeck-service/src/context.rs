//! Request context carrying the acting owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use assetdeck_entity::category::AssetCategory;
use assetdeck_entity::folder::FolderScope;

/// Context for the current request.
///
/// Every repository lookup made on behalf of the request is scoped to
/// `owner_id`; rows of other owners behave as if they did not exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting owner's ID.
    pub owner_id: Uuid,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            request_time: Utc::now(),
        }
    }

    /// The folder scope of this owner within `category`.
    pub fn scope(&self, category: AssetCategory) -> FolderScope {
        FolderScope::new(self.owner_id, category)
    }
}

//! Response DTOs.

use serde::{Deserialize, Serialize};

use assetdeck_service::resource::BatchUploadResult;

/// Standard response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Per-item failures of a partially successful request.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            errors: Vec::new(),
        }
    }
}

impl ApiResponse<Vec<assetdeck_entity::resource::Resource>> {
    /// Envelope for a batch upload: created resources as data, rejected
    /// files as errors. `success` is false only when nothing was created.
    pub fn from_batch(result: BatchUploadResult) -> Self {
        let success = !result.created.is_empty() || result.errors.is_empty();
        Self {
            success,
            data: Some(result.created),
            errors: result.errors,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Persistence backend name.
    pub database: String,
    /// Whether the database answered.
    pub database_ok: bool,
    /// Whether file storage is reachable.
    pub storage_ok: bool,
}

//! Physical file storage configuration.

use serde::{Deserialize, Serialize};

/// Which provider holds the physical asset files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Files on the local filesystem under `local.root_path`.
    #[default]
    Local,
    /// Process-local object map.
    Memory,
}

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage provider to use.
    #[serde(default)]
    pub provider: StorageBackend,
    /// Maximum size of a single uploaded file in bytes (default 64 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Maximum number of files accepted by one batch upload.
    #[serde(default = "default_max_batch_files")]
    pub max_batch_files: usize,
    /// Local filesystem storage configuration.
    #[serde(default)]
    pub local: LocalStorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageBackend::default(),
            max_upload_size_bytes: default_max_upload(),
            max_batch_files: default_max_batch_files(),
            local: LocalStorageConfig::default(),
        }
    }
}

/// Local filesystem storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Root path for stored objects.
    #[serde(default = "default_local_root")]
    pub root_path: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_local_root(),
        }
    }
}

fn default_max_upload() -> u64 {
    67_108_864 // 64 MB
}

fn default_max_batch_files() -> usize {
    200
}

fn default_local_root() -> String {
    "./data/objects".to_string()
}

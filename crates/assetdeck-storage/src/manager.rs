//! Content-addressed storage on top of a [`StorageProvider`].

use std::sync::Arc;

use bytes::Bytes;
use sha2::{Digest, Sha256};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use assetdeck_core::config::{StorageBackend, StorageConfig};
use assetdeck_core::error::AppError;
use assetdeck_core::result::AppResult;
use assetdeck_core::traits::storage::StorageProvider;

use crate::providers::{LocalStorageProvider, MemoryStorageProvider};

/// Result of storing one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// SHA-256 hex digest of the content.
    pub hash: String,
    /// Content length in bytes.
    pub size: u64,
    /// False when identical content was already present.
    pub created: bool,
}

/// Stores each distinct content exactly once, keyed by its digest.
///
/// Objects are shared by every resource with the same digest, so an
/// object may only be unlinked while nobody is about to reference it.
/// Writers that will record a new reference hold a [`reference_guard`]
/// from [`write_object`] until their row is committed; the cleanup path
/// holds the [`unlink_guard`] while it re-counts references and unlinks.
///
/// [`reference_guard`]: StorageManager::reference_guard
/// [`write_object`]: StorageManager::write_object
/// [`unlink_guard`]: StorageManager::unlink_guard
#[derive(Debug, Clone)]
pub struct StorageManager {
    provider: Arc<dyn StorageProvider>,
    gate: Arc<RwLock<()>>,
}

impl StorageManager {
    /// Wrap an existing provider.
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self {
            provider,
            gate: Arc::new(RwLock::new(())),
        }
    }

    /// Build the provider selected by configuration.
    pub async fn from_config(config: &StorageConfig) -> AppResult<Self> {
        let provider: Arc<dyn StorageProvider> = match config.provider {
            StorageBackend::Local => {
                info!(root = %config.local.root_path, "Using local object storage");
                Arc::new(LocalStorageProvider::new(&config.local.root_path).await?)
            }
            StorageBackend::Memory => {
                info!("Using in-memory object storage");
                Arc::new(MemoryStorageProvider::new())
            }
        };
        Ok(Self::new(provider))
    }

    /// The underlying provider.
    pub fn provider(&self) -> &Arc<dyn StorageProvider> {
        &self.provider
    }

    /// SHA-256 hex digest of `data`.
    pub fn hash_of(data: &[u8]) -> String {
        format!("{:x}", Sha256::digest(data))
    }

    /// Object key for a digest, fanned out by its first two characters.
    pub fn object_key(hash: &str) -> AppResult<String> {
        if hash.len() < 3 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AppError::storage(format!("Invalid content hash: {hash}")));
        }
        Ok(format!("{}/{}", &hash[..2], hash))
    }

    /// Store `data`, skipping the write when the content already exists.
    pub async fn write_object(&self, data: Bytes) -> AppResult<StoredObject> {
        let hash = Self::hash_of(&data);
        let key = Self::object_key(&hash)?;
        let size = data.len() as u64;

        if self.provider.exists(&key).await? {
            debug!(hash = %hash, "Content already stored");
            return Ok(StoredObject {
                hash,
                size,
                created: false,
            });
        }

        self.provider.write(&key, data).await?;
        debug!(hash = %hash, size, "Stored new content");
        Ok(StoredObject {
            hash,
            size,
            created: true,
        })
    }

    /// Read the content for a digest.
    pub async fn read_object(&self, hash: &str) -> AppResult<Bytes> {
        self.provider.read_bytes(&Self::object_key(hash)?).await
    }

    /// Remove the content for a digest.
    pub async fn unlink(&self, hash: &str) -> AppResult<()> {
        self.provider.delete(&Self::object_key(hash)?).await
    }

    /// Whether content for a digest is present.
    pub async fn exists(&self, hash: &str) -> AppResult<bool> {
        self.provider.exists(&Self::object_key(hash)?).await
    }

    /// Shared guard for writers that store an object and then commit a
    /// reference to it. Many may be held at once.
    pub async fn reference_guard(&self) -> RwLockReadGuard<'_, ()> {
        self.gate.read().await
    }

    /// Exclusive guard for re-counting references and unlinking objects.
    /// Waits for every outstanding [`reference_guard`](Self::reference_guard).
    pub async fn unlink_guard(&self) -> RwLockWriteGuard<'_, ()> {
        self.gate.write().await
    }

    /// Provider health.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.provider.health_check().await
    }
}

//! Batch upload of resources.
//!
//! All names are checked against the target folder in one query before
//! anything is written, so conflicting files are reported without
//! touching storage. Each remaining file is then stored and recorded in
//! its own transaction: one bad file never takes the rest of the batch
//! down with it.

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use assetdeck_core::config::StorageConfig;
use assetdeck_core::error::{AppError, ErrorKind};
use assetdeck_core::path;
use assetdeck_core::result::AppResult;
use assetdeck_core::traits::metadata::MetadataProbe;
use assetdeck_database::{AssetStore, AssetTx};
use assetdeck_entity::category::AssetCategory;
use assetdeck_entity::folder::{CreateFolder, Folder};
use assetdeck_entity::resource::{CreateResource, Resource, split_file_name};
use assetdeck_storage::StorageManager;

use crate::context::RequestContext;
use crate::folder::{check_no_resource, check_no_subfolder, ensure_root, load_folder};

/// Where an upload batch lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UploadTarget {
    /// An existing folder.
    Folder(Uuid),
    /// A dotted folder path in a category; missing folders are created.
    /// The empty path is the category root.
    Path {
        /// Category.
        category: AssetCategory,
        /// Dotted folder path.
        path: String,
    },
}

/// One file of a batch.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Original file name including extension.
    pub file_name: String,
    /// Content.
    pub data: Bytes,
}

/// Attributes applied to every resource of a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadOptions {
    /// Description.
    pub description: Option<String>,
    /// Tags.
    pub tags: Vec<String>,
    /// Visibility.
    pub is_public: bool,
}

/// Per-item outcome of a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchUploadResult {
    /// Resources created.
    pub created: Vec<Resource>,
    /// One message per rejected file: `Resource "<file>" <reason>`.
    pub errors: Vec<String>,
}

/// Reasons a single file is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    AlreadyExists,
    InvalidName,
    TooLarge,
    NotAnImage,
    StoreFailed,
}

impl Rejection {
    fn message(self, file_name: &str) -> String {
        let reason = match self {
            Self::AlreadyExists => "already exists",
            Self::InvalidName => "has an invalid name",
            Self::TooLarge => "exceeds the maximum upload size",
            Self::NotAnImage => "is not a readable image",
            Self::StoreFailed => "could not be stored",
        };
        format!("Resource \"{file_name}\" {reason}")
    }
}

/// A file that passed the up-front checks.
struct Candidate {
    name: String,
    extension: Option<String>,
    file: UploadFile,
}

/// Ingests batches of uploaded files.
#[derive(Debug, Clone)]
pub struct IngestService {
    /// Persistence.
    store: Arc<dyn AssetStore>,
    /// Physical files.
    storage: StorageManager,
    /// Image metadata extraction.
    probe: Arc<dyn MetadataProbe>,
    /// Largest accepted file.
    max_upload_size_bytes: u64,
    /// Largest accepted batch.
    max_batch_files: usize,
}

impl IngestService {
    /// Creates a new ingest service.
    pub fn new(
        store: Arc<dyn AssetStore>,
        storage: StorageManager,
        probe: Arc<dyn MetadataProbe>,
        config: &StorageConfig,
    ) -> Self {
        Self {
            store,
            storage,
            probe,
            max_upload_size_bytes: config.max_upload_size_bytes,
            max_batch_files: config.max_batch_files,
        }
    }

    /// Upload a batch of files into one folder. Files are named after
    /// their stem; success is reported per file.
    pub async fn upload_many(
        &self,
        ctx: &RequestContext,
        target: UploadTarget,
        files: Vec<UploadFile>,
        options: UploadOptions,
    ) -> AppResult<BatchUploadResult> {
        if files.is_empty() {
            return Err(AppError::validation("No files provided"));
        }
        if files.len() > self.max_batch_files {
            return Err(AppError::validation(format!(
                "Too many files in one upload ({} > {})",
                files.len(),
                self.max_batch_files
            )));
        }

        let mut result = BatchUploadResult::default();
        let total = files.len();

        let (folder, candidates) = {
            let mut tx = self.store.begin().await?;
            let folder = resolve_target(tx.as_mut(), ctx, &target).await?;
            let candidates = self
                .screen(tx.as_mut(), &folder, files, &mut result.errors)
                .await?;
            tx.commit().await?;
            (folder, candidates)
        };

        for candidate in candidates {
            match self.ingest_one(ctx, &folder, &candidate, &options).await {
                Ok(resource) => result.created.push(resource),
                Err(rejection) => result.errors.push(rejection.message(&candidate.file.file_name)),
            }
        }

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder.id,
            path = %folder.path,
            total,
            created = result.created.len(),
            rejected = result.errors.len(),
            "Batch upload finished"
        );

        Ok(result)
    }

    /// Reject invalid, oversized and conflicting files before any of them
    /// is written.
    async fn screen(
        &self,
        tx: &mut dyn AssetTx,
        folder: &Folder,
        files: Vec<UploadFile>,
        errors: &mut Vec<String>,
    ) -> AppResult<Vec<Candidate>> {
        let mut seen = HashSet::new();
        let mut named = Vec::with_capacity(files.len());

        for file in files {
            let (stem, extension) = split_file_name(&file.file_name);
            let name = stem.to_string();
            if path::validate_segment(&name).is_err() {
                errors.push(Rejection::InvalidName.message(&file.file_name));
            } else if file.data.len() as u64 > self.max_upload_size_bytes {
                errors.push(Rejection::TooLarge.message(&file.file_name));
            } else if !seen.insert(name.clone()) {
                errors.push(Rejection::AlreadyExists.message(&file.file_name));
            } else {
                named.push(Candidate {
                    name,
                    extension,
                    file,
                });
            }
        }

        let names: Vec<String> = named.iter().map(|c| c.name.clone()).collect();
        let mut taken: HashSet<String> = tx
            .find_existing_names(folder.id, &names)
            .await?
            .into_iter()
            .collect();
        taken.extend(
            tx.list_children(folder.scope(), Some(folder.id))
                .await?
                .into_iter()
                .map(|child| child.name),
        );

        let mut valid = Vec::with_capacity(named.len());
        for candidate in named {
            if taken.contains(&candidate.name) {
                errors.push(Rejection::AlreadyExists.message(&candidate.file.file_name));
            } else {
                valid.push(candidate);
            }
        }
        Ok(valid)
    }

    /// Probe, store and record one file.
    async fn ingest_one(
        &self,
        ctx: &RequestContext,
        folder: &Folder,
        candidate: &Candidate,
        options: &UploadOptions,
    ) -> Result<Resource, Rejection> {
        let file = &candidate.file;

        let (width, height, format) = if folder.category.requires_image() {
            let meta = self.probe.probe(&file.data).map_err(|e| {
                warn!(file = %file.file_name, error = %e, "Rejected unreadable image");
                Rejection::NotAnImage
            })?;
            (
                i32::try_from(meta.width).ok(),
                i32::try_from(meta.height).ok(),
                Some(meta.format),
            )
        } else {
            (None, None, candidate.extension.clone())
        };

        // Held until the row commits so a concurrent purge cannot unlink
        // the object in between.
        let _reference = self.storage.reference_guard().await;
        let stored = self
            .storage
            .write_object(file.data.clone())
            .await
            .map_err(|e| {
                error!(file = %file.file_name, error = %e, "Failed to store upload");
                Rejection::StoreFailed
            })?;

        let data = CreateResource {
            owner_id: ctx.owner_id,
            category: folder.category,
            folder_id: folder.id,
            name: candidate.name.clone(),
            description: options.description.clone(),
            file_path: path::join(&folder.path, &candidate.name),
            file_hash: stored.hash,
            file_name: file.file_name.clone(),
            width,
            height,
            format,
            file_size: i64::try_from(stored.size).unwrap_or(i64::MAX),
            tags: options.tags.clone(),
            is_public: options.is_public,
            properties: None,
        };

        self.record(folder, &data).await.map_err(|e| {
            if e.kind == ErrorKind::Conflict {
                Rejection::AlreadyExists
            } else {
                error!(file = %file.file_name, error = %e, "Failed to record upload");
                Rejection::StoreFailed
            }
        })
    }

    async fn record(&self, folder: &Folder, data: &CreateResource) -> AppResult<Resource> {
        let mut tx = self.store.begin().await?;
        check_no_subfolder(tx.as_mut(), folder, &data.name).await?;
        let resource = tx.create_resource(data).await?;
        tx.commit().await?;
        Ok(resource)
    }
}

/// Resolve the batch target, creating missing folders along a path.
async fn resolve_target(
    tx: &mut dyn AssetTx,
    ctx: &RequestContext,
    target: &UploadTarget,
) -> AppResult<Folder> {
    match target {
        UploadTarget::Folder(id) => load_folder(tx, ctx.owner_id, *id).await,
        UploadTarget::Path { category, path: dotted } => {
            path::validate_path(dotted)?;
            let scope = ctx.scope(*category);
            let root = ensure_root(tx, scope).await?;
            if dotted.is_empty() {
                return Ok(root);
            }

            let mut parent: Option<Folder> = None;
            for segment in path::segments(dotted) {
                let parent_id = parent.as_ref().map(|p| p.id);
                check_no_resource(tx, parent_id, segment).await?;
                let parent_path = parent.as_ref().map(|p| p.path.as_str()).unwrap_or("");
                let folder = tx
                    .ensure_folder(&CreateFolder {
                        owner_id: ctx.owner_id,
                        category: *category,
                        parent_id,
                        name: segment.to_string(),
                        path: path::join(parent_path, segment),
                    })
                    .await?;
                parent = Some(folder);
            }
            parent.ok_or_else(|| AppError::validation("Upload path is empty"))
        }
    }
}

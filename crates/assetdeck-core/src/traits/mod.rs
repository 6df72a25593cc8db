//! Collaborator traits defined in `assetdeck-core` and implemented by other crates.

pub mod metadata;
pub mod storage;

pub use metadata::{ImageMetadata, MetadataProbe};
pub use storage::StorageProvider;

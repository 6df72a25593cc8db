//! # assetdeck-storage
//!
//! Physical file handling for AssetDeck. Uploaded content is stored once
//! per SHA-256 digest; resources reference it through `file_hash` and the
//! folder hierarchy never reaches the storage layer.

pub mod archive;
pub mod manager;
pub mod probe;
pub mod providers;

pub use archive::ZipArchiver;
pub use manager::{StorageManager, StoredObject};
pub use probe::ImageProbe;

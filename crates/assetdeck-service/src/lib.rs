//! # assetdeck-service
//!
//! Business logic for AssetDeck. Every operation opens one transaction on
//! the [`AssetStore`](assetdeck_database::AssetStore), performs all of its
//! checks and writes through it, and commits at the end; an early return
//! drops the transaction and nothing is applied. Physical file writes and
//! unlinks happen outside the transaction.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod folder;
pub mod resource;

#[cfg(test)]
pub(crate) mod testing;

pub use context::RequestContext;
pub use folder::{ArchiveService, FolderService, RemovalReport, RemovalService, TreeService};
pub use resource::{IngestService, ResourceService};

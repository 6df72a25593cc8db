//! Resource editing and batch ingest.

pub mod ingest;
pub mod service;

pub use ingest::{BatchUploadResult, IngestService, UploadFile, UploadOptions, UploadTarget};
pub use service::{ResourceService, UpdateResourceRequest};

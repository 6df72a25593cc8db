//! # assetdeck-core
//!
//! Core crate for AssetDeck. Contains the unified error system,
//! configuration schemas, the dot-delimited path model used by the
//! virtual folder hierarchy, and the traits for external collaborators
//! (physical file storage and image metadata probing).
//!
//! This crate has **no** internal dependencies on other AssetDeck crates.

pub mod config;
pub mod error;
pub mod path;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;

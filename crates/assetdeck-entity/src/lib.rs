//! # assetdeck-entity
//!
//! Domain entity models for AssetDeck. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities additionally derive `sqlx::FromRow`.

pub mod action;
pub mod category;
pub mod folder;
pub mod resource;

pub use action::{Action, NodeKind};
pub use category::AssetCategory;

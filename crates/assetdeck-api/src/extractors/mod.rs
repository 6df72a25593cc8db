//! Custom Axum extractors.

pub mod owner;

pub use owner::{OWNER_HEADER, Owner};

//! Resource (texture / block / material) domain entities.

pub mod model;

pub use model::{CreateResource, Resource, file_extension, split_file_name};

//! Request handlers, one module per resource type.

pub mod folder;
pub mod health;
pub mod resource;

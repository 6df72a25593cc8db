//! Image metadata extraction trait.

use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Dimensions and encoding of an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Lowercase format name, e.g. `png`.
    pub format: String,
}

/// Extracts [`ImageMetadata`] from raw file bytes.
pub trait MetadataProbe: Send + Sync + std::fmt::Debug + 'static {
    /// Probe the given bytes. Fails when the content is not a readable image.
    fn probe(&self, data: &[u8]) -> AppResult<ImageMetadata>;
}

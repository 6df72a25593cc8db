//! Convenience result type alias for AssetDeck.

use crate::error::AppError;

/// A specialized `Result` type for AssetDeck operations.
pub type AppResult<T> = Result<T, AppError>;

//! `Owner` extractor: reads the acting owner from the `X-Owner-Id` header.
//!
//! Authentication happens upstream; the gateway forwards the owner ID.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use assetdeck_core::error::AppError;
use assetdeck_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the owner ID.
pub const OWNER_HEADER: &str = "x-owner-id";

/// Request context of the acting owner, available in handlers.
#[derive(Debug, Clone)]
pub struct Owner(pub RequestContext);

impl std::ops::Deref for Owner {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::validation("Missing X-Owner-Id header"))?;

        let owner_id = Uuid::parse_str(header.trim())
            .map_err(|_| AppError::validation("Invalid X-Owner-Id header"))?;

        Ok(Owner(RequestContext::new(owner_id)))
    }
}

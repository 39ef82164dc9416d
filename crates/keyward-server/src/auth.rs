use std::sync::Arc;

use axum::Extension;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;

use keyward_core::traits::SessionStore;
use keyward_core::types::Session;

use crate::error::ApiError;

/// A newtype wrapper around the session store, added as an Axum Extension so
/// the extractor can reach it without knowing the state's generic parameters.
#[derive(Clone)]
pub struct Sessions(pub Arc<dyn SessionStore>);

/// An authenticated admin session extracted from a valid bearer token.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

impl AdminSession {
    pub fn token(&self) -> &str {
        &self.0.token
    }
}

impl<St> FromRequestParts<St> for AdminSession
where
    St: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &St) -> Result<Self, Self::Rejection> {
        let Extension(sessions) = Extension::<Sessions>::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalError",
                    "session store not configured",
                )
            })?;

        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError::new(
                    StatusCode::UNAUTHORIZED,
                    "AuthenticationRequired",
                    "Missing authorization header",
                )
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::new(
                StatusCode::UNAUTHORIZED,
                "AuthenticationRequired",
                "Invalid authorization format",
            )
        })?;

        let session = keyward_identity::validate_session(sessions.0.as_ref(), token).await?;
        Ok(AdminSession(session))
    }
}

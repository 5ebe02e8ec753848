//! Route guards.
//!
//! Extractors that turn the request's [`Authentication`] into a verified
//! principal, or reject before the handler (and therefore the store) runs.

use axum::{extract::FromRequestParts, http::request::Parts};

use hrportal_auth::{Principal, require_admin};

use crate::app::errors::ApiError;
use crate::context::Authentication;

/// Any verified caller.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

/// A verified caller whose admin flag is set.
#[derive(Debug, Clone)]
pub struct AdminOnly(pub Principal);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Authentication>() {
            Some(Authentication::Principal(principal)) => Ok(Self(principal.clone())),
            Some(Authentication::Invalid) => {
                tracing::warn!(uri = %parts.uri, "invalid session credential");
                Err(ApiError::Unauthorized("invalid or expired credential".into()))
            }
            _ => Err(ApiError::Unauthorized("authentication required".into())),
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminOnly
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authenticated(principal) = Authenticated::from_request_parts(parts, state).await?;
        if let Err(e) = require_admin(&principal) {
            tracing::warn!(uri = %parts.uri, principal = principal.raw_id(), "admin route refused");
            return Err(e.into());
        }
        Ok(Self(principal))
    }
}

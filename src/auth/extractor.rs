use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::{access, token};
use crate::error::AppError;
use crate::models::User;
use crate::state::SharedState;

/// The authenticated caller, resolved from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        access::require_admin(&self.0)
    }

    pub fn user(&self) -> &User {
        &self.0
    }
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(raw) = BearerToken::from_request_parts(parts, state)
            .await
            .unwrap_or(BearerToken(None));
        let raw = raw.ok_or_else(|| AppError::Unauthorized("Missing token".to_string()))?;

        let user = state.auth.validate_token(&raw).await?;
        Ok(AuthUser(user))
    }
}

/// The raw bearer token if one was sent. Never rejects.
#[derive(Debug, Clone)]
pub struct BearerToken(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(token::bearer_token)
            .map(str::to_string);
        Ok(BearerToken(raw))
    }
}

//! Login, token validation and logout.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{password, token};
use crate::error::{AppError, AppResult};
use crate::models::{AuthToken, User};
use crate::repository::{AuthTokenRepository, UserRepository};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// A freshly issued token. `token` is the only copy of the raw value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn AuthTokenRepository>,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn AuthTokenRepository>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            users,
            tokens,
            token_ttl,
        }
    }

    pub async fn login(&self, req: &LoginRequest) -> AppResult<LoginOutcome> {
        let (Some(username), Some(password)) = (
            req.username.as_deref().filter(|s| !s.trim().is_empty()),
            req.password.as_deref().filter(|s| !s.trim().is_empty()),
        ) else {
            return Err(AppError::Validation(
                "Username and password must be provided".to_string(),
            ));
        };

        let Some(user) = self.users.find_by_username(username).await? else {
            tracing::warn!(username, "Login rejected: unknown username");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };
        if !user.active {
            tracing::warn!(user_id = %user.id, "Login rejected: user inactive");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
        if !password::verify(password, &user.password_hash) {
            tracing::warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let raw = token::generate_token();
        let issued_at = Utc::now();
        let expires_at = issued_at.checked_add_signed(self.token_ttl).ok_or_else(|| {
            AppError::Internal(format!("token expiry out of range for ttl {}", self.token_ttl))
        })?;
        let stored = AuthToken {
            token_hash: token::hash_token(&raw),
            user_id: user.id,
            issued_at,
            expires_at,
            active: true,
        };
        self.tokens.insert(&stored).await?;

        tracing::info!(user_id = %user.id, expires_at = %stored.expires_at, "User logged in");
        Ok(LoginOutcome {
            token: raw,
            issued_at,
            expires_at: stored.expires_at,
            user,
        })
    }

    /// Resolve a bearer token to its active user.
    pub async fn validate_token(&self, raw: &str) -> AppResult<User> {
        if raw.trim().is_empty() {
            return Err(AppError::Unauthorized("Missing token".to_string()));
        }

        let stored = self
            .tokens
            .find_by_hash(&token::hash_token(raw))
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))?;

        if !stored.active {
            return Err(AppError::Unauthorized("Token inactive".to_string()));
        }
        if !stored.is_usable_at(Utc::now()) {
            return Err(AppError::Unauthorized("Token expired".to_string()));
        }

        match self.users.find_by_id(stored.user_id).await? {
            Some(user) if user.active => Ok(user),
            _ => Err(AppError::Unauthorized("User inactive".to_string())),
        }
    }

    /// Deactivate a token. Unknown or already inactive tokens are ignored and
    /// storage failures are logged, never returned.
    pub async fn logout(&self, raw: &str) {
        if raw.trim().is_empty() {
            return;
        }
        let token_hash = token::hash_token(raw);
        let stored = match self.tokens.find_by_hash(&token_hash).await {
            Ok(Some(stored)) if stored.active => stored,
            Ok(_) => return,
            Err(e) => {
                tracing::error!("Failed to look up token for logout: {e}");
                return;
            }
        };

        let revoked = AuthToken {
            active: false,
            ..stored
        };
        match self.tokens.update(&revoked).await {
            Ok(()) => tracing::info!(user_id = %revoked.user_id, "User logged out"),
            Err(e) => tracing::error!(user_id = %revoked.user_id, "Failed to deactivate token: {e}"),
        }
    }
}

use async_trait::async_trait;

use super::PgStore;
use crate::error::AppResult;
use crate::models::AuthToken;
use crate::repository::AuthTokenRepository;

#[async_trait]
impl AuthTokenRepository for PgStore {
    async fn insert(&self, token: &AuthToken) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO auth_tokens (token_hash, user_id, issued_at, expires_at, active)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&token.token_hash)
        .bind(token.user_id)
        .bind(token.issued_at)
        .bind(token.expires_at)
        .bind(token.active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<AuthToken>> {
        let token = sqlx::query_as::<_, AuthToken>("SELECT * FROM auth_tokens WHERE token_hash = $1")
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await?;
        Ok(token)
    }

    async fn update(&self, token: &AuthToken) -> AppResult<()> {
        sqlx::query("UPDATE auth_tokens SET expires_at = $2, active = $3 WHERE token_hash = $1")
            .bind(&token.token_hash)
            .bind(token.expires_at)
            .bind(token.active)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

use async_trait::async_trait;
use uuid::Uuid;

use super::{constraint_error, PgStore};
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::repository::UserRepository;

fn describe_violation(constraint: &str) -> Option<String> {
    match constraint {
        "users_username_key" => Some("Username already exists".into()),
        "users_employee_number_key" => Some("Employee number already exists".into()),
        "timesheets_user_id_fkey" => Some("Cannot delete a user who still owns timesheets".into()),
        _ => None,
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_employee_number(&self, employee_number: i32) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE employee_number = $1")
            .bind(employee_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_all(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn insert(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO users (id, username, password_hash, first_name, last_name,
                                employee_number, role, active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.employee_number)
        .bind(user.role)
        .bind(user.active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_error(e, describe_violation))?;
        Ok(())
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let updated = sqlx::query(
            "UPDATE users SET username = $2, password_hash = $3, first_name = $4, last_name = $5,
                              employee_number = $6, role = $7, active = $8, updated_at = $9
             WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.employee_number)
        .bind(user.role)
        .bind(user.active)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_error(e, describe_violation))?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User not found: id={}", user.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        // auth_tokens cascade; timesheets restrict.
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| constraint_error(e, describe_violation))?;
        Ok(result.rows_affected() > 0)
    }
}

mod auth_tokens;
mod memory;
mod timesheets;
mod users;

pub use memory::MemoryStore;

use sqlx::PgPool;

use crate::error::AppError;

/// Postgres-backed implementation of every repository trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Turn a unique or foreign-key violation into a validation error when
/// `describe` recognises the constraint; anything else stays a database error.
fn constraint_error(err: sqlx::Error, describe: impl FnOnce(&str) -> Option<String>) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
            if let Some(message) = describe(db_err.constraint().unwrap_or_default()) {
                return AppError::Validation(message);
            }
        }
    }
    AppError::Database(err)
}

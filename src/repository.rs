//! Persistence seams used by the services.
//!
//! Implementations must enforce uniqueness themselves (the services only do
//! an advisory existence check first) and report a violated rule as
//! [`AppError::Validation`](crate::error::AppError::Validation).

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{AuthToken, Timesheet, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn find_by_employee_number(&self, employee_number: i32) -> AppResult<Option<User>>;
    /// All users ordered by username.
    async fn list_all(&self) -> AppResult<Vec<User>>;
    async fn insert(&self, user: &User) -> AppResult<()>;
    async fn update(&self, user: &User) -> AppResult<()>;
    /// Removes the user and its auth tokens. Returns false if nothing matched.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait TimesheetRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Timesheet>>;
    async fn find_by_owner_and_week(
        &self,
        user_id: Uuid,
        week_start: NaiveDate,
    ) -> AppResult<Option<Timesheet>>;
    /// All timesheets of one user, most recent week first.
    async fn list_by_owner(&self, user_id: Uuid) -> AppResult<Vec<Timesheet>>;
    async fn insert(&self, timesheet: &Timesheet) -> AppResult<()>;
    /// Persists the row and replaces the stored entries atomically.
    async fn update(&self, timesheet: &Timesheet) -> AppResult<()>;
    /// Removes the timesheet with its entries. Returns false if nothing matched.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait AuthTokenRepository: Send + Sync {
    async fn insert(&self, token: &AuthToken) -> AppResult<()>;
    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<AuthToken>>;
    async fn update(&self, token: &AuthToken) -> AppResult<()>;
}

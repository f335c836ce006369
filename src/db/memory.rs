use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{AuthToken, Timesheet, User};
use crate::repository::{AuthTokenRepository, TimesheetRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    timesheets: HashMap<Uuid, Timesheet>,
    tokens: HashMap<String, AuthToken>,
}

impl Tables {
    fn check_user_unique(&self, user: &User) -> AppResult<()> {
        let others = self.users.values().filter(|u| u.id != user.id);
        for other in others {
            if other.username == user.username {
                return Err(AppError::Validation("Username already exists".into()));
            }
            if other.employee_number == user.employee_number {
                return Err(AppError::Validation("Employee number already exists".into()));
            }
        }
        Ok(())
    }

    fn week_taken(&self, timesheet: &Timesheet) -> bool {
        self.timesheets.values().any(|t| {
            t.id() != timesheet.id()
                && t.user_id() == timesheet.user_id()
                && t.week_start() == timesheet.week_start()
        })
    }
}

/// In-process store with the same uniqueness and referential rules as the
/// Postgres schema. Used when no database is configured and by the tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_employee_number(&self, employee_number: i32) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.employee_number == employee_number)
            .cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn insert(&self, user: &User) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.id) {
            return Err(AppError::Internal(format!("duplicate user id {}", user.id)));
        }
        tables.check_user_unique(user)?;
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user.id) {
            return Err(AppError::NotFound(format!("User not found: id={}", user.id)));
        }
        tables.check_user_unique(user)?;
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Ok(false);
        }
        if tables.timesheets.values().any(|t| t.user_id() == id) {
            return Err(AppError::Validation(
                "Cannot delete a user who still owns timesheets".into(),
            ));
        }
        tables.users.remove(&id);
        tables.tokens.retain(|_, token| token.user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl TimesheetRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Timesheet>> {
        Ok(self.tables.read().await.timesheets.get(&id).cloned())
    }

    async fn find_by_owner_and_week(
        &self,
        user_id: Uuid,
        week_start: NaiveDate,
    ) -> AppResult<Option<Timesheet>> {
        let tables = self.tables.read().await;
        Ok(tables
            .timesheets
            .values()
            .find(|t| t.user_id() == user_id && t.week_start() == week_start)
            .cloned())
    }

    async fn list_by_owner(&self, user_id: Uuid) -> AppResult<Vec<Timesheet>> {
        let tables = self.tables.read().await;
        let mut owned: Vec<Timesheet> = tables
            .timesheets
            .values()
            .filter(|t| t.user_id() == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.week_start().cmp(&a.week_start()));
        Ok(owned)
    }

    async fn insert(&self, timesheet: &Timesheet) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&timesheet.user_id()) {
            return Err(AppError::Internal(format!(
                "timesheet owner {} does not exist",
                timesheet.user_id()
            )));
        }
        if tables.week_taken(timesheet) {
            return Err(AppError::Validation(format!(
                "Timesheet already exists for week start {}",
                timesheet.week_start()
            )));
        }
        tables.timesheets.insert(timesheet.id(), timesheet.clone());
        Ok(())
    }

    async fn update(&self, timesheet: &Timesheet) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.timesheets.contains_key(&timesheet.id()) {
            return Err(AppError::NotFound(format!(
                "Timesheet not found: id={}",
                timesheet.id()
            )));
        }
        if tables.week_taken(timesheet) {
            return Err(AppError::Validation(format!(
                "Another timesheet already exists for week start {}",
                timesheet.week_start()
            )));
        }
        tables.timesheets.insert(timesheet.id(), timesheet.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.tables.write().await.timesheets.remove(&id).is_some())
    }
}

#[async_trait]
impl AuthTokenRepository for MemoryStore {
    async fn insert(&self, token: &AuthToken) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&token.user_id) {
            return Err(AppError::Internal(format!(
                "token owner {} does not exist",
                token.user_id
            )));
        }
        tables.tokens.insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<AuthToken>> {
        Ok(self.tables.read().await.tokens.get(token_hash).cloned())
    }

    async fn update(&self, token: &AuthToken) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(stored) = tables.tokens.get_mut(&token.token_hash) {
            stored.expires_at = token.expires_at;
            stored.active = token.active;
        }
        Ok(())
    }
}

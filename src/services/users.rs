//! Administrative user management.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::password;
use crate::error::{AppError, AppResult};
use crate::models::{CreateUserRequest, UpdateUserRequest, User, UserRole};
use crate::repository::{TimesheetRepository, UserRepository};

pub struct UserService {
    users: Arc<dyn UserRepository>,
    timesheets: Arc<dyn TimesheetRepository>,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("User not found: id={id}"))
}

fn non_blank_password(password: Option<&str>) -> AppResult<&str> {
    password
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Password must not be blank".to_string()))
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, timesheets: Arc<dyn TimesheetRepository>) -> Self {
        Self { users, timesheets }
    }

    pub async fn create(&self, req: &CreateUserRequest) -> AppResult<User> {
        let username = req
            .username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::Validation("Username must not be blank".to_string()))?;
        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::Validation("Username already exists".to_string()));
        }

        let employee_number = req
            .employee_number
            .ok_or_else(|| AppError::Validation("Employee number is required".to_string()))?;
        if self
            .users
            .find_by_employee_number(employee_number)
            .await?
            .is_some()
        {
            return Err(AppError::Validation(
                "Employee number already exists".to_string(),
            ));
        }

        let password = non_blank_password(req.password.as_deref())?;

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            username: username.to_string(),
            password_hash: password::hash(password)?,
            first_name: req.first_name.clone().unwrap_or_default(),
            last_name: req.last_name.clone().unwrap_or_default(),
            employee_number,
            role: req.role.unwrap_or_default(),
            active: req.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        self.users.insert(&user).await?;

        tracing::info!(user_id = %user.id, role = ?user.role, "User created");
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<User> {
        self.users.find_by_id(id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.users.list_all().await
    }

    /// Merge the supplied fields into the stored user.
    pub async fn update(&self, id: Uuid, req: &UpdateUserRequest) -> AppResult<User> {
        let mut user = self.get(id).await?;

        if let Some(username) = req.username.as_deref() {
            let username = username.trim();
            if username.is_empty() {
                return Err(AppError::Validation("Username must not be blank".to_string()));
            }
            if username != user.username {
                if let Some(other) = self.users.find_by_username(username).await? {
                    if other.id != id {
                        return Err(AppError::Validation("Username already exists".to_string()));
                    }
                }
                user.username = username.to_string();
            }
        }

        if let Some(employee_number) = req.employee_number {
            if employee_number != user.employee_number {
                if let Some(other) = self.users.find_by_employee_number(employee_number).await? {
                    if other.id != id {
                        return Err(AppError::Validation(
                            "Employee number already exists".to_string(),
                        ));
                    }
                }
                user.employee_number = employee_number;
            }
        }

        if req.password.is_some() {
            let password = non_blank_password(req.password.as_deref())?;
            user.password_hash = password::hash(password)?;
        }
        if let Some(first_name) = &req.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &req.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(role) = req.role {
            user.role = role;
        }
        if let Some(active) = req.active {
            user.active = active;
        }
        user.updated_at = Utc::now();

        self.users.update(&user).await?;
        tracing::info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    /// Remove a user and its tokens. Refused while the user owns timesheets.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.get(id).await?;
        if !self.timesheets.list_by_owner(id).await?.is_empty() {
            return Err(AppError::Validation(
                "Cannot delete a user who still owns timesheets".to_string(),
            ));
        }
        if !self.users.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Create an administrator at startup unless the username is taken.
    /// Returns the new user, or `None` if one already existed.
    pub async fn bootstrap_admin(
        &self,
        username: &str,
        password: &str,
        employee_number: i32,
    ) -> AppResult<Option<User>> {
        if self.users.find_by_username(username).await?.is_some() {
            return Ok(None);
        }
        let admin = self
            .create(&CreateUserRequest {
                username: Some(username.to_string()),
                password: Some(password.to_string()),
                employee_number: Some(employee_number),
                role: Some(UserRole::Admin),
                active: Some(true),
                ..Default::default()
            })
            .await?;
        Ok(Some(admin))
    }
}

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::User;

/// Admins may touch anything; everyone else only what they own.
pub fn authorize(current: &User, owner_id: Uuid) -> AppResult<()> {
    if current.is_admin() || current.id == owner_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Not allowed to access this timesheet".to_string(),
        ))
    }
}

pub fn require_admin(current: &User) -> AppResult<()> {
    if current.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin privileges required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::UserRole;

    fn user(role: UserRole) -> User {
        let now = Utc::now();
        User {
            id: Uuid::now_v7(),
            username: "u".into(),
            password_hash: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            employee_number: 1,
            role,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn owner_is_allowed() {
        let me = user(UserRole::User);
        assert!(authorize(&me, me.id).is_ok());
    }

    #[test]
    fn stranger_is_forbidden() {
        let me = user(UserRole::User);
        let err = authorize(&me, Uuid::now_v7()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn admin_is_allowed_everywhere() {
        let admin = user(UserRole::Admin);
        assert!(authorize(&admin, Uuid::now_v7()).is_ok());
        assert!(require_admin(&admin).is_ok());
    }

    #[test]
    fn require_admin_rejects_users() {
        let err = require_admin(&user(UserRole::User)).unwrap_err();
        assert_eq!(err.to_string(), "Forbidden: Admin privileges required");
    }
}

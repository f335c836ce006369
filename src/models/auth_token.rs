use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A bearer token as stored. Only the SHA-256 digest of the opaque token is
/// kept; the raw value is handed to the client once at login.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AuthToken {
    pub token_hash: String,
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub active: bool,
}

impl AuthToken {
    /// Usable at `now`: still active and `expires_at` strictly in the future.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(active: bool, expires_in: Duration) -> (AuthToken, DateTime<Utc>) {
        let now = Utc::now();
        let token = AuthToken {
            token_hash: "ab".repeat(32),
            user_id: Uuid::now_v7(),
            issued_at: now,
            expires_at: now + expires_in,
            active,
        };
        (token, now)
    }

    #[test]
    fn expiry_is_exclusive() {
        let (t, now) = token(true, Duration::zero());
        assert!(!t.is_usable_at(now));

        let (t, now) = token(true, Duration::seconds(1));
        assert!(t.is_usable_at(now));
    }

    #[test]
    fn inactive_token_is_unusable() {
        let (t, now) = token(false, Duration::hours(8));
        assert!(!t.is_usable_at(now));
    }
}

use std::net::IpAddr;

use chrono::{Duration, Utc};

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres URL. `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub host: IpAddr,
    pub port: u16,
    /// Lifetime of issued bearer tokens.
    pub token_ttl: Duration,
    pub max_body_size: usize,
    pub login_max_failures: u32,
    pub login_window_secs: u64,
    pub log_level: String,
    /// Allowed CORS origins; `*` allows any.
    pub cors_origins: Vec<String>,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Administrator created at startup when the username is still free.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
    pub employee_number: i32,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("employee_number", &self.employee_number)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let host: IpAddr = env_or("TIMESHEETS_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid TIMESHEETS_HOST: {e}"))?;

        let port: u16 = env_or("TIMESHEETS_PORT", "8080")
            .parse()
            .map_err(|e| format!("Invalid TIMESHEETS_PORT: {e}"))?;

        let token_ttl = parse_token_ttl(&env_or("TIMESHEETS_TOKEN_TTL_HOURS", "8"))?;

        let max_body_size: usize = env_or("TIMESHEETS_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid TIMESHEETS_MAX_BODY_SIZE: {e}"))?;

        let login_max_failures: u32 = env_or("TIMESHEETS_LOGIN_MAX_FAILURES", "5")
            .parse()
            .map_err(|e| format!("Invalid TIMESHEETS_LOGIN_MAX_FAILURES: {e}"))?;

        let login_window_secs: u64 = env_or("TIMESHEETS_LOGIN_WINDOW_SECS", "900")
            .parse()
            .map_err(|e| format!("Invalid TIMESHEETS_LOGIN_WINDOW_SECS: {e}"))?;

        let log_level = env_or("TIMESHEETS_LOG_LEVEL", "info");

        let cors_origins: Vec<String> = env_or("TIMESHEETS_CORS_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let bootstrap_admin = match (
            std::env::var("TIMESHEETS_ADMIN_USERNAME").ok(),
            std::env::var("TIMESHEETS_ADMIN_PASSWORD").ok(),
        ) {
            (Some(username), Some(password)) => Some(BootstrapAdmin {
                username,
                password,
                employee_number: env_or("TIMESHEETS_ADMIN_EMPLOYEE_NUMBER", "0")
                    .parse()
                    .map_err(|e| format!("Invalid TIMESHEETS_ADMIN_EMPLOYEE_NUMBER: {e}"))?,
            }),
            (None, None) => None,
            _ => {
                return Err(
                    "TIMESHEETS_ADMIN_USERNAME and TIMESHEETS_ADMIN_PASSWORD must be set together"
                        .to_string(),
                );
            }
        };

        Ok(Config {
            database_url,
            host,
            port,
            token_ttl,
            max_body_size,
            login_max_failures,
            login_window_secs,
            log_level,
            cors_origins,
            bootstrap_admin,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Token lifetime in whole hours. Must be positive and small enough that a
/// token issued now still has a representable expiry.
fn parse_token_ttl(raw: &str) -> Result<Duration, String> {
    let hours: i64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("Invalid TIMESHEETS_TOKEN_TTL_HOURS: {e}"))?;
    if hours <= 0 {
        return Err("TIMESHEETS_TOKEN_TTL_HOURS must be positive".to_string());
    }
    Duration::try_hours(hours)
        .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
        .ok_or_else(|| format!("TIMESHEETS_TOKEN_TTL_HOURS is out of range: {hours}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_ttl_accepts_whole_hours() {
        assert_eq!(parse_token_ttl("8").unwrap(), Duration::hours(8));
        assert_eq!(parse_token_ttl(" 24 ").unwrap(), Duration::hours(24));
    }

    #[test]
    fn token_ttl_rejects_non_positive() {
        assert_eq!(
            parse_token_ttl("0").unwrap_err(),
            "TIMESHEETS_TOKEN_TTL_HOURS must be positive"
        );
        assert!(parse_token_ttl("-3").is_err());
        assert!(parse_token_ttl("eight").unwrap_err().starts_with("Invalid"));
    }

    #[test]
    fn token_ttl_rejects_values_past_the_calendar() {
        let huge = i64::MAX.to_string();
        assert_eq!(
            parse_token_ttl(&huge).unwrap_err(),
            format!("TIMESHEETS_TOKEN_TTL_HOURS is out of range: {huge}")
        );
        // Fits in a Duration but not in a DateTime once added to now.
        assert!(parse_token_ttl("1000000000000").is_err());
    }
}

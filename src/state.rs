use std::sync::Arc;

use crate::config::Config;
use crate::rate_limit::LoginRateLimiter;
use crate::services::{AuthService, TimesheetService, UserService};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
    pub users: UserService,
    pub timesheets: TimesheetService,
    pub login_limiter: LoginRateLimiter,
}

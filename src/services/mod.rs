pub mod auth;
pub mod timesheets;
pub mod users;

pub use auth::{AuthService, LoginOutcome, LoginRequest};
pub use timesheets::TimesheetService;
pub use users::UserService;

pub mod auth_token;
pub mod timesheet;
pub mod user;

pub use auth_token::AuthToken;
pub use timesheet::{EntryInput, NewEntry, Timesheet, TimesheetEntry, TimesheetInput, TimesheetStatus};
pub use user::{CreateUserRequest, UpdateUserRequest, User, UserRole};

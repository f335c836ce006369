pub mod auth;
pub mod extract;
pub mod timesheets;
pub mod users;

use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        // Timesheets
        .route(
            "/api/v1/timesheets",
            get(timesheets::list).post(timesheets::create),
        )
        .route(
            "/api/v1/timesheets/{id}",
            get(timesheets::get)
                .put(timesheets::update)
                .delete(timesheets::delete),
        )
        // Users (admin only)
        .route("/api/v1/users", get(users::list).post(users::create))
        .route(
            "/api/v1/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
}

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::rate_limit::LoginRateLimiter;
use crate::repository::{AuthTokenRepository, TimesheetRepository, UserRepository};
use crate::services::{AuthService, TimesheetService, UserService};
use crate::state::{AppState, SharedState};

/// Wire the services over `store` and build the HTTP router.
pub fn build_app<S>(store: Arc<S>, config: Config) -> (Router, SharedState)
where
    S: UserRepository + TimesheetRepository + AuthTokenRepository + 'static,
{
    let users: Arc<dyn UserRepository> = store.clone();
    let timesheets: Arc<dyn TimesheetRepository> = store.clone();
    let tokens: Arc<dyn AuthTokenRepository> = store;

    let state: SharedState = Arc::new(AppState {
        auth: AuthService::new(
            users.clone(),
            tokens,
            config.token_ttl,
        ),
        users: UserService::new(users, timesheets.clone()),
        timesheets: TimesheetService::new(timesheets),
        login_limiter: LoginRateLimiter::new(
            config.login_max_failures,
            Duration::from_secs(config.login_window_secs),
        ),
        config,
    });

    let cors = cors_layer(&state.config.cors_origins);

    let app = Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (app, state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = if origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };
    layer
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::LOCATION])
}

async fn health() -> &'static str {
    "ok"
}

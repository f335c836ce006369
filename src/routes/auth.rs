use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::auth::BearerToken;
use crate::error::AppError;
use crate::routes::extract::JsonBody;
use crate::services::{LoginOutcome, LoginRequest};
use crate::state::SharedState;

pub async fn login(
    State(state): State<SharedState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<LoginOutcome>, AppError> {
    let username = req.username.clone().unwrap_or_default();
    let throttled = !username.is_empty();

    if throttled && state.login_limiter.check(&username).is_err() {
        tracing::warn!(username = %username, "Login throttled");
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    match state.auth.login(&req).await {
        Ok(outcome) => {
            state.login_limiter.reset(&username);
            Ok(Json(outcome))
        }
        Err(err @ AppError::Unauthorized(_)) => {
            if throttled {
                state.login_limiter.record_failure(&username);
            }
            Err(err)
        }
        Err(err) => Err(err),
    }
}

/// Always 204: a missing, unknown or already revoked token is not an error.
pub async fn logout(State(state): State<SharedState>, BearerToken(raw): BearerToken) -> StatusCode {
    if let Some(raw) = raw {
        state.auth.logout(&raw).await;
    }
    StatusCode::NO_CONTENT
}

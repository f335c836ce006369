//! User administration. Every handler requires an ADMIN caller.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::{CreateUserRequest, UpdateUserRequest, User};
use crate::routes::extract::{IdPath, JsonBody};
use crate::state::SharedState;

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<User>>, AppError> {
    auth.require_admin()?;
    Ok(Json(state.users.list().await?))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    IdPath(id): IdPath,
) -> Result<Json<User>, AppError> {
    auth.require_admin()?;
    Ok(Json(state.users.get(id).await?))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_admin()?;
    let user = state.users.create(&req).await?;
    let location = format!("/api/v1/users/{}", user.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(user)))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    IdPath(id): IdPath,
    JsonBody(req): JsonBody<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    auth.require_admin()?;
    Ok(Json(state.users.update(id, &req).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, AppError> {
    auth.require_admin()?;
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

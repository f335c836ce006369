use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::{Timesheet, TimesheetInput};
use crate::routes::extract::{IdPath, JsonBody};
use crate::state::SharedState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub week_start: Option<String>,
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Timesheet>>, AppError> {
    let timesheets = state
        .timesheets
        .list(auth.user(), query.week_start.as_deref())
        .await?;
    Ok(Json(timesheets))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    IdPath(id): IdPath,
) -> Result<Json<Timesheet>, AppError> {
    Ok(Json(state.timesheets.get(auth.user(), id).await?))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    JsonBody(input): JsonBody<TimesheetInput>,
) -> Result<impl IntoResponse, AppError> {
    let timesheet = state.timesheets.create(auth.user(), &input).await?;
    let location = format!("/api/v1/timesheets/{}", timesheet.id());
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(timesheet)))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    IdPath(id): IdPath,
    JsonBody(input): JsonBody<TimesheetInput>,
) -> Result<Json<Timesheet>, AppError> {
    Ok(Json(state.timesheets.update(auth.user(), id, &input).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, AppError> {
    state.timesheets.delete(auth.user(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

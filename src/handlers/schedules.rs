use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use tower_sessions::Session;

use crate::AppState;
use crate::data::models::{AppError, DeleteScheduleQuery, ScheduleRequest, ScheduleView};
use crate::features::schedules::ScheduleStore;
use crate::utils::require_user;

pub async fn create_schedule(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<ScheduleRequest>,
) -> Result<(StatusCode, Json<ScheduleView>), AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    let schedule = ScheduleStore::new(&mut conn).create(user_id, payload)?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

pub async fn list_schedules(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<ScheduleView>>, AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    Ok(Json(ScheduleStore::new(&mut conn).list(user_id)?))
}

pub async fn update_schedule(
    State(state): State<AppState>,
    session: Session,
    Path(schedule_id): Path<i32>,
    Json(payload): Json<ScheduleRequest>,
) -> Result<Json<ScheduleView>, AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    Ok(Json(ScheduleStore::new(&mut conn).update(user_id, schedule_id, payload)?))
}

pub async fn delete_schedule(
    State(state): State<AppState>,
    session: Session,
    Path(schedule_id): Path<i32>,
    Query(query): Query<DeleteScheduleQuery>,
) -> Result<StatusCode, AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    ScheduleStore::new(&mut conn).delete(user_id, schedule_id, query.replacement_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_schedules).post(create_schedule))
        .route("/{id}", put(update_schedule).delete(delete_schedule))
}

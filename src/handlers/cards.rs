use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_sessions::Session;

use crate::AppState;
use crate::data::models::{
    AppError, CardDraft, CardView, CreateCardRequest, HardCardsRequest, RemoveCardQuery,
};
use crate::features::cards::MembershipManager;
use crate::utils::require_user;

pub async fn create_card(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<CardView>), AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    let card = MembershipManager::new(&mut conn).create_card(user_id, payload)?;
    Ok((StatusCode::CREATED, Json(card)))
}

pub async fn update_card(
    State(state): State<AppState>,
    session: Session,
    Path(card_id): Path<i32>,
    Json(payload): Json<CardDraft>,
) -> Result<Json<CardView>, AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    let card = MembershipManager::new(&mut conn).update_card(user_id, card_id, payload)?;
    Ok(Json(card))
}

pub async fn remove_card(
    State(state): State<AppState>,
    session: Session,
    Path(card_id): Path<i32>,
    Query(query): Query<RemoveCardQuery>,
) -> Result<Json<Value>, AppError> {
    let user_id = require_user(&session).await?;
    let container = query.container()?;
    let mut conn = state.pool.get()?;

    let deleted = MembershipManager::new(&mut conn).remove_card(user_id, card_id, container)?;
    Ok(Json(json!({ "cardDeleted": deleted })))
}

pub async fn mark_hard(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<HardCardsRequest>,
) -> Result<Json<Value>, AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    let added = MembershipManager::new(&mut conn).mark_hard(user_id, &payload.card_ids)?;
    Ok(Json(json!({ "added": added })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_card))
        .route("/hard", post(mark_hard))
        .route("/{id}", put(update_card).delete(remove_card))
}

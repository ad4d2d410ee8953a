use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_sessions::Session;

use crate::AppState;
use crate::data::models::{
    AppError, BatchCardsRequest, CardView, ListWordSetsQuery, WordSetDetails, WordSetRequest,
    WordSetSummary, WordSetView,
};
use crate::features::cards::MembershipManager;
use crate::features::word_sets::WordSetService;
use crate::utils::require_user;

pub async fn create_word_set(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<WordSetRequest>,
) -> Result<(StatusCode, Json<WordSetView>), AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    let set = WordSetService::new(&mut conn).create(user_id, payload)?;
    Ok((StatusCode::CREATED, Json(set)))
}

pub async fn list_word_sets(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListWordSetsQuery>,
) -> Result<Json<Vec<WordSetSummary>>, AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    Ok(Json(WordSetService::new(&mut conn).list(user_id, query.scope)?))
}

pub async fn get_word_set(
    State(state): State<AppState>,
    session: Session,
    Path(word_set_id): Path<i32>,
) -> Result<Json<WordSetDetails>, AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    Ok(Json(WordSetService::new(&mut conn).get(user_id, word_set_id)?))
}

pub async fn update_word_set(
    State(state): State<AppState>,
    session: Session,
    Path(word_set_id): Path<i32>,
    Json(payload): Json<WordSetRequest>,
) -> Result<Json<WordSetView>, AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    Ok(Json(WordSetService::new(&mut conn).update(user_id, word_set_id, payload)?))
}

pub async fn delete_word_set(
    State(state): State<AppState>,
    session: Session,
    Path(word_set_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    WordSetService::new(&mut conn).delete(user_id, word_set_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn copy_word_set(
    State(state): State<AppState>,
    session: Session,
    Path(word_set_id): Path<i32>,
) -> Result<(StatusCode, Json<WordSetView>), AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    let copy = MembershipManager::new(&mut conn).copy_word_set(user_id, word_set_id)?;
    Ok((StatusCode::CREATED, Json(copy)))
}

pub async fn batch_create_cards(
    State(state): State<AppState>,
    session: Session,
    Path(word_set_id): Path<i32>,
    Json(payload): Json<BatchCardsRequest>,
) -> Result<(StatusCode, Json<Vec<CardView>>), AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    let cards = WordSetService::new(&mut conn).batch_create_cards(user_id, word_set_id, payload)?;
    Ok((StatusCode::CREATED, Json(cards)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_word_sets).post(create_word_set))
        .route(
            "/{id}",
            get(get_word_set).put(update_word_set).delete(delete_word_set),
        )
        .route("/{id}/copy", post(copy_word_set))
        .route("/{id}/cards/batch", post(batch_create_cards))
}

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tower_sessions::Session;

use crate::AppState;
use crate::data::models::{
    AppError, CreateDeckRequest, CreateDeckResponse, DeckDetails, DeckSummary, ListDecksQuery,
    ReviewRequest, ReviewResponse, UpdateDeckRequest, UpdateDeckResponse,
};
use crate::features::decks::DeckService;
use crate::utils::require_user;

pub async fn create_deck(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateDeckRequest>,
) -> Result<(StatusCode, Json<CreateDeckResponse>), AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    let deck = DeckService::new(&mut conn, state.clock.as_ref()).create(user_id, payload)?;
    Ok((StatusCode::CREATED, Json(deck)))
}

pub async fn list_decks(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListDecksQuery>,
) -> Result<Json<Vec<DeckSummary>>, AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    let decks = DeckService::new(&mut conn, state.clock.as_ref()).list(user_id, query.archived)?;
    Ok(Json(decks))
}

pub async fn get_deck(
    State(state): State<AppState>,
    session: Session,
    Path(deck_id): Path<i32>,
) -> Result<Json<DeckDetails>, AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    let deck = DeckService::new(&mut conn, state.clock.as_ref()).get(user_id, deck_id)?;
    Ok(Json(deck))
}

pub async fn update_deck(
    State(state): State<AppState>,
    session: Session,
    Path(deck_id): Path<i32>,
    Json(payload): Json<UpdateDeckRequest>,
) -> Result<Json<UpdateDeckResponse>, AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    let deck = DeckService::new(&mut conn, state.clock.as_ref()).update(user_id, deck_id, payload)?;
    Ok(Json(deck))
}

pub async fn delete_deck(
    State(state): State<AppState>,
    session: Session,
    Path(deck_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    DeckService::new(&mut conn, state.clock.as_ref()).delete(user_id, deck_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn review_deck(
    State(state): State<AppState>,
    session: Session,
    Path(deck_id): Path<i32>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<ReviewResponse>, AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    let outcome = DeckService::new(&mut conn, state.clock.as_ref())
        .review(user_id, deck_id, &payload.results)?;
    Ok(Json(outcome))
}

/// Restart: drops the deck's history and sends it back to level 0.
pub async fn restart_deck(
    State(state): State<AppState>,
    session: Session,
    Path(deck_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    DeckService::new(&mut conn, state.clock.as_ref()).restart(user_id, deck_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_decks).post(create_deck))
        .route("/{id}", get(get_deck).put(update_deck).delete(delete_deck))
        .route("/{id}/review", post(review_deck))
        .route("/{id}/histories", delete(restart_deck))
}

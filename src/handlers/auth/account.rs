use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_sessions::Session;

use crate::AppState;
use crate::data::models::{AppError, MockPaymentRequest, Profile, ProfileResponse};
use crate::features::auth::service::{mock_payment, profile};
use crate::utils::require_user;

pub async fn get_profile(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<ProfileResponse>, AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    Ok(Json(profile(&mut conn, user_id, state.clock.now())?))
}

pub async fn pay_mock(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<MockPaymentRequest>,
) -> Result<Json<Profile>, AppError> {
    let user_id = require_user(&session).await?;
    let mut conn = state.pool.get()?;

    let updated = mock_payment(&mut conn, user_id, &payload.plan_id, state.clock.now())?;
    Ok(Json(updated))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/payment/mock", post(pay_mock))
}

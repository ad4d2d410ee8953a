use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use tower_sessions::Session;

use crate::AppState;
use crate::data::models::{RegisterError, RegisterForm, UserView};
use crate::features::auth::service::register;
use crate::utils::set_user_session;

#[axum::debug_handler]
pub async fn handle_register(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<RegisterForm>,
) -> Result<(StatusCode, Json<UserView>), RegisterError> {
    let mut conn = state.pool.get().map_err(|e| {
        log::error!("Failed to get DB connection: {}", e);
        RegisterError::SessionError("Failed to get DB connection".into())
    })?;

    let user = register(&mut conn, form, state.clock.now())?;

    set_user_session(&session, user.id, &user.email)
        .await
        .map_err(|e| {
            log::error!("Failed to set session: {:?}", e);
            RegisterError::SessionError("Failed to set user session".into())
        })?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/register", post(handle_register))
}

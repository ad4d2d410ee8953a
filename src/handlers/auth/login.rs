use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use tower_sessions::Session;

use crate::AppState;
use crate::data::models::{LoginError, LoginForm, UserView};
use crate::features::auth::service::authenticate;
use crate::utils::set_user_session;

#[axum::debug_handler]
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Json<UserView>, LoginError> {
    let mut conn = state.pool.get().map_err(|e| {
        log::error!("Failed to get DB connection: {}", e);
        LoginError::SessionError("Failed to get DB connection".into())
    })?;

    let user = authenticate(&mut conn, &form)?;
    set_user_session(&session, user.id, &user.email).await?;

    log::info!("User {} logged in", user.id);
    Ok(Json(user.into()))
}

pub async fn handle_logout(session: Session) -> Result<StatusCode, LoginError> {
    session.delete().await.map_err(|e| {
        log::error!("Failed to delete session: {}", e);
        LoginError::SessionError("Failed to logout".into())
    })?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(handle_login))
        .route("/logout", post(handle_logout))
}

use tower_sessions::Session;

use crate::data::models::{AppError, LoginError};

const USER_ID_KEY: &str = "user_id";
const USER_EMAIL_KEY: &str = "user_email";

pub async fn set_user_session(
    session: &Session,
    user_id: i32,
    email: &str,
) -> Result<(), LoginError> {
    // New id on login so a pre-login session cannot be reused.
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user_id).await?;
    session.insert(USER_EMAIL_KEY, email).await?;
    Ok(())
}

pub async fn get_current_user_id(session: &Session) -> Option<i32> {
    match session.get::<i32>(USER_ID_KEY).await {
        Ok(user_id) => user_id,
        Err(e) => {
            log::error!("Failed to get user_id from session: {}", e);
            None
        }
    }
}

/// The logged-in user's id, or `Unauthenticated`.
pub async fn require_user(session: &Session) -> Result<i32, AppError> {
    get_current_user_id(session)
        .await
        .ok_or(AppError::Unauthenticated)
}

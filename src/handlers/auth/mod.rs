pub mod account;
pub mod login;
pub mod register;

use axum::Router;

use crate::AppState;

pub fn auth_router() -> Router<AppState> {
    Router::new()
        .merge(login::router())
        .merge(register::router())
        .merge(account::router())
}

pub mod auth;
pub mod cards;
pub mod decks;
pub mod schedules;
pub mod word_sets;

use axum::Router;

use crate::AppState;

/// Every JSON route, to be nested under `/api`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(auth::auth_router())
        .nest("/decks", decks::router())
        .nest("/cards", cards::router())
        .nest("/word-sets", word_sets::router())
        .nest("/schedules", schedules::router())
}

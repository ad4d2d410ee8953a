use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

use crate::schema::users;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub email: String,
    pub login: String,
    pub password_hash: String,
    pub premium_expires_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl User {
    pub fn is_premium(&self, now: NaiveDateTime) -> bool {
        self.premium_expires_at.is_some_and(|expires| expires > now)
    }
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub login: &'a str,
    pub password_hash: &'a str,
    pub created_at: NaiveDateTime,
}

/// Public view of an account, never carries the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i32,
    pub email: String,
    pub login: String,
    pub premium_expires_at: Option<NaiveDateTime>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            login: user.login,
            premium_expires_at: user.premium_expires_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Free,
    Premium,
    Lifetime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i32,
    pub email: String,
    pub login: String,
    pub premium_expires_at: Option<NaiveDateTime>,
    pub status: PlanStatus,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub active_decks_count: i64,
    pub archived_decks_count: i64,
    pub total_reviews: i64,
    pub total_words_learning: i64,
    pub total_words_mastered: i64,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: Profile,
    pub stats: Stats,
}

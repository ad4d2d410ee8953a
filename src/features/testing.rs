use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::data::models::{NewUser, Schedule, User, WordSet};
use crate::data::repositories::{ScheduleRepository, UserRepository, WordSetRepository};
use crate::features::auth::service::provision_account;

pub fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

/// Account with its defaults; the hash is a placeholder, bcrypt is slow.
pub fn seed_user(conn: &mut SqliteConnection, login: &str) -> User {
    let email = format!("{login}@example.com");
    provision_account(
        conn,
        &NewUser {
            email: &email,
            login,
            password_hash: "not-a-real-hash",
            created_at: at("2024-01-01 00:00:00"),
        },
    )
    .unwrap()
}

pub fn make_premium(conn: &mut SqliteConnection, user_id: i32) {
    UserRepository::set_premium_expiry(conn, user_id, at("2999-01-01 00:00:00")).unwrap();
}

pub fn default_schedule(conn: &mut SqliteConnection, user_id: i32) -> Schedule {
    ScheduleRepository::list_for_user(conn, user_id)
        .unwrap()
        .into_iter()
        .find(|s| s.is_default)
        .unwrap()
}

pub fn default_word_set(conn: &mut SqliteConnection, user_id: i32) -> WordSet {
    WordSetRepository::get_default(conn, user_id).unwrap()
}

use bcrypt::verify;
use bcrypt::{DEFAULT_COST, hash};
use chrono::NaiveDateTime;
use diesel::dsl::{count_star, exists};
use diesel::prelude::*;
use diesel::select;

use crate::data::models::{NewUser, Stats, User};
use crate::db::last_insert_id;
use crate::schema::{deck_cards, deck_histories, decks, users};

pub struct UserRepository;

impl UserRepository {
    pub fn find_by_email(
        conn: &mut SqliteConnection,
        email: &str,
    ) -> Result<Option<User>, diesel::result::Error> {
        users::table
            .filter(users::email.eq(email))
            .select(User::as_select())
            .first(conn)
            .optional()
    }

    pub fn get_by_id(
        conn: &mut SqliteConnection,
        user_id: i32,
    ) -> Result<User, diesel::result::Error> {
        users::table
            .find(user_id)
            .select(User::as_select())
            .first(conn)
    }

    pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
        hash(password, DEFAULT_COST)
    }

    pub fn verify_password(
        stored_hash: &str,
        input_password: &str,
    ) -> Result<bool, bcrypt::BcryptError> {
        verify(input_password, stored_hash)
    }

    pub fn create_user(
        conn: &mut SqliteConnection,
        new_user: &NewUser<'_>,
    ) -> Result<User, diesel::result::Error> {
        diesel::insert_into(users::table)
            .values(new_user)
            .execute(conn)?;

        let user_id = last_insert_id(conn)?;
        Self::get_by_id(conn, user_id)
    }

    pub fn email_exists(
        conn: &mut SqliteConnection,
        email: &str,
    ) -> Result<bool, diesel::result::Error> {
        select(exists(users::table.filter(users::email.eq(email)))).get_result(conn)
    }

    pub fn login_exists(
        conn: &mut SqliteConnection,
        login: &str,
    ) -> Result<bool, diesel::result::Error> {
        select(exists(users::table.filter(users::login.eq(login)))).get_result(conn)
    }

    pub fn set_premium_expiry(
        conn: &mut SqliteConnection,
        user_id: i32,
        expires_at: NaiveDateTime,
    ) -> Result<(), diesel::result::Error> {
        diesel::update(users::table.find(user_id))
            .set(users::premium_expires_at.eq(Some(expires_at)))
            .execute(conn)?;
        Ok(())
    }

    pub fn stats(
        conn: &mut SqliteConnection,
        user_id: i32,
    ) -> Result<Stats, diesel::result::Error> {
        let deck_counts: Vec<(bool, i64)> = decks::table
            .filter(decks::user_id.eq(user_id))
            .group_by(decks::is_archived)
            .select((decks::is_archived, count_star()))
            .load(conn)?;

        let word_counts: Vec<(bool, i64)> = deck_cards::table
            .inner_join(decks::table)
            .filter(decks::user_id.eq(user_id))
            .group_by(decks::is_archived)
            .select((decks::is_archived, count_star()))
            .load(conn)?;

        let total_reviews: i64 = deck_histories::table
            .inner_join(decks::table)
            .filter(decks::user_id.eq(user_id))
            .count()
            .get_result(conn)?;

        let split = |rows: &[(bool, i64)]| {
            rows.iter().fold((0, 0), |(active, archived), &(is_archived, n)| {
                if is_archived {
                    (active, archived + n)
                } else {
                    (active + n, archived)
                }
            })
        };
        let (active_decks_count, archived_decks_count) = split(&deck_counts);
        let (total_words_learning, total_words_mastered) = split(&word_counts);

        Ok(Stats {
            active_decks_count,
            archived_decks_count,
            total_reviews,
            total_words_learning,
            total_words_mastered,
        })
    }
}

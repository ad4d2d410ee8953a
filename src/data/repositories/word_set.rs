use diesel::dsl::count;
use diesel::prelude::*;

use crate::data::models::{NewWordSet, WordSet, WordSetScope, WordSetSummary};
use crate::db::last_insert_id;
use crate::schema::{set_to_card_link, word_sets};

pub struct WordSetRepository;

impl WordSetRepository {
    pub fn create(conn: &mut SqliteConnection, new_set: &NewWordSet<'_>) -> QueryResult<WordSet> {
        diesel::insert_into(word_sets::table)
            .values(new_set)
            .execute(conn)?;

        let word_set_id = last_insert_id(conn)?;
        Self::get(conn, word_set_id)
    }

    pub fn get(conn: &mut SqliteConnection, word_set_id: i32) -> QueryResult<WordSet> {
        word_sets::table
            .find(word_set_id)
            .select(WordSet::as_select())
            .first(conn)
    }

    pub fn find(conn: &mut SqliteConnection, word_set_id: i32) -> QueryResult<Option<WordSet>> {
        word_sets::table
            .find(word_set_id)
            .select(WordSet::as_select())
            .first(conn)
            .optional()
    }

    pub fn find_owned(
        conn: &mut SqliteConnection,
        user_id: i32,
        word_set_id: i32,
    ) -> QueryResult<Option<WordSet>> {
        word_sets::table
            .filter(word_sets::id.eq(word_set_id))
            .filter(word_sets::user_id.eq(user_id))
            .select(WordSet::as_select())
            .first(conn)
            .optional()
    }

    /// The user's default "hard words" set.
    pub fn get_default(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<WordSet> {
        word_sets::table
            .filter(word_sets::user_id.eq(user_id))
            .filter(word_sets::is_default.eq(true))
            .select(WordSet::as_select())
            .first(conn)
    }

    pub fn list(
        conn: &mut SqliteConnection,
        user_id: i32,
        scope: WordSetScope,
    ) -> QueryResult<Vec<WordSetSummary>> {
        let rows: Vec<(WordSet, i64)> = match scope {
            WordSetScope::Mine => word_sets::table
                .left_join(set_to_card_link::table)
                .filter(word_sets::user_id.eq(user_id))
                .group_by(word_sets::id)
                .order(word_sets::id.asc())
                .select((WordSet::as_select(), count(set_to_card_link::card_id.nullable())))
                .load(conn)?,
            WordSetScope::Public => word_sets::table
                .left_join(set_to_card_link::table)
                .filter(word_sets::is_public.eq(true))
                .filter(word_sets::user_id.ne(user_id))
                .group_by(word_sets::id)
                .order(word_sets::id.asc())
                .select((WordSet::as_select(), count(set_to_card_link::card_id.nullable())))
                .load(conn)?,
        };

        Ok(rows
            .into_iter()
            .map(|(set, cards_count)| WordSetSummary {
                id: set.id,
                user_id: set.user_id,
                name: set.name,
                is_public: set.is_public,
                is_default: set.is_default,
                cards_count,
            })
            .collect())
    }

    pub fn update(
        conn: &mut SqliteConnection,
        word_set_id: i32,
        name: &str,
        is_public: bool,
    ) -> QueryResult<usize> {
        diesel::update(word_sets::table.find(word_set_id))
            .set((word_sets::name.eq(name), word_sets::is_public.eq(is_public)))
            .execute(conn)
    }

    /// Links cards to the set; already linked cards are skipped.
    pub fn link_cards(
        conn: &mut SqliteConnection,
        word_set_id: i32,
        card_ids: &[i32],
    ) -> QueryResult<usize> {
        let mut linked = 0;
        for &card_id in card_ids {
            linked += diesel::insert_into(set_to_card_link::table)
                .values((
                    set_to_card_link::word_set_id.eq(word_set_id),
                    set_to_card_link::card_id.eq(card_id),
                ))
                .on_conflict((set_to_card_link::word_set_id, set_to_card_link::card_id))
                .do_nothing()
                .execute(conn)?;
        }
        Ok(linked)
    }

    pub fn card_ids(conn: &mut SqliteConnection, word_set_id: i32) -> QueryResult<Vec<i32>> {
        set_to_card_link::table
            .filter(set_to_card_link::word_set_id.eq(word_set_id))
            .select(set_to_card_link::card_id)
            .load(conn)
    }

    pub fn unlink_all_cards(conn: &mut SqliteConnection, word_set_id: i32) -> QueryResult<usize> {
        diesel::delete(
            set_to_card_link::table.filter(set_to_card_link::word_set_id.eq(word_set_id)),
        )
        .execute(conn)
    }

    pub fn delete(conn: &mut SqliteConnection, word_set_id: i32) -> QueryResult<usize> {
        diesel::delete(word_sets::table.find(word_set_id)).execute(conn)
    }
}

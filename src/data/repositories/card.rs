use std::collections::HashSet;

use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::data::models::{Card, NewCard};
use crate::db::last_insert_id;
use crate::schema::{cards, deck_cards, decks, set_to_card_link, word_sets};

const DELETE_ORPHANS_SQL: &str = r#"
DELETE FROM cards
WHERE id IN (
    SELECT c.id FROM cards c
    WHERE c.id NOT IN (SELECT card_id FROM deck_cards)
      AND c.id NOT IN (SELECT card_id FROM set_to_card_link)
    LIMIT ?
)
"#;

pub struct CardRepository;

impl CardRepository {
    pub fn create(conn: &mut SqliteConnection, new_card: &NewCard<'_>) -> QueryResult<i32> {
        diesel::insert_into(cards::table)
            .values(new_card)
            .execute(conn)?;
        last_insert_id(conn)
    }

    pub fn get(conn: &mut SqliteConnection, card_id: i32) -> QueryResult<Card> {
        cards::table
            .find(card_id)
            .select(Card::as_select())
            .first(conn)
    }

    pub fn update(
        conn: &mut SqliteConnection,
        card_id: i32,
        changes: &NewCard<'_>,
    ) -> QueryResult<usize> {
        diesel::update(cards::table.find(card_id))
            .set(changes)
            .execute(conn)
    }

    /// Ids from `card_ids` that sit in none of the user's decks or word sets.
    ///
    /// Unknown ids and other users' cards are reported alike.
    pub fn unreachable_ids(
        conn: &mut SqliteConnection,
        user_id: i32,
        card_ids: &[i32],
    ) -> QueryResult<Vec<i32>> {
        let mut reachable: HashSet<i32> = deck_cards::table
            .inner_join(decks::table)
            .filter(decks::user_id.eq(user_id))
            .filter(deck_cards::card_id.eq_any(card_ids))
            .select(deck_cards::card_id)
            .load::<i32>(conn)?
            .into_iter()
            .collect();
        reachable.extend(
            set_to_card_link::table
                .inner_join(word_sets::table)
                .filter(word_sets::user_id.eq(user_id))
                .filter(set_to_card_link::card_id.eq_any(card_ids))
                .select(set_to_card_link::card_id)
                .load::<i32>(conn)?,
        );

        Ok(card_ids
            .iter()
            .copied()
            .filter(|id| !reachable.contains(id))
            .collect())
    }

    pub fn in_deck(conn: &mut SqliteConnection, deck_id: i32) -> QueryResult<Vec<Card>> {
        deck_cards::table
            .inner_join(cards::table)
            .filter(deck_cards::deck_id.eq(deck_id))
            .order(cards::id.asc())
            .select(Card::as_select())
            .load(conn)
    }

    pub fn in_word_set(conn: &mut SqliteConnection, word_set_id: i32) -> QueryResult<Vec<Card>> {
        set_to_card_link::table
            .inner_join(cards::table)
            .filter(set_to_card_link::word_set_id.eq(word_set_id))
            .order(cards::id.asc())
            .select(Card::as_select())
            .load(conn)
    }

    /// Ids of cards that sit in at least one of the user's decks.
    pub fn learning_ids(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<HashSet<i32>> {
        let ids = deck_cards::table
            .inner_join(decks::table)
            .filter(decks::user_id.eq(user_id))
            .select(deck_cards::card_id)
            .distinct()
            .load::<i32>(conn)?;
        Ok(ids.into_iter().collect())
    }

    /// Whether the card is in a deck or word set owned by the user.
    pub fn reachable_by(
        conn: &mut SqliteConnection,
        user_id: i32,
        card_id: i32,
    ) -> QueryResult<bool> {
        let via_decks: i64 = deck_cards::table
            .inner_join(decks::table)
            .filter(deck_cards::card_id.eq(card_id))
            .filter(decks::user_id.eq(user_id))
            .count()
            .get_result(conn)?;
        if via_decks > 0 {
            return Ok(true);
        }

        let via_sets: i64 = set_to_card_link::table
            .inner_join(word_sets::table)
            .filter(set_to_card_link::card_id.eq(card_id))
            .filter(word_sets::user_id.eq(user_id))
            .count()
            .get_result(conn)?;
        Ok(via_sets > 0)
    }

    pub fn unlink_from_deck(
        conn: &mut SqliteConnection,
        deck_id: i32,
        card_id: i32,
    ) -> QueryResult<usize> {
        diesel::delete(
            deck_cards::table
                .filter(deck_cards::deck_id.eq(deck_id))
                .filter(deck_cards::card_id.eq(card_id)),
        )
        .execute(conn)
    }

    pub fn unlink_from_word_set(
        conn: &mut SqliteConnection,
        word_set_id: i32,
        card_ids: &[i32],
    ) -> QueryResult<usize> {
        diesel::delete(
            set_to_card_link::table
                .filter(set_to_card_link::word_set_id.eq(word_set_id))
                .filter(set_to_card_link::card_id.eq_any(card_ids)),
        )
        .execute(conn)
    }

    /// Number of decks plus word sets the card belongs to.
    pub fn membership_count(conn: &mut SqliteConnection, card_id: i32) -> QueryResult<i64> {
        let in_decks: i64 = deck_cards::table
            .filter(deck_cards::card_id.eq(card_id))
            .count()
            .get_result(conn)?;
        let in_sets: i64 = set_to_card_link::table
            .filter(set_to_card_link::card_id.eq(card_id))
            .count()
            .get_result(conn)?;
        Ok(in_decks + in_sets)
    }

    pub fn delete(conn: &mut SqliteConnection, card_id: i32) -> QueryResult<usize> {
        diesel::delete(cards::table.find(card_id)).execute(conn)
    }

    /// Deletes up to `limit` cards that belong to no deck and no word set.
    pub fn delete_orphans(conn: &mut SqliteConnection, limit: i64) -> QueryResult<usize> {
        diesel::sql_query(DELETE_ORPHANS_SQL)
            .bind::<BigInt, _>(limit)
            .execute(conn)
    }
}

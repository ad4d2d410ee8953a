use chrono::NaiveDateTime;
use diesel::dsl::count;
use diesel::prelude::*;

use crate::data::models::{
    Deck, DeckEdit, DeckHistory, DeckPatch, DeckSummary, NewCardHistory, NewDeck, NewDeckHistory,
};
use crate::db::last_insert_id;
use crate::schema::{card_histories, deck_cards, deck_histories, decks};

pub struct DeckRepository;

impl DeckRepository {
    pub fn create(conn: &mut SqliteConnection, new_deck: &NewDeck<'_>) -> QueryResult<Deck> {
        diesel::insert_into(decks::table)
            .values(new_deck)
            .execute(conn)?;

        let deck_id = last_insert_id(conn)?;
        decks::table
            .find(deck_id)
            .select(Deck::as_select())
            .first(conn)
    }

    /// Deck owned by `user_id`, `None` when missing or owned by someone else.
    pub fn find_owned(
        conn: &mut SqliteConnection,
        user_id: i32,
        deck_id: i32,
    ) -> QueryResult<Option<Deck>> {
        decks::table
            .filter(decks::id.eq(deck_id))
            .filter(decks::user_id.eq(user_id))
            .select(Deck::as_select())
            .first(conn)
            .optional()
    }

    pub fn list(
        conn: &mut SqliteConnection,
        user_id: i32,
        archived: bool,
    ) -> QueryResult<Vec<DeckSummary>> {
        let rows: Vec<(Deck, i64)> = decks::table
            .left_join(deck_cards::table)
            .filter(decks::user_id.eq(user_id))
            .filter(decks::is_archived.eq(archived))
            .group_by(decks::id)
            .order(decks::next_review_date.asc())
            .select((Deck::as_select(), count(deck_cards::card_id.nullable())))
            .load(conn)?;

        Ok(rows
            .into_iter()
            .map(|(deck, cards_count)| DeckSummary {
                id: deck.id,
                name: deck.name,
                current_level: deck.current_level,
                next_review_date: deck.next_review_date,
                cards_count,
                is_archived: deck.is_archived,
            })
            .collect())
    }

    /// Decks created by the user at or after `since`.
    pub fn count_created_since(
        conn: &mut SqliteConnection,
        user_id: i32,
        since: NaiveDateTime,
    ) -> QueryResult<i64> {
        decks::table
            .filter(decks::user_id.eq(user_id))
            .filter(decks::created_at.ge(since))
            .count()
            .get_result(conn)
    }

    pub fn link_cards(
        conn: &mut SqliteConnection,
        deck_id: i32,
        card_ids: &[i32],
    ) -> QueryResult<usize> {
        let mut linked = 0;
        for &card_id in card_ids {
            linked += diesel::insert_into(deck_cards::table)
                .values((deck_cards::deck_id.eq(deck_id), deck_cards::card_id.eq(card_id)))
                .on_conflict((deck_cards::deck_id, deck_cards::card_id))
                .do_nothing()
                .execute(conn)?;
        }
        Ok(linked)
    }

    pub fn card_ids(conn: &mut SqliteConnection, deck_id: i32) -> QueryResult<Vec<i32>> {
        deck_cards::table
            .filter(deck_cards::deck_id.eq(deck_id))
            .select(deck_cards::card_id)
            .load(conn)
    }

    pub fn histories(conn: &mut SqliteConnection, deck_id: i32) -> QueryResult<Vec<DeckHistory>> {
        deck_histories::table
            .filter(deck_histories::deck_id.eq(deck_id))
            .order(deck_histories::review_date.asc())
            .select(DeckHistory::as_select())
            .load(conn)
    }

    pub fn has_history(conn: &mut SqliteConnection, deck_id: i32) -> QueryResult<bool> {
        let deck_rows: i64 = deck_histories::table
            .filter(deck_histories::deck_id.eq(deck_id))
            .count()
            .get_result(conn)?;
        let card_rows: i64 = card_histories::table
            .filter(card_histories::deck_id.eq(deck_id))
            .count()
            .get_result(conn)?;
        Ok(deck_rows + card_rows > 0)
    }

    pub fn insert_deck_history(
        conn: &mut SqliteConnection,
        history: &NewDeckHistory,
    ) -> QueryResult<usize> {
        diesel::insert_into(deck_histories::table)
            .values(history)
            .execute(conn)
    }

    pub fn insert_card_histories(
        conn: &mut SqliteConnection,
        histories: &[NewCardHistory],
    ) -> QueryResult<usize> {
        if histories.is_empty() {
            return Ok(0);
        }
        diesel::insert_into(card_histories::table)
            .values(histories)
            .execute(conn)
    }

    pub fn apply_patch(
        conn: &mut SqliteConnection,
        deck_id: i32,
        patch: &DeckPatch,
    ) -> QueryResult<usize> {
        diesel::update(decks::table.find(deck_id))
            .set(patch)
            .execute(conn)
    }

    pub fn apply_edit(
        conn: &mut SqliteConnection,
        deck_id: i32,
        edit: &DeckEdit<'_>,
    ) -> QueryResult<usize> {
        diesel::update(decks::table.find(deck_id))
            .set(edit)
            .execute(conn)
    }

    /// Removes deck and card history rows of the deck.
    pub fn delete_histories(conn: &mut SqliteConnection, deck_id: i32) -> QueryResult<usize> {
        let cards = diesel::delete(card_histories::table.filter(card_histories::deck_id.eq(deck_id)))
            .execute(conn)?;
        let sessions =
            diesel::delete(deck_histories::table.filter(deck_histories::deck_id.eq(deck_id)))
                .execute(conn)?;
        Ok(cards + sessions)
    }

    pub fn unlink_all_cards(conn: &mut SqliteConnection, deck_id: i32) -> QueryResult<usize> {
        diesel::delete(deck_cards::table.filter(deck_cards::deck_id.eq(deck_id))).execute(conn)
    }

    pub fn delete(conn: &mut SqliteConnection, deck_id: i32) -> QueryResult<usize> {
        diesel::delete(decks::table.find(deck_id)).execute(conn)
    }
}

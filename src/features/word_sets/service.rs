use diesel::prelude::*;
use validator::Validate;

use crate::data::models::{
    AppError, BatchCardsRequest, CardView, NewWordSet, WordSet, WordSetDetails, WordSetRequest,
    WordSetScope, WordSetSummary, WordSetView,
};
use crate::data::repositories::{CardRepository, WordSetRepository};
use crate::features::cards::purge_if_orphaned;

/// Word set the user may read: their own, or anyone's public one.
pub fn visible_word_set(
    conn: &mut SqliteConnection,
    user_id: i32,
    word_set_id: i32,
) -> Result<WordSet, AppError> {
    let set = WordSetRepository::find(conn, word_set_id)?.ok_or(AppError::NotFound("word set"))?;
    if set.user_id != user_id && !set.is_public {
        return Err(AppError::Unauthorized);
    }
    Ok(set)
}

fn editable_word_set(
    conn: &mut SqliteConnection,
    user_id: i32,
    word_set_id: i32,
) -> Result<WordSet, AppError> {
    let set = WordSetRepository::find_owned(conn, user_id, word_set_id)?
        .ok_or(AppError::NotFound("word set"))?;
    if set.is_default {
        return Err(AppError::ProtectedResource("default word set"));
    }
    Ok(set)
}

pub struct WordSetService<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> WordSetService<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub fn create(&mut self, user_id: i32, request: WordSetRequest) -> Result<WordSetView, AppError> {
        request.validate()?;

        let set = WordSetRepository::create(
            self.conn,
            &NewWordSet {
                user_id,
                name: request.name.trim(),
                is_public: request.is_public,
                is_default: false,
            },
        )?;
        Ok(set.into())
    }

    pub fn list(
        &mut self,
        user_id: i32,
        scope: WordSetScope,
    ) -> Result<Vec<WordSetSummary>, AppError> {
        Ok(WordSetRepository::list(self.conn, user_id, scope)?)
    }

    /// Set with its cards; `isLearning` is relative to the caller's decks.
    pub fn get(&mut self, user_id: i32, word_set_id: i32) -> Result<WordSetDetails, AppError> {
        let set = visible_word_set(self.conn, user_id, word_set_id)?;
        let learning = CardRepository::learning_ids(self.conn, user_id)?;
        let cards = CardRepository::in_word_set(self.conn, set.id)?
            .into_iter()
            .map(|card| {
                let is_learning = learning.contains(&card.id);
                CardView::new(card, is_learning)
            })
            .collect();

        Ok(WordSetDetails {
            id: set.id,
            user_id: set.user_id,
            name: set.name,
            is_public: set.is_public,
            is_default: set.is_default,
            cards,
        })
    }

    pub fn update(
        &mut self,
        user_id: i32,
        word_set_id: i32,
        request: WordSetRequest,
    ) -> Result<WordSetView, AppError> {
        request.validate()?;

        self.conn.transaction::<_, AppError, _>(|conn| {
            editable_word_set(conn, user_id, word_set_id)?;
            WordSetRepository::update(conn, word_set_id, request.name.trim(), request.is_public)?;
            Ok(WordSetRepository::get(conn, word_set_id)?.into())
        })
    }

    /// Deletes the set and the cards nothing else holds.
    pub fn delete(&mut self, user_id: i32, word_set_id: i32) -> Result<(), AppError> {
        self.conn.immediate_transaction::<_, AppError, _>(|conn| {
            let set = editable_word_set(conn, user_id, word_set_id)?;
            let card_ids = WordSetRepository::card_ids(conn, set.id)?;

            WordSetRepository::unlink_all_cards(conn, set.id)?;
            WordSetRepository::delete(conn, set.id)?;
            for card_id in card_ids {
                purge_if_orphaned(conn, card_id)?;
            }

            log::info!("User {} deleted word set {}", user_id, set.id);
            Ok(())
        })
    }

    /// Creates the cards and links them to an owned set, all or nothing.
    pub fn batch_create_cards(
        &mut self,
        user_id: i32,
        word_set_id: i32,
        request: BatchCardsRequest,
    ) -> Result<Vec<CardView>, AppError> {
        request.validate()?;
        if request.cards.is_empty() {
            return Err(AppError::invalid("no cards to add"));
        }

        self.conn.transaction::<_, AppError, _>(|conn| {
            let set = WordSetRepository::find_owned(conn, user_id, word_set_id)?
                .ok_or(AppError::NotFound("word set"))?;

            let mut card_ids = Vec::with_capacity(request.cards.len());
            for draft in &request.cards {
                card_ids.push(CardRepository::create(conn, &draft.as_new_card())?);
            }
            WordSetRepository::link_cards(conn, set.id, &card_ids)?;

            let mut views = Vec::with_capacity(card_ids.len());
            for card_id in card_ids {
                views.push(CardView::new(CardRepository::get(conn, card_id)?, false));
            }
            Ok(views)
        })
    }
}

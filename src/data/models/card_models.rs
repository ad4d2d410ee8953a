use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::data::models::AppError;
use crate::schema::cards;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = cards)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Card {
    pub id: i32,
    pub original_word: String,
    pub translation: String,
    pub original_context: Option<String>,
    pub translation_context: Option<String>,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = cards)]
#[diesel(treat_none_as_null = true)]
pub struct NewCard<'a> {
    pub original_word: &'a str,
    pub translation: &'a str,
    pub original_context: Option<&'a str>,
    pub translation_context: Option<&'a str>,
}

/// Word/translation pair as sent by clients.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CardDraft {
    #[validate(length(min = 1, message = "Original word must not be empty"))]
    pub original_word: String,
    #[serde(default)]
    pub translation: String,
    pub original_context: Option<String>,
    pub translation_context: Option<String>,
}

impl CardDraft {
    pub fn as_new_card(&self) -> NewCard<'_> {
        NewCard {
            original_word: &self.original_word,
            translation: &self.translation,
            original_context: self.original_context.as_deref(),
            translation_context: self.translation_context.as_deref(),
        }
    }
}

impl From<&Card> for CardDraft {
    fn from(card: &Card) -> Self {
        Self {
            original_word: card.original_word.clone(),
            translation: card.translation.clone(),
            original_context: card.original_context.clone(),
            translation_context: card.translation_context.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub card: CardDraft,
    pub deck_id: Option<i32>,
    pub word_set_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardCardsRequest {
    pub card_ids: Vec<i32>,
}

/// Container a card is being removed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardContainer {
    Deck(i32),
    WordSet(i32),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCardQuery {
    pub deck_id: Option<i32>,
    pub word_set_id: Option<i32>,
}

impl RemoveCardQuery {
    /// Exactly one of `deckId` and `wordSetId` must be given.
    pub fn container(&self) -> Result<CardContainer, AppError> {
        match (self.deck_id, self.word_set_id) {
            (Some(deck_id), None) => Ok(CardContainer::Deck(deck_id)),
            (None, Some(word_set_id)) => Ok(CardContainer::WordSet(word_set_id)),
            _ => Err(AppError::invalid("pass exactly one of deckId and wordSetId")),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub id: i32,
    pub original_word: String,
    pub translation: String,
    pub original_context: Option<String>,
    pub translation_context: Option<String>,
    pub is_learning: bool,
}

impl CardView {
    pub fn new(card: Card, is_learning: bool) -> Self {
        Self {
            id: card.id,
            original_word: card.original_word,
            translation: card.translation,
            original_context: card.original_context,
            translation_context: card.translation_context,
            is_learning,
        }
    }
}

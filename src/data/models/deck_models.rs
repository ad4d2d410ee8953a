use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::data::models::{CardDraft, CardView, ScheduleView};
use crate::schema::{card_histories, deck_histories, decks};

/// A deck row.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = decks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Deck {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub current_level: i32,
    pub is_archived: bool,
    pub next_review_date: NaiveDateTime,
    pub next_primary_direction: bool,
    pub schedule_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = decks)]
pub struct NewDeck<'a> {
    pub user_id: i32,
    pub name: &'a str,
    pub created_at: NaiveDateTime,
    pub current_level: i32,
    pub is_archived: bool,
    pub next_review_date: NaiveDateTime,
    pub next_primary_direction: bool,
    pub schedule_id: i32,
}

/// Partial update of the scheduling columns; `None` leaves a column untouched.
#[derive(Debug, Default, Clone, PartialEq, Eq, AsChangeset)]
#[diesel(table_name = decks)]
pub struct DeckPatch {
    pub current_level: Option<i32>,
    pub is_archived: Option<bool>,
    pub next_review_date: Option<NaiveDateTime>,
    pub next_primary_direction: Option<bool>,
}

/// User-editable deck fields.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = decks)]
pub struct DeckEdit<'a> {
    pub name: &'a str,
    pub schedule_id: i32,
    pub next_review_date: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = deck_histories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct DeckHistory {
    pub review_date: NaiveDateTime,
    pub accuracy: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = deck_histories)]
pub struct NewDeckHistory {
    pub deck_id: i32,
    pub review_date: NaiveDateTime,
    pub accuracy: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = card_histories)]
pub struct NewCardHistory {
    pub user_id: i32,
    pub deck_id: i32,
    pub card_id: i32,
    pub review_date: NaiveDateTime,
    pub is_correct: bool,
}

/// Result for a single card inside a review session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardReviewResult {
    pub card_id: i32,
    pub is_correct: bool,
}

// Request payloads

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeckRequest {
    #[validate(length(min = 1, max = 100, message = "Deck name must be 1 to 100 characters"))]
    pub name: String,
    pub schedule_id: i32,
    pub next_review_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub existing_card_ids: Vec<i32>,
    #[serde(default)]
    #[validate(nested)]
    pub new_cards: Vec<CardDraft>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeckRequest {
    #[validate(length(min = 1, max = 100, message = "Deck name must be 1 to 100 characters"))]
    pub name: String,
    pub schedule_id: i32,
    pub next_review_date: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub results: Vec<CardReviewResult>,
}

#[derive(Debug, Deserialize)]
pub struct ListDecksQuery {
    #[serde(default)]
    pub archived: bool,
}

// Responses

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeckResponse {
    pub id: i32,
    pub name: String,
    pub next_review_date: NaiveDateTime,
    pub schedule_id: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSummary {
    pub id: i32,
    pub name: String,
    pub current_level: i32,
    pub next_review_date: NaiveDateTime,
    pub cards_count: i64,
    pub is_archived: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckDetails {
    pub id: i32,
    pub name: String,
    pub current_level: i32,
    pub is_archived: bool,
    pub next_review_date: NaiveDateTime,
    pub next_primary_direction: bool,
    pub schedule_id: i32,
    pub schedule: ScheduleView,
    pub cards: Vec<CardView>,
    pub deck_histories: Vec<DeckHistory>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeckResponse {
    pub name: String,
    pub schedule_id: i32,
    pub next_review_date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub accuracy: i32,
    pub level: i32,
    pub next_review_date: NaiveDateTime,
}

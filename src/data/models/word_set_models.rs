use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::data::models::{CardDraft, CardView};
use crate::schema::word_sets;

pub const DEFAULT_WORD_SET_NAME: &str = "Difficult words";

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = word_sets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WordSet {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub is_public: bool,
    pub is_default: bool,
}

#[derive(Insertable)]
#[diesel(table_name = word_sets)]
pub struct NewWordSet<'a> {
    pub user_id: i32,
    pub name: &'a str,
    pub is_public: bool,
    pub is_default: bool,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WordSetRequest {
    #[validate(length(min = 1, max = 100, message = "Word set name must be 1 to 100 characters"))]
    pub name: String,
    #[serde(default)]
    pub is_public: bool,
}

/// Which word sets a listing returns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordSetScope {
    #[default]
    Mine,
    Public,
}

#[derive(Debug, Deserialize)]
pub struct ListWordSetsQuery {
    #[serde(rename = "type", default)]
    pub scope: WordSetScope,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BatchCardsRequest {
    #[validate(nested)]
    pub cards: Vec<CardDraft>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordSetView {
    pub id: i32,
    pub name: String,
    pub is_public: bool,
}

impl From<WordSet> for WordSetView {
    fn from(set: WordSet) -> Self {
        Self {
            id: set.id,
            name: set.name,
            is_public: set.is_public,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordSetSummary {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub is_public: bool,
    pub is_default: bool,
    pub cards_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordSetDetails {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub is_public: bool,
    pub is_default: bool,
    pub cards: Vec<CardView>,
}

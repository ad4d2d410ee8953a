//! Card membership in decks and word sets.
//!
//! A card lives as long as at least one deck or word set holds it. Every
//! path that drops a membership checks the remaining count in the same
//! transaction and deletes the card once it reaches zero.

use diesel::prelude::*;
use validator::Validate;

use crate::data::models::{
    AppError, CardContainer, CardDraft, CardView, CreateCardRequest, NewWordSet, WordSetView,
};
use crate::data::repositories::{CardRepository, DeckRepository, WordSetRepository};
use crate::features::word_sets::visible_word_set;

/// Deletes the card when no deck or word set holds it any more.
pub fn purge_if_orphaned(conn: &mut SqliteConnection, card_id: i32) -> QueryResult<bool> {
    if CardRepository::membership_count(conn, card_id)? > 0 {
        return Ok(false);
    }

    CardRepository::delete(conn, card_id)?;
    log::debug!("Deleted orphaned card {}", card_id);
    Ok(true)
}

pub struct MembershipManager<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> MembershipManager<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Creates a card inside an owned deck, an owned word set, or both.
    pub fn create_card(
        &mut self,
        user_id: i32,
        request: CreateCardRequest,
    ) -> Result<CardView, AppError> {
        request.validate()?;
        if request.deck_id.is_none() && request.word_set_id.is_none() {
            return Err(AppError::invalid("a card needs a deckId or a wordSetId"));
        }

        self.conn.transaction::<_, AppError, _>(|conn| {
            if let Some(deck_id) = request.deck_id {
                DeckRepository::find_owned(conn, user_id, deck_id)?
                    .ok_or(AppError::NotFound("deck"))?;
            }
            if let Some(word_set_id) = request.word_set_id {
                WordSetRepository::find_owned(conn, user_id, word_set_id)?
                    .ok_or(AppError::NotFound("word set"))?;
            }

            let card_id = CardRepository::create(conn, &request.card.as_new_card())?;
            if let Some(deck_id) = request.deck_id {
                DeckRepository::link_cards(conn, deck_id, &[card_id])?;
            }
            if let Some(word_set_id) = request.word_set_id {
                WordSetRepository::link_cards(conn, word_set_id, &[card_id])?;
            }

            let card = CardRepository::get(conn, card_id)?;
            Ok(CardView::new(card, request.deck_id.is_some()))
        })
    }

    pub fn update_card(
        &mut self,
        user_id: i32,
        card_id: i32,
        draft: CardDraft,
    ) -> Result<CardView, AppError> {
        draft.validate()?;

        self.conn.transaction::<_, AppError, _>(|conn| {
            if !CardRepository::reachable_by(conn, user_id, card_id)? {
                return Err(AppError::NotFound("card"));
            }

            CardRepository::update(conn, card_id, &draft.as_new_card())?;
            let card = CardRepository::get(conn, card_id)?;
            let is_learning = CardRepository::learning_ids(conn, user_id)?.contains(&card_id);
            Ok(CardView::new(card, is_learning))
        })
    }

    /// Unlinks the card from one container. Returns whether the card was deleted.
    pub fn remove_card(
        &mut self,
        user_id: i32,
        card_id: i32,
        container: CardContainer,
    ) -> Result<bool, AppError> {
        self.conn.immediate_transaction::<_, AppError, _>(|conn| {
            let unlinked = match container {
                CardContainer::Deck(deck_id) => {
                    DeckRepository::find_owned(conn, user_id, deck_id)?
                        .ok_or(AppError::NotFound("deck"))?;
                    CardRepository::unlink_from_deck(conn, deck_id, card_id)?
                }
                CardContainer::WordSet(word_set_id) => {
                    WordSetRepository::find_owned(conn, user_id, word_set_id)?
                        .ok_or(AppError::NotFound("word set"))?;
                    CardRepository::unlink_from_word_set(conn, word_set_id, &[card_id])?
                }
            };
            if unlinked == 0 {
                return Err(AppError::NotFound("card"));
            }

            Ok(purge_if_orphaned(conn, card_id)?)
        })
    }

    /// Puts the cards into the user's default word set. Returns how many were new there.
    pub fn mark_hard(&mut self, user_id: i32, card_ids: &[i32]) -> Result<usize, AppError> {
        if card_ids.is_empty() {
            return Ok(0);
        }

        self.conn.transaction::<_, AppError, _>(|conn| {
            let missing = CardRepository::unreachable_ids(conn, user_id, card_ids)?;
            if !missing.is_empty() {
                log::warn!(
                    "User {} marked cards outside their collection as hard: {:?}",
                    user_id,
                    missing
                );
                return Err(AppError::NotFound("card"));
            }

            let default_set = WordSetRepository::get_default(conn, user_id)?;
            Ok(WordSetRepository::link_cards(conn, default_set.id, card_ids)?)
        })
    }

    /// Private copy of an owned or public word set, with fresh card rows.
    pub fn copy_word_set(&mut self, user_id: i32, word_set_id: i32) -> Result<WordSetView, AppError> {
        self.conn.transaction::<_, AppError, _>(|conn| {
            let source = visible_word_set(conn, user_id, word_set_id)?;
            let cards = CardRepository::in_word_set(conn, source.id)?;

            let copy = WordSetRepository::create(
                conn,
                &NewWordSet {
                    user_id,
                    name: &source.name,
                    is_public: false,
                    is_default: false,
                },
            )?;

            let mut card_ids = Vec::with_capacity(cards.len());
            for card in &cards {
                let draft = CardDraft::from(card);
                card_ids.push(CardRepository::create(conn, &draft.as_new_card())?);
            }
            WordSetRepository::link_cards(conn, copy.id, &card_ids)?;

            log::info!(
                "User {} copied word set {} into {} ({} cards)",
                user_id,
                source.id,
                copy.id,
                card_ids.len()
            );
            Ok(WordSetView::from(copy))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::{CreateDeckRequest, NewCard};
    use crate::clock::FixedClock;
    use crate::db::test_connection;
    use crate::features::decks::DeckService;
    use crate::features::testing::{default_schedule, default_word_set, make_premium, seed_user};

    fn draft(word: &str) -> CardDraft {
        CardDraft {
            original_word: word.into(),
            translation: format!("{word}-tr"),
            original_context: None,
            translation_context: None,
        }
    }

    fn card_exists(conn: &mut SqliteConnection, card_id: i32) -> bool {
        CardRepository::get(conn, card_id).optional().unwrap().is_some()
    }

    fn deck_with(conn: &mut SqliteConnection, user_id: i32, words: &[&str]) -> i32 {
        let schedule = default_schedule(conn, user_id);
        let clock = FixedClock::at("2024-04-01 09:00:00");
        DeckService::new(conn, &clock)
            .create(
                user_id,
                CreateDeckRequest {
                    name: "deck".into(),
                    schedule_id: schedule.id,
                    next_review_date: None,
                    existing_card_ids: vec![],
                    new_cards: words.iter().map(|w| draft(w)).collect(),
                },
            )
            .unwrap()
            .id
    }

    #[test]
    fn card_needs_a_container() {
        let mut conn = test_connection();
        let user = seed_user(&mut conn, "ana");

        let err = MembershipManager::new(&mut conn)
            .create_card(
                user.id,
                CreateCardRequest {
                    card: draft("hola"),
                    deck_id: None,
                    word_set_id: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn empty_word_is_rejected() {
        let mut conn = test_connection();
        let user = seed_user(&mut conn, "ana");
        let set = default_word_set(&mut conn, user.id);

        let err = MembershipManager::new(&mut conn)
            .create_card(
                user.id,
                CreateCardRequest {
                    card: draft(""),
                    deck_id: None,
                    word_set_id: Some(set.id),
                },
            )
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn removing_last_membership_deletes_card() {
        let mut conn = test_connection();
        let user = seed_user(&mut conn, "ana");
        let set = default_word_set(&mut conn, user.id);

        let card = MembershipManager::new(&mut conn)
            .create_card(
                user.id,
                CreateCardRequest {
                    card: draft("perro"),
                    deck_id: None,
                    word_set_id: Some(set.id),
                },
            )
            .unwrap();
        assert!(!card.is_learning);

        let deleted = MembershipManager::new(&mut conn)
            .remove_card(user.id, card.id, CardContainer::WordSet(set.id))
            .unwrap();
        assert!(deleted);
        assert!(!card_exists(&mut conn, card.id));
    }

    #[test]
    fn card_survives_while_another_container_holds_it() {
        let mut conn = test_connection();
        let user = seed_user(&mut conn, "ana");
        let set = default_word_set(&mut conn, user.id);
        let deck_id = deck_with(&mut conn, user.id, &[]);

        let card = MembershipManager::new(&mut conn)
            .create_card(
                user.id,
                CreateCardRequest {
                    card: draft("gato"),
                    deck_id: Some(deck_id),
                    word_set_id: Some(set.id),
                },
            )
            .unwrap();
        assert!(card.is_learning);

        let deleted = MembershipManager::new(&mut conn)
            .remove_card(user.id, card.id, CardContainer::Deck(deck_id))
            .unwrap();
        assert!(!deleted);
        assert!(card_exists(&mut conn, card.id));
    }

    #[test]
    fn removing_from_someone_elses_deck_is_not_found() {
        let mut conn = test_connection();
        let owner = seed_user(&mut conn, "ana");
        let intruder = seed_user(&mut conn, "bob");
        let deck_id = deck_with(&mut conn, owner.id, &["uno"]);
        let card_id = DeckRepository::card_ids(&mut conn, deck_id).unwrap()[0];

        let err = MembershipManager::new(&mut conn)
            .remove_card(intruder.id, card_id, CardContainer::Deck(deck_id))
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("deck")));
        assert!(card_exists(&mut conn, card_id));
    }

    #[test]
    fn removing_a_card_not_in_the_container_is_not_found() {
        let mut conn = test_connection();
        let user = seed_user(&mut conn, "ana");
        let deck_id = deck_with(&mut conn, user.id, &[]);
        let stray = CardRepository::create(
            &mut conn,
            &NewCard {
                original_word: "x",
                translation: "y",
                original_context: None,
                translation_context: None,
            },
        )
        .unwrap();

        let err = MembershipManager::new(&mut conn)
            .remove_card(user.id, stray, CardContainer::Deck(deck_id))
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("card")));
    }

    #[test]
    fn mark_hard_is_idempotent() {
        let mut conn = test_connection();
        let user = seed_user(&mut conn, "ana");
        make_premium(&mut conn, user.id);
        let deck_id = deck_with(&mut conn, user.id, &["uno", "dos"]);
        let card_ids = DeckRepository::card_ids(&mut conn, deck_id).unwrap();

        let first = MembershipManager::new(&mut conn).mark_hard(user.id, &card_ids).unwrap();
        let second = MembershipManager::new(&mut conn).mark_hard(user.id, &card_ids).unwrap();
        assert_eq!(first, 2);
        assert_eq!(second, 0);

        let set = default_word_set(&mut conn, user.id);
        assert_eq!(WordSetRepository::card_ids(&mut conn, set.id).unwrap().len(), 2);
    }

    #[test]
    fn mark_hard_with_unknown_card_changes_nothing() {
        let mut conn = test_connection();
        let user = seed_user(&mut conn, "ana");
        let deck_id = deck_with(&mut conn, user.id, &["uno"]);
        let mut card_ids = DeckRepository::card_ids(&mut conn, deck_id).unwrap();
        card_ids.push(9999);

        let err = MembershipManager::new(&mut conn).mark_hard(user.id, &card_ids).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let set = default_word_set(&mut conn, user.id);
        assert!(WordSetRepository::card_ids(&mut conn, set.id).unwrap().is_empty());
    }

    #[test]
    fn someone_elses_card_cannot_be_marked_hard() {
        let mut conn = test_connection();
        let owner = seed_user(&mut conn, "ana");
        let intruder = seed_user(&mut conn, "bob");
        let owner_set = default_word_set(&mut conn, owner.id);
        let card = MembershipManager::new(&mut conn)
            .create_card(
                owner.id,
                CreateCardRequest {
                    card: draft("casa"),
                    deck_id: None,
                    word_set_id: Some(owner_set.id),
                },
            )
            .unwrap();

        let err = MembershipManager::new(&mut conn)
            .mark_hard(intruder.id, &[card.id])
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("card")));
        let intruder_set = default_word_set(&mut conn, intruder.id);
        assert!(WordSetRepository::card_ids(&mut conn, intruder_set.id).unwrap().is_empty());

        let err = MembershipManager::new(&mut conn)
            .update_card(intruder.id, card.id, draft("changed"))
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("card")));
        assert_eq!(CardRepository::get(&mut conn, card.id).unwrap().original_word, "casa");
    }

    #[test]
    fn copying_a_public_set_duplicates_cards() {
        let mut conn = test_connection();
        let author = seed_user(&mut conn, "ana");
        let reader = seed_user(&mut conn, "bob");
        let source = WordSetRepository::create(
            &mut conn,
            &NewWordSet {
                user_id: author.id,
                name: "Food",
                is_public: true,
                is_default: false,
            },
        )
        .unwrap();
        MembershipManager::new(&mut conn)
            .create_card(
                author.id,
                CreateCardRequest {
                    card: draft("pan"),
                    deck_id: None,
                    word_set_id: Some(source.id),
                },
            )
            .unwrap();

        let copy = MembershipManager::new(&mut conn).copy_word_set(reader.id, source.id).unwrap();
        assert_eq!(copy.name, "Food");
        assert!(!copy.is_public);

        let original_ids = WordSetRepository::card_ids(&mut conn, source.id).unwrap();
        let copied_ids = WordSetRepository::card_ids(&mut conn, copy.id).unwrap();
        assert_eq!(copied_ids.len(), 1);
        assert_ne!(copied_ids, original_ids);
    }

    #[test]
    fn copying_a_private_set_of_another_user_is_denied() {
        let mut conn = test_connection();
        let author = seed_user(&mut conn, "ana");
        let reader = seed_user(&mut conn, "bob");
        let private = default_word_set(&mut conn, author.id);

        let err = MembershipManager::new(&mut conn)
            .copy_word_set(reader.id, private.id)
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }
}

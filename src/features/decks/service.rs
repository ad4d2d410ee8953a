use std::collections::HashSet;

use chrono::{NaiveDateTime, NaiveTime};
use diesel::prelude::*;
use validator::Validate;

use crate::clock::Clock;
use crate::data::models::{
    AppError, CardReviewResult, CardView, CreateDeckRequest, CreateDeckResponse, Deck, DeckDetails,
    DeckEdit, DeckPatch, DeckSummary, NewDeck, PlanLimit, ReviewResponse, ScheduleView,
    UpdateDeckRequest, UpdateDeckResponse,
};
use crate::data::repositories::{
    CardRepository, DeckRepository, ScheduleRepository, UserRepository, WordSetRepository,
};
use crate::features::cards::purge_if_orphaned;
use crate::features::review;

/// Cards a free-plan deck may start with.
pub const FREE_PLAN_MAX_CARDS: usize = 7;

/// Decks a free-plan user may create per UTC day.
pub const FREE_PLAN_DECKS_PER_DAY: i64 = 1;

fn start_of_day(now: NaiveDateTime) -> NaiveDateTime {
    now.date().and_time(NaiveTime::MIN)
}

fn owned_deck(conn: &mut SqliteConnection, user_id: i32, deck_id: i32) -> Result<Deck, AppError> {
    DeckRepository::find_owned(conn, user_id, deck_id)?.ok_or(AppError::NotFound("deck"))
}

pub struct DeckService<'a> {
    conn: &'a mut SqliteConnection,
    clock: &'a dyn Clock,
}

impl<'a> DeckService<'a> {
    pub fn new(conn: &'a mut SqliteConnection, clock: &'a dyn Clock) -> Self {
        Self { conn, clock }
    }

    /// Creates a deck with new and existing cards, enforcing free-plan limits.
    pub fn create(
        &mut self,
        user_id: i32,
        request: CreateDeckRequest,
    ) -> Result<CreateDeckResponse, AppError> {
        request.validate()?;
        let now = self.clock.now();

        let deck = self.conn.immediate_transaction::<_, AppError, _>(|conn| {
            let user = UserRepository::get_by_id(conn, user_id)?;
            if !user.is_premium(now) {
                let total_cards = request.new_cards.len() + request.existing_card_ids.len();
                if total_cards > FREE_PLAN_MAX_CARDS {
                    return Err(AppError::PlanLimitExceeded(PlanLimit::TooManyCards));
                }
                let today = DeckRepository::count_created_since(conn, user_id, start_of_day(now))?;
                if today >= FREE_PLAN_DECKS_PER_DAY {
                    return Err(AppError::PlanLimitExceeded(PlanLimit::TooManyDecksToday));
                }
            }

            ScheduleRepository::find_owned(conn, user_id, request.schedule_id)?
                .ok_or(AppError::NotFound("schedule"))?;

            let missing =
                CardRepository::unreachable_ids(conn, user_id, &request.existing_card_ids)?;
            if !missing.is_empty() {
                log::warn!("User {} built a deck from cards they do not hold: {:?}", user_id, missing);
                return Err(AppError::NotFound("card"));
            }

            let deck = DeckRepository::create(
                conn,
                &NewDeck {
                    user_id,
                    name: &request.name,
                    created_at: now,
                    current_level: 0,
                    is_archived: false,
                    next_review_date: request.next_review_date.unwrap_or(now),
                    next_primary_direction: true,
                    schedule_id: request.schedule_id,
                },
            )?;

            let mut card_ids = Vec::with_capacity(request.new_cards.len());
            for draft in &request.new_cards {
                card_ids.push(CardRepository::create(conn, &draft.as_new_card())?);
            }
            DeckRepository::link_cards(conn, deck.id, &card_ids)?;

            if !request.existing_card_ids.is_empty() {
                DeckRepository::link_cards(conn, deck.id, &request.existing_card_ids)?;
                // Cards picked from the hard-words set leave it once they are learned again.
                let default_set = WordSetRepository::get_default(conn, user_id)?;
                CardRepository::unlink_from_word_set(
                    conn,
                    default_set.id,
                    &request.existing_card_ids,
                )?;
            }

            Ok(deck)
        })?;

        log::info!("User {} created deck {} ({})", user_id, deck.id, deck.name);
        Ok(CreateDeckResponse {
            id: deck.id,
            name: deck.name,
            next_review_date: deck.next_review_date,
            schedule_id: deck.schedule_id,
        })
    }

    pub fn list(&mut self, user_id: i32, archived: bool) -> Result<Vec<DeckSummary>, AppError> {
        Ok(DeckRepository::list(self.conn, user_id, archived)?)
    }

    pub fn get(&mut self, user_id: i32, deck_id: i32) -> Result<DeckDetails, AppError> {
        let deck = owned_deck(self.conn, user_id, deck_id)?;
        let schedule = ScheduleRepository::get(self.conn, deck.schedule_id)?;
        let steps = ScheduleRepository::steps(self.conn, deck.schedule_id)?;
        let cards = CardRepository::in_deck(self.conn, deck.id)?
            .into_iter()
            .map(|card| CardView::new(card, true))
            .collect();
        let deck_histories = DeckRepository::histories(self.conn, deck.id)?;

        Ok(DeckDetails {
            id: deck.id,
            name: deck.name,
            current_level: deck.current_level,
            is_archived: deck.is_archived,
            next_review_date: deck.next_review_date,
            next_primary_direction: deck.next_primary_direction,
            schedule_id: deck.schedule_id,
            schedule: ScheduleView::new(schedule, steps),
            cards,
            deck_histories,
        })
    }

    pub fn update(
        &mut self,
        user_id: i32,
        deck_id: i32,
        request: UpdateDeckRequest,
    ) -> Result<UpdateDeckResponse, AppError> {
        request.validate()?;

        self.conn.transaction::<_, AppError, _>(|conn| {
            owned_deck(conn, user_id, deck_id)?;
            ScheduleRepository::find_owned(conn, user_id, request.schedule_id)?
                .ok_or(AppError::NotFound("schedule"))?;

            DeckRepository::apply_edit(
                conn,
                deck_id,
                &DeckEdit {
                    name: &request.name,
                    schedule_id: request.schedule_id,
                    next_review_date: request.next_review_date,
                },
            )?;
            Ok(())
        })?;

        Ok(UpdateDeckResponse {
            name: request.name,
            schedule_id: request.schedule_id,
            next_review_date: request.next_review_date,
        })
    }

    /// Records a finished session and moves the deck along its schedule.
    pub fn review(
        &mut self,
        user_id: i32,
        deck_id: i32,
        results: &[CardReviewResult],
    ) -> Result<ReviewResponse, AppError> {
        if results.is_empty() {
            return Err(AppError::invalid("a review session needs at least one result"));
        }
        let now = self.clock.now();

        // Deck is read under the write lock.
        let response = self.conn.immediate_transaction::<_, AppError, _>(|conn| {
            let deck = owned_deck(conn, user_id, deck_id)?;

            let in_deck: HashSet<i32> =
                DeckRepository::card_ids(conn, deck.id)?.into_iter().collect();
            if let Some(stray) = results.iter().find(|r| !in_deck.contains(&r.card_id)) {
                return Err(AppError::invalid(format!(
                    "card {} is not part of deck {}",
                    stray.card_id, deck.id
                )));
            }

            let steps = ScheduleRepository::steps(conn, deck.schedule_id)?;
            let outcome = review::evaluate(&deck, &steps, results, now)?;

            DeckRepository::insert_card_histories(conn, &outcome.card_histories)?;
            DeckRepository::insert_deck_history(conn, &outcome.deck_history)?;
            DeckRepository::apply_patch(conn, deck.id, &outcome.patch)?;

            if outcome.patch.is_archived == Some(true) {
                log::info!("Deck {} finished its schedule and was archived", deck.id);
            }

            Ok(ReviewResponse {
                accuracy: outcome.accuracy,
                level: outcome.transition.level(),
                next_review_date: outcome.transition.next_review_date(),
            })
        })?;

        Ok(response)
    }

    /// Wipes the deck's history and puts it back at level 0, due now.
    ///
    /// A deck that is already fresh (level 0, unarchived, no history, already
    /// due) is left untouched. A new deck scheduled for later is pulled to now.
    pub fn restart(&mut self, user_id: i32, deck_id: i32) -> Result<(), AppError> {
        let now = self.clock.now();

        self.conn.transaction::<_, AppError, _>(|conn| {
            let deck = owned_deck(conn, user_id, deck_id)?;
            let fresh =
                deck.current_level == 0 && !deck.is_archived && deck.next_review_date <= now;
            if fresh && !DeckRepository::has_history(conn, deck.id)? {
                return Ok(());
            }

            DeckRepository::delete_histories(conn, deck.id)?;
            DeckRepository::apply_patch(
                conn,
                deck.id,
                &DeckPatch {
                    current_level: Some(0),
                    is_archived: Some(false),
                    next_review_date: Some(now),
                    next_primary_direction: None,
                },
            )?;
            log::info!("Deck {} restarted", deck.id);
            Ok(())
        })
    }

    /// Deletes the deck and every card that only it held.
    pub fn delete(&mut self, user_id: i32, deck_id: i32) -> Result<(), AppError> {
        self.conn.immediate_transaction::<_, AppError, _>(|conn| {
            let deck = owned_deck(conn, user_id, deck_id)?;
            let card_ids = DeckRepository::card_ids(conn, deck.id)?;

            DeckRepository::delete_histories(conn, deck.id)?;
            DeckRepository::unlink_all_cards(conn, deck.id)?;
            DeckRepository::delete(conn, deck.id)?;

            let mut purged = 0;
            for card_id in card_ids {
                if purge_if_orphaned(conn, card_id)? {
                    purged += 1;
                }
            }
            log::info!("Deck {} deleted, {} orphaned cards purged", deck.id, purged);
            Ok(())
        })
    }
}

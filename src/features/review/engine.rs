//! Review engine.
//!
//! Turns a finished review session into the next state of a deck. The engine
//! is pure: it reads the deck, the steps of its schedule and the per-card
//! results, and returns the audit rows plus a [`DeckPatch`]. Persisting the
//! outcome is up to the caller, in a single transaction.

use chrono::{Duration, Months, NaiveDateTime};

use crate::data::models::{
    AppError, CardReviewResult, Deck, DeckPatch, NewCardHistory, NewDeckHistory, ScheduleStep,
};

/// Sessions at or above this accuracy switch the prompt direction.
pub const DIRECTION_FLIP_ACCURACY: i32 = 65;

/// Archived decks are due this far in the future, i.e. never.
const ARCHIVE_HORIZON_YEARS: u32 = 1000;

/// Where the deck ends up after a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelTransition {
    /// A step existed for the current level.
    Advanced { level: i32, next_review_date: NaiveDateTime },
    /// The schedule is exhausted; the level is left as it was.
    Archived { level: i32, next_review_date: NaiveDateTime },
}

impl LevelTransition {
    pub fn level(&self) -> i32 {
        match *self {
            LevelTransition::Advanced { level, .. } | LevelTransition::Archived { level, .. } => {
                level
            }
        }
    }

    pub fn next_review_date(&self) -> NaiveDateTime {
        match *self {
            LevelTransition::Advanced { next_review_date, .. }
            | LevelTransition::Archived { next_review_date, .. } => next_review_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub accuracy: i32,
    pub transition: LevelTransition,
    pub flip_direction: bool,
    pub deck_history: NewDeckHistory,
    pub card_histories: Vec<NewCardHistory>,
    pub patch: DeckPatch,
}

/// Integer percentage of correct answers, rounded half up.
pub fn accuracy(results: &[CardReviewResult]) -> Result<i32, AppError> {
    if results.is_empty() {
        return Err(AppError::invalid("a review session needs at least one result"));
    }

    let correct = results.iter().filter(|r| r.is_correct).count() as f64;
    let total = results.len() as f64;
    Ok((100.0 * correct / total).round() as i32)
}

/// Far-future date given to archived decks.
pub fn archive_sentinel(now: NaiveDateTime) -> NaiveDateTime {
    now.checked_add_months(Months::new(ARCHIVE_HORIZON_YEARS * 12))
        .unwrap_or(NaiveDateTime::MAX)
}

/// Computes the deck's next state for a completed session.
///
/// `steps` need not be sorted; levels are unique within a schedule.
pub fn evaluate(
    deck: &Deck,
    steps: &[ScheduleStep],
    results: &[CardReviewResult],
    now: NaiveDateTime,
) -> Result<ReviewOutcome, AppError> {
    let accuracy = accuracy(results)?;

    let transition = match steps.iter().find(|s| s.level == deck.current_level) {
        Some(step) => LevelTransition::Advanced {
            level: step.level + 1,
            next_review_date: now + Duration::minutes(i64::from(step.interval_minutes)),
        },
        None => LevelTransition::Archived {
            level: deck.current_level,
            next_review_date: archive_sentinel(now),
        },
    };

    let flip_direction = accuracy >= DIRECTION_FLIP_ACCURACY;

    let patch = match transition {
        LevelTransition::Advanced { level, next_review_date } => DeckPatch {
            current_level: Some(level),
            is_archived: None,
            next_review_date: Some(next_review_date),
            next_primary_direction: flip_direction.then_some(!deck.next_primary_direction),
        },
        LevelTransition::Archived { next_review_date, .. } => DeckPatch {
            current_level: None,
            is_archived: Some(true),
            next_review_date: Some(next_review_date),
            next_primary_direction: flip_direction.then_some(!deck.next_primary_direction),
        },
    };

    let card_histories = results
        .iter()
        .map(|r| NewCardHistory {
            user_id: deck.user_id,
            deck_id: deck.id,
            card_id: r.card_id,
            review_date: now,
            is_correct: r.is_correct,
        })
        .collect();

    Ok(ReviewOutcome {
        accuracy,
        transition,
        flip_direction,
        deck_history: NewDeckHistory {
            deck_id: deck.id,
            review_date: now,
            accuracy,
        },
        card_histories,
        patch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn deck(level: i32, direction: bool) -> Deck {
        Deck {
            id: 7,
            user_id: 3,
            name: "verbs".into(),
            created_at: at("2024-01-01 09:00:00"),
            current_level: level,
            is_archived: false,
            next_review_date: at("2024-01-01 09:00:00"),
            next_primary_direction: direction,
            schedule_id: 1,
        }
    }

    fn two_steps() -> Vec<ScheduleStep> {
        vec![
            ScheduleStep { level: 0, interval_minutes: 480 },
            ScheduleStep { level: 1, interval_minutes: 1440 },
        ]
    }

    fn results(correct: usize, wrong: usize) -> Vec<CardReviewResult> {
        (0..correct)
            .map(|i| CardReviewResult { card_id: i as i32 + 1, is_correct: true })
            .chain((0..wrong).map(|i| CardReviewResult {
                card_id: (correct + i) as i32 + 1,
                is_correct: false,
            }))
            .collect()
    }

    #[test]
    fn three_of_four_at_level_zero_advances_and_flips() {
        let now = at("2024-03-10 12:00:00");
        let outcome = evaluate(&deck(0, true), &two_steps(), &results(3, 1), now).unwrap();

        assert_eq!(outcome.accuracy, 75);
        assert_eq!(
            outcome.transition,
            LevelTransition::Advanced { level: 1, next_review_date: at("2024-03-10 20:00:00") }
        );
        assert!(outcome.flip_direction);
        assert_eq!(
            outcome.patch,
            DeckPatch {
                current_level: Some(1),
                is_archived: None,
                next_review_date: Some(at("2024-03-10 20:00:00")),
                next_primary_direction: Some(false),
            }
        );
    }

    #[test]
    fn level_past_last_step_archives_and_keeps_level() {
        let now = at("2024-03-10 12:00:00");
        let outcome = evaluate(&deck(2, true), &two_steps(), &results(4, 0), now).unwrap();

        assert_eq!(outcome.transition.level(), 2);
        assert!(matches!(outcome.transition, LevelTransition::Archived { .. }));
        assert_eq!(outcome.patch.current_level, None);
        assert_eq!(outcome.patch.is_archived, Some(true));
        assert_eq!(outcome.transition.next_review_date(), at("3024-03-10 12:00:00"));
    }

    #[test]
    fn advances_regardless_of_accuracy() {
        let now = at("2024-03-10 12:00:00");
        let outcome = evaluate(&deck(1, true), &two_steps(), &results(0, 5), now).unwrap();

        assert_eq!(outcome.accuracy, 0);
        assert_eq!(outcome.transition.level(), 2);
        assert_eq!(outcome.transition.next_review_date(), at("2024-03-11 12:00:00"));
    }

    #[test]
    fn unsorted_steps_are_matched_by_level() {
        let steps = vec![
            ScheduleStep { level: 1, interval_minutes: 60 },
            ScheduleStep { level: 0, interval_minutes: 10 },
        ];
        let now = at("2024-03-10 12:00:00");
        let outcome = evaluate(&deck(0, true), &steps, &results(1, 0), now).unwrap();

        assert_eq!(outcome.transition.next_review_date(), at("2024-03-10 12:10:00"));
    }

    #[test]
    fn empty_schedule_always_archives() {
        let now = at("2024-03-10 12:00:00");
        let outcome = evaluate(&deck(0, true), &[], &results(2, 0), now).unwrap();

        assert_eq!(outcome.patch.is_archived, Some(true));
        assert_eq!(outcome.transition.level(), 0);
    }

    #[test]
    fn empty_batch_is_rejected() {
        let now = at("2024-03-10 12:00:00");
        let err = evaluate(&deck(0, true), &two_steps(), &[], now).unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn accuracy_rounds_to_nearest_percent() {
        assert_eq!(accuracy(&results(1, 2)).unwrap(), 33);
        assert_eq!(accuracy(&results(2, 1)).unwrap(), 67);
        assert_eq!(accuracy(&results(1, 7)).unwrap(), 13);
        assert_eq!(accuracy(&results(5, 0)).unwrap(), 100);
    }

    #[test]
    fn direction_flips_only_at_or_above_threshold() {
        let now = at("2024-03-10 12:00:00");

        // 13 of 20 is exactly 65%.
        let at_threshold = evaluate(&deck(0, false), &two_steps(), &results(13, 7), now).unwrap();
        assert!(at_threshold.flip_direction);
        assert_eq!(at_threshold.patch.next_primary_direction, Some(true));

        // 16 of 25 is 64%.
        let below = evaluate(&deck(0, false), &two_steps(), &results(16, 9), now).unwrap();
        assert!(!below.flip_direction);
        assert_eq!(below.patch.next_primary_direction, None);
    }

    #[test]
    fn duplicate_cards_are_each_recorded() {
        let now = at("2024-03-10 12:00:00");
        let batch = vec![
            CardReviewResult { card_id: 5, is_correct: true },
            CardReviewResult { card_id: 5, is_correct: false },
        ];
        let outcome = evaluate(&deck(0, true), &two_steps(), &batch, now).unwrap();

        assert_eq!(outcome.card_histories.len(), 2);
        assert!(outcome.card_histories.iter().all(|h| h.card_id == 5 && h.deck_id == 7));
        assert_eq!(outcome.card_histories[0].user_id, 3);
        assert_eq!(outcome.accuracy, 50);
        assert_eq!(
            outcome.deck_history,
            NewDeckHistory { deck_id: 7, review_date: now, accuracy: 50 }
        );
    }
}

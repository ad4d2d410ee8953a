pub mod auth;
pub mod cards;
pub mod decks;
pub mod review;
pub mod schedules;
pub mod word_sets;

#[cfg(test)]
pub(crate) mod testing;

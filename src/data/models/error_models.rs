use std::fmt;

use diesel::result::Error as DieselError;
use thiserror::Error;

/// Free-tier limit that blocked a deck creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanLimit {
    TooManyCards,
    TooManyDecksToday,
}

impl PlanLimit {
    pub fn code(self) -> &'static str {
        match self {
            PlanLimit::TooManyCards => "free_limit_words_exceeded",
            PlanLimit::TooManyDecksToday => "free_limit_decks_exceeded",
        }
    }
}

// Errors shared by every resource handler
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    PlanLimitExceeded(PlanLimit),
    #[error("The {0} is protected and cannot be changed or deleted")]
    ProtectedResource(&'static str),
    #[error("The {0} was not found")]
    NotFound(&'static str),
    #[error("Not logged in")]
    Unauthenticated,
    #[error("Access denied")]
    Unauthorized,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Database error")]
    Database(DieselError),
    #[error("Connection pool error")]
    Pool(r2d2::Error),
}

impl fmt::Display for PlanLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanLimit::TooManyCards => f.write_str("Free plan decks can hold at most 7 cards"),
            PlanLimit::TooManyDecksToday => f.write_str("Free plan allows one new deck per day"),
        }
    }
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }
}

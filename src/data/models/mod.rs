pub mod auth_models;
pub mod card_models;
pub mod deck_models;
pub mod error_models;
pub mod schedule_models;
pub mod user_models;
pub mod word_set_models;

pub use auth_models::{LoginError, LoginForm, MockPaymentRequest, RegisterError, RegisterForm};
pub use card_models::{
    Card, CardContainer, CardDraft, CardView, CreateCardRequest, HardCardsRequest, NewCard,
    RemoveCardQuery,
};
pub use deck_models::{
    CardReviewResult, CreateDeckRequest, CreateDeckResponse, Deck, DeckDetails, DeckEdit,
    DeckHistory, DeckPatch, DeckSummary, ListDecksQuery, NewCardHistory, NewDeck, NewDeckHistory,
    ReviewRequest, ReviewResponse, UpdateDeckRequest, UpdateDeckResponse,
};
pub use error_models::{AppError, PlanLimit};
pub use schedule_models::{
    DeleteScheduleQuery, NewSchedule, NewScheduleStep, Schedule, ScheduleRequest, ScheduleStep,
    ScheduleView, StepInput,
};
pub use user_models::{NewUser, PlanStatus, Profile, ProfileResponse, Stats, User, UserView};
pub use word_set_models::{
    BatchCardsRequest, DEFAULT_WORD_SET_NAME, ListWordSetsQuery, NewWordSet, WordSet,
    WordSetDetails, WordSetRequest, WordSetScope, WordSetSummary, WordSetView,
};

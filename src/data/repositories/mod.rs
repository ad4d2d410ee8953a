pub mod card;
pub mod deck;
pub mod schedule;
pub mod user;
pub mod word_set;

pub use card::CardRepository;
pub use deck::DeckRepository;
pub use schedule::ScheduleRepository;
pub use user::UserRepository;
pub use word_set::WordSetRepository;

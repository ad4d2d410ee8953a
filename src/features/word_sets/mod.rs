pub mod service;

pub use service::{WordSetService, visible_word_set};

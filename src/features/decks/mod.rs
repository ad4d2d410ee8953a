pub mod service;

pub use service::DeckService;

pub mod error_conversions;
pub mod error_responses;
pub mod service;

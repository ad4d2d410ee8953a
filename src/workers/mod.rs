pub mod cleaner;
pub mod scheduler;

pub use cleaner::OrphanCleaner;
pub use scheduler::start_job;

pub mod membership;

pub use membership::{MembershipManager, purge_if_orphaned};

//! Domain module - Core entities of a fetch batch
//!
//! Plain data types shared by the infrastructure and application layers:
//! the per-user record, per-identifier failures and the aggregated batch result.

pub mod outcome;
pub mod user_record;

// Re-export commonly used items for convenience
pub use outcome::{BatchResult, FetchFailure, FetchOutcome};
pub use user_record::{Identifier, QUERIED_USER_ID, UserRecord};

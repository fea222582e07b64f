//! Bulk User Fetcher - authenticated concurrent retrieval of user properties
//!
//! Logs into a CSRF-protected web application once, then fetches the
//! "User properties" table for many identifiers concurrently over the shared
//! session, reporting successes and per-identifier failures separately.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{BatchError, BatchFetchUseCase};
pub use domain::{BatchResult, FetchFailure, UserRecord};
pub use infrastructure::AppConfig;

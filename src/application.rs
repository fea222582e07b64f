//! Application layer module
//!
//! Use cases that drive the infrastructure: concurrent fan-out over a shared
//! session and aggregation of per-identifier outcomes.

pub mod aggregator;
pub mod batch_use_cases;
pub mod orchestrator;

pub use aggregator::ResultAggregator;
pub use batch_use_cases::{BatchError, BatchFetchUseCase};
pub use orchestrator::ConcurrentFetchOrchestrator;

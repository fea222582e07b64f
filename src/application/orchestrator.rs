//! Bounded-concurrency fan-out of fetch invocations
//!
//! One task per identifier, at most `limit` in flight. A permit is acquired
//! before each task is spawned and released when the task finishes, so the
//! next identifier starts as soon as any slot frees up.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use crate::domain::{FetchFailure, FetchOutcome, Identifier};
use crate::infrastructure::RecordFetcher;

/// Reason recorded when a fetch task dies without producing an outcome
pub const INTERNAL_FAILURE_REASON: &str = "Internal";

/// Runs a fetcher over many identifiers with a concurrency ceiling
#[derive(Debug, Clone)]
pub struct ConcurrentFetchOrchestrator {
    limit: usize,
}

impl ConcurrentFetchOrchestrator {
    /// A limit of zero is treated as one
    pub fn new(limit: usize) -> Self {
        Self { limit: limit.max(1) }
    }

    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Fetch every identifier, returning exactly one outcome per input.
    /// Outcomes are collected as tasks finish, so their order is unspecified.
    /// Duplicate identifiers are fetched independently.
    pub async fn run(
        &self,
        fetcher: Arc<dyn RecordFetcher>,
        identifiers: Vec<Identifier>,
    ) -> Vec<FetchOutcome> {
        let total = identifiers.len();
        info!(
            "🚀 Fetching {} identifiers with up to {} concurrent workers",
            total, self.limit
        );

        let semaphore = Arc::new(Semaphore::new(self.limit));
        let mut in_flight = FuturesUnordered::new();

        for identifier in identifiers {
            let handle = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => {
                    let fetcher = Arc::clone(&fetcher);
                    let task_identifier = identifier.clone();
                    Some(tokio::spawn(async move {
                        let _permit = permit;
                        fetcher.fetch_outcome(&task_identifier).await
                    }))
                }
                // Only reachable if the semaphore was closed
                Err(e) => {
                    error!("Worker pool unavailable, {} not fetched: {}", identifier, e);
                    None
                }
            };

            in_flight.push(async move {
                let outcome = match handle {
                    Some(handle) => handle.await.unwrap_or_else(|join_error| {
                        error!("💥 Fetch task for {} aborted: {}", identifier, join_error);
                        Err(FetchFailure::new(
                            identifier.clone(),
                            INTERNAL_FAILURE_REASON,
                            format!("fetch task aborted: {join_error}"),
                        ))
                    }),
                    None => Err(FetchFailure::new(
                        identifier.clone(),
                        INTERNAL_FAILURE_REASON,
                        "worker pool unavailable",
                    )),
                };
                (identifier, outcome)
            });
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some((identifier, outcome)) = in_flight.next().await {
            debug!(
                "Outcome {}/{} for {}: {}",
                outcomes.len() + 1,
                total,
                identifier,
                if outcome.is_ok() { "ok" } else { "failed" }
            );
            outcomes.push(outcome);
        }

        info!("🏁 All {} fetches finished", outcomes.len());
        outcomes
    }
}

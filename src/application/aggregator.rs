//! Partition fetch outcomes into records and failures

use tracing::info;

use crate::domain::{BatchResult, FetchOutcome};

/// Stateless collector of per-identifier outcomes
#[derive(Debug, Default, Clone, Copy)]
pub struct ResultAggregator;

impl ResultAggregator {
    /// Split outcomes into successes and failures, each keeping arrival order
    pub fn aggregate(outcomes: Vec<FetchOutcome>) -> BatchResult {
        let mut result = BatchResult::default();
        for outcome in outcomes {
            match outcome {
                Ok(record) => result.records.push(record),
                Err(failure) => result.failures.push(failure),
            }
        }

        info!(
            "📊 Batch complete: {} succeeded, {} failed",
            result.records.len(),
            result.failures.len()
        );
        result
    }
}

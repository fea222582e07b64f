//! Per-identifier fetch outcomes and the aggregated batch result

use serde::Serialize;

use super::user_record::{Identifier, QUERIED_USER_ID, UserRecord};

/// A per-identifier failure captured as data rather than propagated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub identifier: Identifier,
    /// Stable classification, e.g. `SectionNotFound` or `Network`
    pub reason: String,
    /// Full human-readable description of what went wrong
    pub message: String,
}

impl FetchFailure {
    pub fn new(
        identifier: impl Into<Identifier>,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            reason: reason.into(),
            message: message.into(),
        }
    }
}

/// Outcome of one fetch invocation: exactly one per submitted identifier
pub type FetchOutcome = Result<UserRecord, FetchFailure>;

/// Successes and failures of a whole batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub records: Vec<UserRecord>,
    pub failures: Vec<FetchFailure>,
}

impl BatchResult {
    /// Total outcomes held, which equals the number of submitted identifiers
    pub fn total(&self) -> usize {
        self.records.len() + self.failures.len()
    }

    /// "No data fetched" signal. Not an error.
    pub fn has_no_data(&self) -> bool {
        self.records.is_empty()
    }

    /// Union of all record keys in first-seen order, `queried_user_id` first
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec![QUERIED_USER_ID.to_string()];
        for record in &self.records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.to_string());
                }
            }
        }
        columns
    }

    /// Records projected onto [`Self::columns`], with empty cells where a record lacks a key
    pub fn rows(&self) -> Vec<Vec<String>> {
        let columns = self.columns();
        self.records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(column).unwrap_or_default().to_string())
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, fields: &[(&str, &str)]) -> UserRecord {
        let mut record = UserRecord::new(id);
        for (k, v) in fields {
            record.insert(*k, *v);
        }
        record
    }

    #[test]
    fn test_columns_are_union_in_first_seen_order() {
        let result = BatchResult {
            records: vec![
                record("A1", &[("Name", "Alice"), ("Email", "a@x.com")]),
                record("B2", &[("Status", "Active"), ("Name", "Bob")]),
            ],
            failures: vec![],
        };
        assert_eq!(
            result.columns(),
            vec!["queried_user_id", "Name", "Email", "Status"]
        );
    }

    #[test]
    fn test_rows_fill_missing_cells_with_empty_strings() {
        let result = BatchResult {
            records: vec![
                record("A1", &[("Name", "Alice")]),
                record("B2", &[("Status", "Active")]),
            ],
            failures: vec![],
        };
        assert_eq!(
            result.rows(),
            vec![
                vec!["A1".to_string(), "Alice".to_string(), String::new()],
                vec!["B2".to_string(), String::new(), "Active".to_string()],
            ]
        );
    }

    #[test]
    fn test_empty_batch_signals_no_data() {
        let result = BatchResult {
            records: vec![],
            failures: vec![FetchFailure::new("A2", "Network", "timed out")],
        };
        assert!(result.has_no_data());
        assert_eq!(result.total(), 1);
        assert_eq!(result.columns(), vec!["queried_user_id"]);
    }
}

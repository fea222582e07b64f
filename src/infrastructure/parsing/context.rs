//! Parsing context for user properties pages

use crate::domain::Identifier;

/// Context information for parsing one query response
#[derive(Debug, Clone)]
pub struct RecordParseContext {
    /// Identifier the page was requested for
    pub identifier: Identifier,

    /// URL the page was fetched from, for log provenance
    pub source_url: Option<String>,
}

impl RecordParseContext {
    pub fn new(identifier: impl Into<Identifier>) -> Self {
        Self {
            identifier: identifier.into(),
            source_url: None,
        }
    }

    /// Set source information
    pub fn with_source(mut self, url: &str) -> Self {
        self.source_url = Some(url.to_string());
        self
    }
}

//! Per-identifier user properties fetcher
//!
//! Each fetch is a strict three-step sequence over the shared session:
//! load the query page for a fresh token, submit the identifier with that
//! token, parse the response. Every failure is local to its identifier.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use super::parsing::config::USER_ID_FIELD;
use super::parsing::{
    ContextualParser, ParsingConfig, RecordParseContext, TokenExtractor, UserRecordParser,
};
use super::parsing_error::FetchError;
use super::session::Session;
use crate::domain::{FetchFailure, FetchOutcome, UserRecord};

/// Something that can turn one identifier into one user record
#[async_trait]
pub trait RecordFetcher: Send + Sync {
    async fn fetch(&self, identifier: &str) -> Result<UserRecord, FetchError>;

    /// Fetch and capture any error as a [`FetchFailure`]; never fails
    async fn fetch_outcome(&self, identifier: &str) -> FetchOutcome {
        match self.fetch(identifier).await {
            Ok(record) => Ok(record),
            Err(e) => {
                warn!("❌ Fetch failed for {}: {}", identifier, e);
                Err(FetchFailure::new(identifier, e.reason(), e.to_string()))
            }
        }
    }
}

/// Fetches user properties through an authenticated [`Session`]
pub struct UserRecordFetcher {
    session: Session,
    query_url: String,
    timeout: Duration,
    token_extractor: TokenExtractor,
    parser: UserRecordParser,
}

impl UserRecordFetcher {
    pub fn new(
        session: Session,
        query_url: impl Into<String>,
        timeout: Duration,
        parsing: &ParsingConfig,
    ) -> Result<Self> {
        Ok(Self {
            session,
            query_url: query_url.into(),
            timeout,
            token_extractor: TokenExtractor::new(parsing.token_field.clone()),
            parser: UserRecordParser::with_config(parsing)?,
        })
    }
}

#[async_trait]
impl RecordFetcher for UserRecordFetcher {
    async fn fetch(&self, identifier: &str) -> Result<UserRecord, FetchError> {
        let client = self.session.client();

        // Tokens may rotate per page view, so every submission needs its own
        let query_page = client
            .get_text(&self.query_url, self.timeout)
            .await
            .map_err(|e| FetchError::network(&self.query_url, &e))?;

        let token = self
            .token_extractor
            .extract(&query_page)
            .map_err(|_| FetchError::MissingToken {
                url: self.query_url.clone(),
            })?;

        let form = [
            (self.token_extractor.field_name(), token.as_str()),
            (USER_ID_FIELD, identifier),
        ];
        let response = client
            .post_form(&self.query_url, &form, &self.query_url, self.timeout)
            .await
            .map_err(|e| FetchError::network(&self.query_url, &e))?;

        let context = RecordParseContext::new(identifier).with_source(&self.query_url);
        let record = self.parser.parse_str(&response, &context)?;
        debug!(
            "📄 Parsed {} fields for {}",
            record.parsed_field_count(),
            identifier
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QUERIED_USER_ID;

    struct StaticFetcher;

    #[async_trait]
    impl RecordFetcher for StaticFetcher {
        async fn fetch(&self, identifier: &str) -> Result<UserRecord, FetchError> {
            if identifier == "missing" {
                return Err(FetchError::MissingToken {
                    url: "http://h/query/".to_string(),
                });
            }
            Ok(UserRecord::new(identifier))
        }
    }

    #[tokio::test]
    async fn test_fetch_outcome_wraps_success() {
        let record = StaticFetcher.fetch_outcome("A1").await.unwrap();
        assert_eq!(record.get(QUERIED_USER_ID), Some("A1"));
    }

    #[tokio::test]
    async fn test_fetch_outcome_captures_error_as_failure() {
        let failure = StaticFetcher.fetch_outcome("missing").await.unwrap_err();
        assert_eq!(failure.identifier, "missing");
        assert_eq!(failure.reason, "MissingToken");
        assert!(failure.message.contains("http://h/query/"));
    }
}

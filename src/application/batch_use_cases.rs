//! Batch fetch use case
//!
//! Wires configuration into the pipeline: authenticate once, fan the
//! identifiers out over the shared session, then partition the outcomes.
//! Authentication failure aborts the batch before any fetch is attempted.

use std::sync::Arc;

use thiserror::Error;
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use super::aggregator::ResultAggregator;
use super::orchestrator::ConcurrentFetchOrchestrator;
use crate::domain::{BatchResult, Identifier};
use crate::infrastructure::parsing::TokenExtractor;
use crate::infrastructure::{
    AppConfig, AuthError, HttpClient, SessionAuthenticator, UserRecordFetcher,
};

/// Batch-fatal errors; per-identifier problems never surface here
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Setup(#[from] anyhow::Error),
}

/// End-to-end fetch of one batch of identifiers
pub struct BatchFetchUseCase {
    config: AppConfig,
}

impl BatchFetchUseCase {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the batch. Returns one outcome per identifier, split into records
    /// and failures.
    pub async fn execute(&self, identifiers: Vec<Identifier>) -> Result<BatchResult, BatchError> {
        let batch_id = Uuid::new_v4();
        let span = info_span!("batch", batch_id = %batch_id);
        self.execute_inner(identifiers).instrument(span).await
    }

    async fn execute_inner(&self, identifiers: Vec<Identifier>) -> Result<BatchResult, BatchError> {
        let endpoints = &self.config.endpoints;
        let workers = &self.config.workers;
        let timeout = workers.request_timeout();
        info!(
            "📋 Starting batch of {} identifiers against {}",
            identifiers.len(),
            endpoints.query_url
        );

        let client = HttpClient::from_worker_config(workers)?;
        let authenticator = SessionAuthenticator::new(
            client.with_context_label("login"),
            TokenExtractor::new(self.config.parsing.token_field.clone()),
            timeout,
        );
        let session = authenticator
            .authenticate(
                &endpoints.login_url,
                &self.config.credentials.username,
                &self.config.credentials.password,
            )
            .await?;
        debug!(
            "Session for {} established at {}",
            session.login_url(),
            session.authenticated_at().to_rfc3339()
        );

        let fetcher = Arc::new(UserRecordFetcher::new(
            session,
            endpoints.query_url.clone(),
            timeout,
            &self.config.parsing,
        )?);

        let outcomes = ConcurrentFetchOrchestrator::new(workers.max_concurrent)
            .run(fetcher, identifiers)
            .await;

        Ok(ResultAggregator::aggregate(outcomes))
    }
}

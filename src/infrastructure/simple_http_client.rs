//! Cookie-carrying HTTP client for form-based web applications
//!
//! Wraps a single `reqwest` client whose cookie jar is shared by every clone.
//! The jar guards its store with an internal lock that is taken only while
//! cookies are read or written, never across a request, so many tasks can
//! drive requests through the same session concurrently.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::REFERER;
use reqwest::{Client, ClientBuilder, Url};
use tracing::{debug, info, warn};

use crate::infrastructure::config::WorkerConfig;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Configuration for HTTP client behavior
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Whether to follow redirects
    pub follow_redirects: bool,
    /// Maximum requests per second across all clones; 0 disables limiting
    pub max_requests_per_second: u32,
}

impl HttpClientConfig {
    /// Create HttpClientConfig from WorkerConfig
    pub fn from_worker_config(worker_config: &WorkerConfig) -> Self {
        Self {
            timeout_seconds: worker_config.request_timeout_seconds,
            user_agent: worker_config.user_agent.clone(),
            follow_redirects: true,
            max_requests_per_second: worker_config.max_requests_per_second,
        }
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from_worker_config(&WorkerConfig::default())
    }
}

/// HTTP client sharing one cookie jar and one optional rate limiter across clones
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    cookie_jar: Arc<Jar>,
    rate_limiter: Option<Arc<DirectRateLimiter>>,
    config: HttpClientConfig,
    /// Optional context label for provenance in logs (e.g., "login", "worker")
    context_label: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from WorkerConfig
    pub fn from_worker_config(worker_config: &WorkerConfig) -> Result<Self> {
        Self::with_config(HttpClientConfig::from_worker_config(worker_config))
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let cookie_jar = Arc::new(Jar::default());

        let client = ClientBuilder::new()
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .cookie_provider(Arc::clone(&cookie_jar))
            .gzip(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        let rate_limiter = match NonZeroU32::new(config.max_requests_per_second) {
            Some(rps) => {
                info!("⚖️ HTTP rate limit set to {} RPS", rps);
                Some(Arc::new(RateLimiter::direct(Quota::per_second(rps))))
            }
            None => None,
        };

        Ok(Self {
            client,
            cookie_jar,
            rate_limiter,
            config,
            context_label: None,
        })
    }

    /// Set a human-readable context label for logging provenance (returns self for chaining)
    pub fn with_context_label(mut self, label: &str) -> Self {
        self.context_label = Some(label.to_string());
        self
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }
    }

    fn label(&self) -> &str {
        self.context_label.as_deref().unwrap_or("http")
    }

    /// Issue a GET and return the response body.
    ///
    /// Non-success statuses are logged but the body is still returned; the
    /// caller decides from the content whether the page is usable.
    pub async fn get_text(&self, url: &str, timeout: Duration) -> Result<String, reqwest::Error> {
        self.wait_for_rate_limit().await;
        debug!("🌐 [{}] GET {}", self.label(), url);

        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("[{}] GET {} returned {}", self.label(), url, status);
        }
        response.text().await
    }

    /// Submit a url-encoded form with `Referer` set to the page the form came from
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        referer: &str,
        timeout: Duration,
    ) -> Result<String, reqwest::Error> {
        self.wait_for_rate_limit().await;
        debug!("🌐 [{}] POST {}", self.label(), url);

        let response = self
            .client
            .post(url)
            .header(REFERER, referer)
            .form(form)
            .timeout(timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            warn!("[{}] POST {} returned {}", self.label(), url, status);
        }
        response.text().await
    }

    /// Whether the jar currently holds any cookie that would be sent to `url`
    pub fn has_cookies_for(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|parsed| self.cookie_jar.cookies(&parsed))
            .is_some()
    }

    /// Get the configuration
    pub const fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

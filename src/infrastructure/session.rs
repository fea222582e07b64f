//! Login handshake and the shared authenticated session
//!
//! Authentication happens exactly once per batch, before any fetch starts.
//! The resulting [`Session`] is cloned into every worker; clones share the
//! underlying client and cookie jar.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::parsing::TokenExtractor;
use super::parsing::config::{PASSWORD_FIELD, USERNAME_FIELD};
use super::parsing_error::{AuthError, describe_transport_error};
use super::simple_http_client::HttpClient;

/// Authenticated transport state shared read-by-many across workers
#[derive(Clone)]
pub struct Session {
    client: HttpClient,
    login_url: String,
    authenticated_at: DateTime<Utc>,
}

impl Session {
    pub const fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    pub const fn authenticated_at(&self) -> DateTime<Utc> {
        self.authenticated_at
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("login_url", &self.login_url)
            .field("authenticated_at", &self.authenticated_at)
            .finish_non_exhaustive()
    }
}

/// Performs the token-protected login form handshake
pub struct SessionAuthenticator {
    client: HttpClient,
    token_extractor: TokenExtractor,
    timeout: Duration,
}

impl SessionAuthenticator {
    pub fn new(client: HttpClient, token_extractor: TokenExtractor, timeout: Duration) -> Self {
        Self {
            client,
            token_extractor,
            timeout,
        }
    }

    /// Load the login page, read its token and submit the credentials.
    ///
    /// Success is judged only by the presence of a token on the login page;
    /// the body of the login response is not inspected.
    pub async fn authenticate(
        &self,
        login_url: &str,
        username: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        info!("🔐 Authenticating against {}", login_url);

        let login_page = self
            .client
            .get_text(login_url, self.timeout)
            .await
            .map_err(|e| AuthError::Network {
                url: login_url.to_string(),
                message: describe_transport_error(&e),
            })?;

        let token = self
            .token_extractor
            .extract(&login_page)
            .map_err(|_| AuthError::MissingToken {
                url: login_url.to_string(),
            })?;
        debug!("Login page token found ({} chars)", token.len());

        let form = [
            (self.token_extractor.field_name(), token.as_str()),
            (USERNAME_FIELD, username),
            (PASSWORD_FIELD, password),
        ];
        self.client
            .post_form(login_url, &form, login_url, self.timeout)
            .await
            .map_err(|e| AuthError::Network {
                url: login_url.to_string(),
                message: describe_transport_error(&e),
            })?;

        if !self.client.has_cookies_for(login_url) {
            warn!("Login completed but no session cookie was set for {}", login_url);
        }
        info!("✅ Session established for user '{}'", username);

        Ok(Session {
            client: self.client.clone().with_context_label("session"),
            login_url: login_url.to_string(),
            authenticated_at: Utc::now(),
        })
    }
}

//! Parsing and fetch error types
//!
//! Token extraction and record parsing fail with small typed errors. The
//! session and fetch layers wrap them into [`AuthError`] (batch-fatal) and
//! [`FetchError`] (per-identifier, always recovered into a `FetchFailure`).

use thiserror::Error;

/// The anti-forgery token input was absent or had no value attribute
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Token field '{field}' not found in HTML")]
pub struct TokenNotFound {
    pub field: String,
}

impl TokenNotFound {
    pub fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("No '{marker}' section found")]
    SectionNotFound { marker: String },

    #[error("No data table found after '{marker}' header")]
    TableNotFound { marker: String },
}

impl ParseError {
    /// Stable classification used in failure reports
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::SectionNotFound { .. } => "SectionNotFound",
            Self::TableNotFound { .. } => "TableNotFound",
        }
    }
}

pub type ParsingResult<T> = Result<T, ParseError>;

/// Login handshake failures. Any of these aborts the batch before fetching.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing CSRF token on login page {url}")]
    MissingToken { url: String },

    #[error("Login request to {url} failed: {message}")]
    Network { url: String, message: String },
}

impl AuthError {
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::MissingToken { .. } => "MissingToken",
            Self::Network { .. } => "Network",
        }
    }
}

/// Failures of a single identifier's refresh-token, submit, parse sequence
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Missing CSRF token on query page {url}")]
    MissingToken { url: String },

    #[error("Request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error(transparent)]
    ParseFailed(#[from] ParseError),
}

impl FetchError {
    /// Stable classification used in failure reports
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::MissingToken { .. } => "MissingToken",
            Self::Network { .. } => "Network",
            Self::ParseFailed(e) => e.reason(),
        }
    }

    pub fn network(url: &str, error: &reqwest::Error) -> Self {
        Self::Network {
            url: url.to_string(),
            message: describe_transport_error(error),
        }
    }
}

/// Render a transport error, calling out timeouts explicitly
pub fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("timed out: {error}")
    } else {
        error.to_string()
    }
}

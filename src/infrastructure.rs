//! Infrastructure layer for HTTP transport, HTML parsing and external I/O
//!
//! Everything that touches the network, the filesystem or the process
//! environment lives here; the application layer only sees traits and
//! domain types.

pub mod config;
pub mod logging;
pub mod parsing;
pub mod parsing_error;
pub mod session;
pub mod simple_http_client;
pub mod tabular_io;
pub mod user_record_fetcher;

// Re-export commonly used items
pub use config::AppConfig;
pub use logging::{get_log_directory, init_logging_with_config};
pub use parsing::{ParsingConfig, TokenExtractor, UserRecordParser};
pub use parsing_error::{AuthError, FetchError, ParseError};
pub use session::{Session, SessionAuthenticator};
pub use simple_http_client::{HttpClient, HttpClientConfig};
pub use user_record_fetcher::{RecordFetcher, UserRecordFetcher};

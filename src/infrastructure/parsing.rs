//! HTML parsing for the query application's pages
//!
//! Token extraction and user properties parsing, both pure and synchronous.
//! Documents are parsed with `scraper`; a parsed [`Html`] is not `Send`, so
//! callers parse, extract owned values and drop the document before awaiting.

pub mod config;
pub mod context;
pub mod error;
pub mod token_extractor;
pub mod user_record_parser;

// Re-export public types
pub use config::ParsingConfig;
pub use context::RecordParseContext;
pub use error::{ParseError, ParsingResult, TokenNotFound};
pub use token_extractor::TokenExtractor;
pub use user_record_parser::UserRecordParser;

use scraper::Html;

/// Parser trait with context support
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse HTML with contextual information
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output>;

    /// Parse a raw document string
    fn parse_str(&self, html: &str, context: &Self::Context) -> ParsingResult<Self::Output> {
        let document = Html::parse_document(html);
        self.parse_with_context(&document, context)
    }
}

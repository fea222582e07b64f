//! Parsing error re-export

pub use crate::infrastructure::parsing_error::{ParseError, ParsingResult, TokenNotFound};

//! User properties page parser
//!
//! Layout contract of a query response:
//!
//! ```text
//! <p>... User properties ...</p>
//! <table>
//!   <tr><th>K1</th><th>K2</th>...</tr>   row 0: keys of block 1
//!   <tr><td>V1</td><td>V2</td>...</tr>   row 1: values of block 1
//!   <tr><th>K3</th>...</tr>              row 2: keys of block 2
//!   <tr><td>V3</td>...</tr>              row 3: values of block 2
//! </table>
//! ```
//!
//! Keys and values are zipped positionally; when a header row and its data
//! row differ in length the zip stops at the shorter one. Rows past row 3 are
//! ignored, as is a lone trailing header row.

use anyhow::{Result, anyhow};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::config::ParsingConfig;
use super::context::RecordParseContext;
use super::{ContextualParser, ParseError, ParsingResult};
use crate::domain::UserRecord;

/// Maximum number of key/value row pairs read from the table
const MAX_ROW_BLOCKS: usize = 2;

/// Parser turning a user properties page into a flat [`UserRecord`]
#[derive(Debug)]
pub struct UserRecordParser {
    marker_phrase: String,
    marker_selector: Selector,
    row_selector: Selector,
    header_cell_selector: Selector,
    data_cell_selector: Selector,
}

impl UserRecordParser {
    /// Create a parser with the default page layout
    pub fn new() -> Result<Self> {
        Self::with_config(&ParsingConfig::default())
    }

    /// Create parser with custom selector configuration
    pub fn with_config(config: &ParsingConfig) -> Result<Self> {
        Ok(Self {
            marker_phrase: config.marker_phrase.clone(),
            marker_selector: Self::compile_selector(&config.marker_selector)?,
            row_selector: Self::compile_selector(&config.row_selector)?,
            header_cell_selector: Self::compile_selector(&config.header_cell_selector)?,
            data_cell_selector: Self::compile_selector(&config.data_cell_selector)?,
        })
    }

    fn compile_selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector).map_err(|e| anyhow!("Invalid selector '{selector}': {e}"))
    }

    fn find_marker<'a>(&self, html: &'a Html) -> Option<ElementRef<'a>> {
        html.select(&self.marker_selector)
            .find(|element| element.text().collect::<String>().contains(&self.marker_phrase))
    }

    /// First following sibling element that is a table
    fn find_table_after<'a>(marker: &ElementRef<'a>) -> Option<ElementRef<'a>> {
        marker
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().name() == "table")
    }

    fn cell_texts(row: &ElementRef<'_>, selector: &Selector) -> Vec<String> {
        row.select(selector)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect()
    }
}

impl ContextualParser for UserRecordParser {
    type Output = UserRecord;
    type Context = RecordParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output> {
        let marker = self
            .find_marker(html)
            .ok_or_else(|| ParseError::SectionNotFound {
                marker: self.marker_phrase.clone(),
            })?;

        let table = Self::find_table_after(&marker).ok_or_else(|| ParseError::TableNotFound {
            marker: self.marker_phrase.clone(),
        })?;

        let rows: Vec<ElementRef<'_>> = table.select(&self.row_selector).collect();
        let mut record = UserRecord::new(context.identifier.clone());

        for block in rows.chunks_exact(2).take(MAX_ROW_BLOCKS) {
            let keys = Self::cell_texts(&block[0], &self.header_cell_selector);
            let values = Self::cell_texts(&block[1], &self.data_cell_selector);
            let merged = record.merge_zipped(keys, values);
            debug!(
                "Merged {} fields for {} from a {}-row table ({})",
                merged,
                context.identifier,
                rows.len(),
                context.source_url.as_deref().unwrap_or("inline")
            );
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QUERIED_USER_ID;
    use proptest::prelude::*;
    use rstest::rstest;

    fn page(body: &str) -> String {
        format!("<!DOCTYPE html><html><body>{body}</body></html>")
    }

    fn parse(body: &str, identifier: &str) -> ParsingResult<UserRecord> {
        let parser = UserRecordParser::new().unwrap();
        parser.parse_str(&page(body), &RecordParseContext::new(identifier))
    }

    const FOUR_ROW_TABLE: &str = r"
        <p>User properties</p>
        <table>
          <tr><th>Name</th><th>Email</th></tr>
          <tr><td> Alice </td><td>a@x.com</td></tr>
          <tr><th>Status</th><th>JoinDate</th></tr>
          <tr><td>Active</td><td>2020</td></tr>
        </table>";

    #[test]
    fn test_parses_both_blocks_of_a_four_row_table() {
        let record = parse(FOUR_ROW_TABLE, "A1").unwrap();

        let pairs: Vec<_> = record.iter().collect();
        assert_eq!(
            pairs,
            vec![
                (QUERIED_USER_ID, "A1"),
                ("Name", "Alice"),
                ("Email", "a@x.com"),
                ("Status", "Active"),
                ("JoinDate", "2020"),
            ]
        );
    }

    #[rstest]
    #[case::two_rows(2, &["Name"][..])]
    #[case::three_rows_ignores_lone_header(3, &["Name"][..])]
    #[case::four_rows(4, &["Name", "Status"][..])]
    #[case::extra_rows_ignored(6, &["Name", "Status"][..])]
    fn test_row_count_controls_blocks(#[case] row_count: usize, #[case] expected_keys: &[&str]) {
        let rows = [
            "<tr><th>Name</th></tr>",
            "<tr><td>Alice</td></tr>",
            "<tr><th>Status</th></tr>",
            "<tr><td>Active</td></tr>",
            "<tr><th>Extra</th></tr>",
            "<tr><td>Ignored</td></tr>",
        ];
        let body = format!(
            "<p>User properties</p><table>{}</table>",
            rows[..row_count].concat()
        );
        let record = parse(&body, "A1").unwrap();

        let keys: Vec<_> = record.keys().skip(1).collect();
        assert_eq!(keys, expected_keys);
    }

    #[test]
    fn test_single_row_table_yields_identifier_only() {
        let record = parse(
            "<p>User properties</p><table><tr><th>Name</th></tr></table>",
            "A1",
        )
        .unwrap();
        assert_eq!(record.len(), 1);
        assert_eq!(record.get(QUERIED_USER_ID), Some("A1"));
    }

    #[test]
    fn test_missing_marker_is_section_not_found() {
        let err = parse("<p>Nothing here</p><table></table>", "A2").unwrap_err();
        assert_eq!(err.reason(), "SectionNotFound");
    }

    #[test]
    fn test_marker_without_following_table_is_table_not_found() {
        let err = parse(
            "<table><tr><th>K</th></tr></table><p>User properties</p><div>no table</div>",
            "A2",
        )
        .unwrap_err();
        assert_eq!(err.reason(), "TableNotFound");
    }

    #[test]
    fn test_marker_matches_on_contained_phrase() {
        let body = "<p>Below are the <b>User properties</b> for this account</p>\
                    <span>spacer</span>\
                    <table><tr><th>Name</th></tr><tr><td>Alice</td></tr></table>";
        let record = parse(body, "A1").unwrap();
        assert_eq!(record.get("Name"), Some("Alice"));
    }

    #[test]
    fn test_table_field_named_queried_user_id_cannot_clobber_identifier() {
        let body = "<p>User properties</p><table>\
                    <tr><th>queried_user_id</th><th>Name</th></tr>\
                    <tr><td>someone-else</td><td>Alice</td></tr></table>";
        let record = parse(body, "A1").unwrap();
        assert_eq!(record.get(QUERIED_USER_ID), Some("A1"));
        assert_eq!(record.get("Name"), Some("Alice"));
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let config = ParsingConfig {
            row_selector: "tr[".to_string(),
            ..ParsingConfig::default()
        };
        assert!(UserRecordParser::with_config(&config).is_err());
    }

    proptest! {
        #[test]
        fn prop_zip_truncates_to_shorter_row(key_count in 0usize..8, value_count in 0usize..8) {
            let headers: String = (0..key_count).map(|i| format!("<th>k{i}</th>")).collect();
            let cells: String = (0..value_count).map(|i| format!("<td>v{i}</td>")).collect();
            let body = format!(
                "<p>User properties</p><table><tr>{headers}</tr><tr>{cells}</tr></table>"
            );

            let record = parse(&body, "id").unwrap();

            prop_assert_eq!(record.parsed_field_count(), key_count.min(value_count));
            prop_assert_eq!(record.get(QUERIED_USER_ID), Some("id"));
        }
    }
}

//! Anti-forgery token extraction
//!
//! Finds the form input whose `name` matches the configured field and returns
//! its `value`. The server may rotate the token on every page view, so the
//! value is only good for a submission from the page it was read from.

use scraper::{ElementRef, Html};

use super::error::TokenNotFound;

/// Pulls a named form-input value out of an HTML document
#[derive(Debug, Clone)]
pub struct TokenExtractor {
    field_name: String,
}

impl TokenExtractor {
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Extract the token from a raw document string
    pub fn extract(&self, html: &str) -> Result<String, TokenNotFound> {
        let document = Html::parse_document(html);
        self.extract_from_document(&document)
    }

    /// Extract the token from an already parsed document.
    ///
    /// The first `<input>` carrying the field name wins. If that element has
    /// no `value` attribute the token is considered missing.
    pub fn extract_from_document(&self, document: &Html) -> Result<String, TokenNotFound> {
        document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|element| {
                element.value().name() == "input"
                    && element.value().attr("name") == Some(self.field_name.as_str())
            })
            .and_then(|input| input.value().attr("value"))
            .map(str::to_string)
            .ok_or_else(|| TokenNotFound::new(&self.field_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::parsing::config::CSRF_FIELD;
    use rstest::rstest;

    #[rstest]
    #[case::hidden_input(
        r#"<form><input type="hidden" name="csrfmiddlewaretoken" value="tok123"></form>"#,
        "tok123"
    )]
    #[case::first_match_wins(
        r#"<input name="csrfmiddlewaretoken" value="first"><input name="csrfmiddlewaretoken" value="second">"#,
        "first"
    )]
    #[case::empty_value_is_still_a_value(r#"<input name="csrfmiddlewaretoken" value="">"#, "")]
    #[case::among_other_inputs(
        r#"<input name="username" value="bob"><input name="csrfmiddlewaretoken" value="abc"><input name="password">"#,
        "abc"
    )]
    fn test_extracts_token(#[case] html: &str, #[case] expected: &str) {
        let extractor = TokenExtractor::new(CSRF_FIELD);
        assert_eq!(extractor.extract(html).unwrap(), expected);
    }

    #[rstest]
    #[case::no_inputs("<html><body><p>Login</p></body></html>")]
    #[case::other_field_only(r#"<input name="username" value="bob">"#)]
    #[case::no_value_attribute(r#"<input type="hidden" name="csrfmiddlewaretoken">"#)]
    #[case::name_on_non_input(r#"<meta name="csrfmiddlewaretoken" value="nope">"#)]
    fn test_missing_token(#[case] html: &str) {
        let extractor = TokenExtractor::new(CSRF_FIELD);
        let err = extractor.extract(html).unwrap_err();
        assert_eq!(err, TokenNotFound::new(CSRF_FIELD));
    }

    #[test]
    fn test_custom_field_name() {
        let extractor = TokenExtractor::new("authenticity_token");
        let html = r#"<input name="authenticity_token" value="rails">"#;
        assert_eq!(extractor.extract(html).unwrap(), "rails");
        assert_eq!(extractor.field_name(), "authenticity_token");
    }
}

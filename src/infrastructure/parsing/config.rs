//! Parsing configuration for HTML extraction
//!
//! Names the form fields and page markers the target application uses.

use serde::{Deserialize, Serialize};

/// Form field carrying the anti-forgery token on every form page
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";

/// Form field carrying the identifier on the query page
pub const USER_ID_FIELD: &str = "user_id";

/// Login form credential fields
pub const USERNAME_FIELD: &str = "username";
pub const PASSWORD_FIELD: &str = "password";

/// Phrase marking the paragraph that precedes the properties table
pub const USER_PROPERTIES_MARKER: &str = "User properties";

/// Main parsing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Name attribute of the anti-forgery token input
    pub token_field: String,

    /// Literal phrase searched for in marker paragraphs
    pub marker_phrase: String,

    /// Element holding the marker phrase
    pub marker_selector: String,

    /// Table rows, header cells and data cells
    pub row_selector: String,
    pub header_cell_selector: String,
    pub data_cell_selector: String,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            token_field: CSRF_FIELD.to_string(),
            marker_phrase: USER_PROPERTIES_MARKER.to_string(),
            marker_selector: "p".to_string(),
            row_selector: "tr".to_string(),
            header_cell_selector: "th".to_string(),
            data_cell_selector: "td".to_string(),
        }
    }
}

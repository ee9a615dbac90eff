//! Tooltip payload carried from the DOT description to the HTML page.
//!
//! The emitter attaches each relationship's tooltip to its edge as a
//! `data:text/html,` URI. Graphviz copies the URI into the SVG unchanged and
//! the page script decodes it with `decodeURIComponent`, so both ends must
//! agree on the percent-encoding set: everything except the RFC 3986
//! unreserved characters is escaped.

use crate::graph::dot::escape_html;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;

/// Prefix of every tooltip link
pub const DATA_URI_PREFIX: &str = "data:text/html,";

/// Characters escaped in the URI payload (unreserved set left as-is)
const PAYLOAD_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// HTML fragment shown when hovering a relationship edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipPayload {
    fragment: String,
}

impl TooltipPayload {
    /// Cardinality sentence for an edge from `parent_table` to `referenced_table`
    pub fn for_relationship(parent_table: &str, referenced_table: &str) -> Self {
        Self {
            fragment: format!(
                "<b>each <b>{}</b> may have multiple <b>{}</b></b>",
                escape_html(parent_table),
                escape_html(referenced_table)
            ),
        }
    }

    /// Recover a payload from a `data:text/html,` URI.
    ///
    /// Returns `None` when the prefix is missing or the decoded bytes are not UTF-8.
    pub fn from_data_uri(uri: &str) -> Option<Self> {
        let encoded = uri.strip_prefix(DATA_URI_PREFIX)?;
        let fragment = percent_decode_str(encoded).decode_utf8().ok()?;
        Some(Self {
            fragment: fragment.into_owned(),
        })
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn into_fragment(self) -> String {
        self.fragment
    }

    /// Encode as a `data:text/html,` URI
    pub fn to_data_uri(&self) -> String {
        format!(
            "{}{}",
            DATA_URI_PREFIX,
            utf8_percent_encode(&self.fragment, PAYLOAD_ENCODE_SET)
        )
    }
}

impl fmt::Display for TooltipPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fragment)
    }
}

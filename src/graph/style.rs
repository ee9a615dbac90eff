//! Visual encoding used by the DOT emitter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Layout direction for the diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Left to right
    LR,
    /// Top to bottom
    TB,
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lr" | "left-right" | "horizontal" => Ok(Layout::LR),
            "tb" | "td" | "top-bottom" | "top-down" | "vertical" => Ok(Layout::TB),
            _ => Err(format!("Unknown layout: {}. Valid options: lr, tb", s)),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::LR => write!(f, "lr"),
            Layout::TB => write!(f, "tb"),
        }
    }
}

impl Layout {
    /// Value of the Graphviz `rankdir` attribute
    pub fn rankdir(&self) -> &'static str {
        match self {
            Layout::LR => "LR",
            Layout::TB => "TB",
        }
    }
}

/// Colors, fonts and edge attributes of the generated diagram.
///
/// The defaults produce the classic look: navy table headers, pale key
/// cells and thick light-blue edges ending in a filled dot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramStyle {
    /// Name of the `digraph` block
    pub graph_name: String,
    /// Node font
    pub font: String,
    /// Optional `rankdir`; Graphviz picks top-to-bottom when unset
    pub layout: Option<Layout>,
    pub table_background: String,
    pub cell_padding: u32,
    pub header_background: String,
    pub header_text: String,
    pub key_background: String,
    pub key_text: String,
    pub edge_color: String,
    pub edge_penwidth: f64,
    pub arrowhead: String,
    pub arrowsize: f64,
    pub edge_style: String,
}

impl Default for DiagramStyle {
    fn default() -> Self {
        Self {
            graph_name: "schema".to_string(),
            font: "Segoe UI".to_string(),
            layout: None,
            table_background: "#ffffff".to_string(),
            cell_padding: 10,
            header_background: "#1f497d".to_string(),
            header_text: "white".to_string(),
            key_background: "#ffffef".to_string(),
            key_text: "#1f497d".to_string(),
            edge_color: "#b9cde5".to_string(),
            edge_penwidth: 2.5,
            arrowhead: "dot".to_string(),
            arrowsize: 1.5,
            edge_style: "solid".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_parse() {
        assert_eq!("LR".parse::<Layout>().unwrap(), Layout::LR);
        assert_eq!("top-down".parse::<Layout>().unwrap(), Layout::TB);
        assert!("diagonal".parse::<Layout>().is_err());
    }

    #[test]
    fn test_layout_roundtrips_through_display() {
        for layout in [Layout::LR, Layout::TB] {
            assert_eq!(layout.to_string().parse::<Layout>().unwrap(), layout);
        }
    }
}

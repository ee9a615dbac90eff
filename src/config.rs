//! YAML configuration for diagram styling, the page and the Graphviz binary.
//!
//! Every field is optional; an empty file yields the default look.
//!
//! ```yaml
//! style:
//!   layout: lr
//!   header_background: "#274e13"
//! page:
//!   title: Warehouse
//! graphviz:
//!   program: /opt/graphviz/bin/dot
//! ```

use crate::compose::PageOptions;
use crate::error::{Error, Result};
use crate::graph::DiagramStyle;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Graphviz invocation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphvizConfig {
    /// Binary name or path
    pub program: PathBuf,
    /// Extra arguments passed before the output format
    pub args: Vec<String>,
}

impl Default for GraphvizConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("dot"),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    pub style: DiagramStyle,
    pub page: PageOptions,
    pub graphviz: GraphvizConfig,
}

impl DiagramConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(content)?)
    }
}

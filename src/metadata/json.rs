//! JSON document holding the key relations directly.
//!
//! ```json
//! {
//!   "primary_keys": [{"table": "Orders", "column": "OrderID"}],
//!   "foreign_keys": [{"parent_table": "Orders", "parent_column": "CustomerID",
//!                     "referenced_table": "Customers", "referenced_column": "CustomerID"}]
//! }
//! ```
//!
//! This is the same shape the `facts` command prints, so the output of one run
//! can be edited and fed back in.

use super::reader::open_input;
use super::{MetadataSource, SchemaFacts};
use crate::error::Result;
use std::path::PathBuf;

pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MetadataSource for JsonSource {
    fn describe(&self) -> String {
        format!("JSON facts {}", self.path.display())
    }

    fn load(&self) -> Result<SchemaFacts> {
        let reader = open_input(&self.path, None)?;
        Ok(serde_json::from_reader(reader)?)
    }
}

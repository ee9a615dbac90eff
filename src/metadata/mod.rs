//! Schema metadata sources.
//!
//! Every source produces the same two relations:
//! - primary keys as `(table, column)` rows, ordered by table then key position
//! - foreign keys as `(parent table, parent column, referenced table, referenced column)`
//!   rows, one per column pair, in source order
//!
//! Sources:
//! - SQL dumps (optionally compressed), parsed from CREATE/ALTER TABLE statements
//! - DuckDB database files, read from the constraint catalog
//! - JSON documents holding the two relations directly

pub mod ddl;
mod duckdb;
mod json;
pub mod reader;

pub use self::duckdb::DuckDbSource;
pub use ddl::SqlDumpSource;
pub use json::JsonSource;
pub use reader::Compression;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// One column of a table's primary key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkRow {
    pub table: String,
    pub column: String,
}

impl PkRow {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// One column pair of a foreign key constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FkRow {
    pub parent_table: String,
    pub parent_column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

impl FkRow {
    pub fn new(
        parent_table: impl Into<String>,
        parent_column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        Self {
            parent_table: parent_table.into(),
            parent_column: parent_column.into(),
            referenced_table: referenced_table.into(),
            referenced_column: referenced_column.into(),
        }
    }
}

/// The two key relations read from a metadata source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaFacts {
    pub primary_keys: Vec<PkRow>,
    pub foreign_keys: Vec<FkRow>,
}

impl SchemaFacts {
    pub fn is_empty(&self) -> bool {
        self.primary_keys.is_empty() && self.foreign_keys.is_empty()
    }
}

/// Anything that can supply primary-key and foreign-key facts
pub trait MetadataSource {
    /// Human-readable description for diagnostics
    fn describe(&self) -> String;

    /// Read both relations
    fn load(&self) -> Result<SchemaFacts>;
}

/// Kind of metadata source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// SQL dump with CREATE TABLE / ALTER TABLE statements
    Sql,
    /// DuckDB database file
    DuckDb,
    /// JSON document with `primary_keys` and `foreign_keys`
    Json,
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sql" | "ddl" | "dump" => Ok(SourceKind::Sql),
            "duckdb" | "duck" => Ok(SourceKind::DuckDb),
            "json" => Ok(SourceKind::Json),
            _ => Err(format!(
                "Unknown source: {}. Valid options: sql, duckdb, json",
                s
            )),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Sql => write!(f, "sql"),
            SourceKind::DuckDb => write!(f, "duckdb"),
            SourceKind::Json => write!(f, "json"),
        }
    }
}

impl SourceKind {
    /// Detect the source kind from a file name, looking through compression suffixes.
    ///
    /// Unknown extensions are treated as SQL dumps.
    pub fn from_path(path: &Path) -> Self {
        let stem_path;
        let path = if Compression::from_path(path) != Compression::None {
            stem_path = path.with_extension("");
            stem_path.as_path()
        } else {
            path
        };

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("duckdb" | "ddb" | "db") => SourceKind::DuckDb,
            Some("json") => SourceKind::Json,
            _ => SourceKind::Sql,
        }
    }
}

/// Open a metadata source for `path`, detecting the kind when not given
pub fn open_source(path: &Path, kind: Option<SourceKind>) -> Box<dyn MetadataSource> {
    match kind.unwrap_or_else(|| SourceKind::from_path(path)) {
        SourceKind::Sql => Box::new(SqlDumpSource::new(path)),
        SourceKind::DuckDb => Box::new(DuckDbSource::new(path)),
        SourceKind::Json => Box::new(JsonSource::new(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_from_path() {
        assert_eq!(SourceKind::from_path(Path::new("dump.sql")), SourceKind::Sql);
        assert_eq!(SourceKind::from_path(Path::new("dump.sql.gz")), SourceKind::Sql);
        assert_eq!(
            SourceKind::from_path(Path::new("warehouse.duckdb")),
            SourceKind::DuckDb
        );
        assert_eq!(SourceKind::from_path(Path::new("keys.json")), SourceKind::Json);
        assert_eq!(SourceKind::from_path(Path::new("keys.json.zst")), SourceKind::Json);
        assert_eq!(SourceKind::from_path(Path::new("schema")), SourceKind::Sql);
    }

    #[test]
    fn test_source_kind_parse() {
        assert_eq!("DuckDB".parse::<SourceKind>().unwrap(), SourceKind::DuckDb);
        assert_eq!("ddl".parse::<SourceKind>().unwrap(), SourceKind::Sql);
        assert!("oracle".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_facts_json_shape() {
        let facts = SchemaFacts {
            primary_keys: vec![PkRow::new("Orders", "OrderID")],
            foreign_keys: vec![FkRow::new("Orders", "CustomerID", "Customers", "CustomerID")],
        };
        let json = serde_json::to_value(&facts).unwrap();
        assert_eq!(json["primary_keys"][0]["table"], "Orders");
        assert_eq!(json["foreign_keys"][0]["referenced_table"], "Customers");
    }
}

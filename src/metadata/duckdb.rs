//! DuckDB database files, read through the `duckdb_constraints()` catalog function.

use super::{FkRow, MetadataSource, PkRow, SchemaFacts};
use crate::error::{Error, Result};
use duckdb::{AccessMode, Config, Connection};
use std::path::PathBuf;

const PRIMARY_KEY_QUERY: &str = "
SELECT table_name, column_name FROM (
    SELECT table_name,
           UNNEST(constraint_column_names) AS column_name,
           UNNEST(range(len(constraint_column_names))) AS ordinal
    FROM duckdb_constraints()
    WHERE constraint_type = 'PRIMARY KEY'
)
ORDER BY table_name, ordinal";

const FOREIGN_KEY_QUERY: &str = "
SELECT table_name, column_name, referenced_table, referenced_column FROM (
    SELECT table_name,
           constraint_index,
           UNNEST(constraint_column_names) AS column_name,
           referenced_table,
           UNNEST(referenced_column_names) AS referenced_column,
           UNNEST(range(len(constraint_column_names))) AS ordinal
    FROM duckdb_constraints()
    WHERE constraint_type = 'FOREIGN KEY'
)
ORDER BY table_name, constraint_index, ordinal";

pub struct DuckDbSource {
    path: PathBuf,
}

impl DuckDbSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn open(&self) -> Result<Connection> {
        // Opening a missing path would silently create an empty database
        if !self.path.exists() {
            return Err(Error::MetadataUnavailable(format!(
                "database file does not exist: {}",
                self.path.display()
            )));
        }
        let config = Config::default().access_mode(AccessMode::ReadOnly)?;
        Ok(Connection::open_with_flags(&self.path, config)?)
    }
}

impl MetadataSource for DuckDbSource {
    fn describe(&self) -> String {
        format!("DuckDB database {}", self.path.display())
    }

    fn load(&self) -> Result<SchemaFacts> {
        let conn = self.open()?;
        read_constraints(&conn)
    }
}

/// Read primary and foreign keys from an open connection
pub fn read_constraints(conn: &Connection) -> Result<SchemaFacts> {
    let mut stmt = conn.prepare(PRIMARY_KEY_QUERY)?;
    let primary_keys = stmt
        .query_map([], |row| Ok(PkRow::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(FOREIGN_KEY_QUERY)?;
    let foreign_keys = stmt
        .query_map([], |row| {
            Ok(FkRow::new(
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SchemaFacts {
        primary_keys,
        foreign_keys,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_database(path: &std::path::Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE customers (id INTEGER PRIMARY KEY, name VARCHAR);
             CREATE TABLE order_lines (order_id INTEGER, line_no INTEGER, PRIMARY KEY (order_id, line_no));
             CREATE TABLE orders (
                 id INTEGER PRIMARY KEY,
                 customer_id INTEGER,
                 FOREIGN KEY (customer_id) REFERENCES customers(id)
             );
             CREATE TABLE order_line_notes (
                 order_id INTEGER,
                 line_no INTEGER,
                 note VARCHAR,
                 FOREIGN KEY (order_id, line_no) REFERENCES order_lines(order_id, line_no)
             );",
        )
        .unwrap();
    }

    #[test]
    fn test_reads_primary_keys_in_key_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shop.duckdb");
        create_database(&path);

        let facts = DuckDbSource::new(&path).load().unwrap();

        assert_eq!(
            facts.primary_keys,
            vec![
                PkRow::new("customers", "id"),
                PkRow::new("order_lines", "order_id"),
                PkRow::new("order_lines", "line_no"),
                PkRow::new("orders", "id"),
            ]
        );
    }

    #[test]
    fn test_reads_foreign_keys_pairwise() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shop.duckdb");
        create_database(&path);

        let facts = DuckDbSource::new(&path).load().unwrap();

        // One row per column pair, none for the referenced side
        assert_eq!(
            facts.foreign_keys,
            vec![
                FkRow::new("order_line_notes", "order_id", "order_lines", "order_id"),
                FkRow::new("order_line_notes", "line_no", "order_lines", "line_no"),
                FkRow::new("orders", "customer_id", "customers", "id"),
            ]
        );
    }

    #[test]
    fn test_missing_database_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.duckdb");

        let result = DuckDbSource::new(&path).load();

        assert!(matches!(result, Err(Error::MetadataUnavailable(_))));
        assert!(!path.exists());
    }
}

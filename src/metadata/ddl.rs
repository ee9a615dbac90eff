//! Key extraction from SQL dumps.
//!
//! Parses CREATE TABLE and ALTER TABLE statements to extract:
//! - Primary keys (table constraint, inline column constraint, ALTER TABLE ADD)
//! - Foreign keys (table constraint, inline REFERENCES, ALTER TABLE ADD)
//!
//! Works across MySQL, PostgreSQL, SQLite and MSSQL quoting styles.

use super::reader::{open_input, StatementReader};
use super::{FkRow, MetadataSource, PkRow, SchemaFacts};
use crate::error::{Error, Result};
use ahash::AHashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Regex to extract table name from CREATE TABLE
/// Supports: `table` (MySQL), "table" (PostgreSQL), [table] (MSSQL), table (SQLite/unquoted), schema.table
static CREATE_TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^\s*CREATE\s+(?:(?:GLOBAL|LOCAL)\s+)?(?:TEMP(?:ORARY)?\s+|UNLOGGED\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s(]+)[\]`"]?"#)
        .unwrap()
});

/// Regex to extract table name from ALTER TABLE
static ALTER_TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^\s*ALTER\s+TABLE\s+(?:IF\s+EXISTS\s+)?(?:ONLY\s+)?(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s]+)[\]`"]?"#).unwrap()
});

/// Regex for the leading column name of a column definition
static COLUMN_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*[\[`"]?([^\[\]`"\s,]+)[\]`"]?\s+\S"#).unwrap());

/// Regex for PRIMARY KEY constraint
/// Supports MSSQL CLUSTERED/NONCLUSTERED keywords: PRIMARY KEY CLUSTERED ([col])
static PRIMARY_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)PRIMARY\s+KEY\s*(?:CLUSTERED\s+|NONCLUSTERED\s+)?\(([^)]+)\)").unwrap()
});

/// Regex for inline PRIMARY KEY on column
static INLINE_PRIMARY_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bPRIMARY\s+KEY\b").unwrap());

/// Regex for FOREIGN KEY constraint with optional constraint name
static FOREIGN_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(?:CONSTRAINT\s+[\[`"]?([^\[\]`"\s]+)[\]`"]?\s+)?FOREIGN\s+KEY\s*\(([^)]+)\)\s*REFERENCES\s+(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s(]+)[\]`"]?\s*\(([^)]+)\)"#,
    )
    .unwrap()
});

/// Regex for an inline column REFERENCES clause, column list optional
static INLINE_REFERENCES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\bREFERENCES\s+(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s(,]+)[\]`"]?\s*(?:\(([^)]+)\))?"#,
    )
    .unwrap()
});

/// Table-level clauses that are not column definitions
static TABLE_CONSTRAINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:PRIMARY\s+KEY|FOREIGN\s+KEY|CONSTRAINT|KEY|INDEX|UNIQUE|FULLTEXT|SPATIAL|CHECK)\b",
    )
    .unwrap()
});

/// Metadata source backed by a SQL dump file
pub struct SqlDumpSource {
    path: PathBuf,
    progress: Option<Box<dyn Fn(u64)>>,
}

impl SqlDumpSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            progress: None,
        }
    }

    /// Report raw bytes read from the file while parsing
    pub fn with_progress<F: Fn(u64) + 'static>(mut self, f: F) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MetadataSource for SqlDumpSource {
    fn describe(&self) -> String {
        format!("SQL dump {}", self.path.display())
    }

    fn load(&self) -> Result<SchemaFacts> {
        let reader = open_input(&self.path, self.progress.as_deref())?;
        parse_dump(reader).map_err(|e| Error::io(&self.path, e))
    }
}

/// Parse every CREATE TABLE / ALTER TABLE statement of a dump
pub fn parse_dump<R: Read>(reader: R) -> std::io::Result<SchemaFacts> {
    let mut statements = StatementReader::new(reader);
    let mut collector = KeyCollector::default();

    while let Some(stmt) = statements.read_statement()? {
        collector.add_statement(&stmt);
    }

    Ok(collector.finish())
}

/// Parse DDL held in memory
pub fn parse_sql(sql: &str) -> SchemaFacts {
    // Reading from a byte slice cannot fail
    parse_dump(sql.as_bytes()).unwrap_or_default()
}

#[derive(Debug, Default)]
struct TableKeys {
    name: String,
    primary_key: Vec<String>,
}

/// Inline REFERENCES without a column list; resolved against the
/// referenced table's primary key once the whole dump has been read
#[derive(Debug)]
struct PendingFk {
    row: FkRow,
    needs_referenced_column: bool,
}

/// Accumulates keys across statements
#[derive(Debug, Default)]
struct KeyCollector {
    tables: Vec<TableKeys>,
    /// Lower-cased table name -> index into `tables`
    index: AHashMap<String, usize>,
    foreign_keys: Vec<PendingFk>,
}

impl KeyCollector {
    fn add_statement(&mut self, stmt: &str) {
        if let Some(name) = capture_name(&CREATE_TABLE_NAME_RE, stmt) {
            self.add_create_table(name, stmt);
        } else if let Some(name) = capture_name(&ALTER_TABLE_NAME_RE, stmt) {
            self.add_alter_table(name, stmt);
        }
    }

    fn add_create_table(&mut self, name: String, stmt: &str) {
        // First definition wins
        if self.index.contains_key(&name.to_lowercase()) {
            return;
        }
        let table = self.table_index(&name);

        let Some(body) = extract_table_body(stmt) else {
            return;
        };

        for part in split_table_body(&body) {
            if TABLE_CONSTRAINT_RE.is_match(&part) {
                if let Some(columns) = parse_primary_key_constraint(&part) {
                    self.add_primary_key(table, columns);
                }
                for row in parse_foreign_keys(&name, &part) {
                    self.foreign_keys.push(PendingFk {
                        row,
                        needs_referenced_column: false,
                    });
                }
            } else if let Some(column) = capture_name(&COLUMN_NAME_RE, &part) {
                if INLINE_PRIMARY_KEY_RE.is_match(&part) {
                    self.add_primary_key(table, vec![column.clone()]);
                }
                if let Some(caps) = INLINE_REFERENCES_RE.captures(&part) {
                    let referenced_table = caps[1].to_string();
                    let referenced_column = caps
                        .get(2)
                        .and_then(|m| parse_column_list(m.as_str()).into_iter().next());
                    self.foreign_keys.push(PendingFk {
                        needs_referenced_column: referenced_column.is_none(),
                        row: FkRow::new(
                            name.clone(),
                            column,
                            referenced_table,
                            referenced_column.unwrap_or_default(),
                        ),
                    });
                }
            }
        }
    }

    fn add_alter_table(&mut self, name: String, stmt: &str) {
        let table = self.table_index(&name);
        let table_name = self.tables[table].name.clone();

        if let Some(columns) = parse_primary_key_constraint(stmt) {
            self.add_primary_key(table, columns);
        }
        for row in parse_foreign_keys(&table_name, stmt) {
            self.foreign_keys.push(PendingFk {
                row,
                needs_referenced_column: false,
            });
        }
    }

    fn table_index(&mut self, name: &str) -> usize {
        let key = name.to_lowercase();
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let idx = self.tables.len();
        self.tables.push(TableKeys {
            name: name.to_string(),
            primary_key: Vec::new(),
        });
        self.index.insert(key, idx);
        idx
    }

    fn add_primary_key(&mut self, table: usize, columns: Vec<String>) {
        let pk = &mut self.tables[table].primary_key;
        for column in columns {
            if !pk.iter().any(|c| c.eq_ignore_ascii_case(&column)) {
                pk.push(column);
            }
        }
    }

    fn finish(self) -> SchemaFacts {
        let KeyCollector {
            mut tables,
            index,
            foreign_keys,
        } = self;

        let foreign_keys = foreign_keys
            .into_iter()
            .map(|pending| {
                let mut row = pending.row;
                if pending.needs_referenced_column {
                    row.referenced_column = index
                        .get(&row.referenced_table.to_lowercase())
                        .and_then(|&i| tables[i].primary_key.first().cloned())
                        .unwrap_or_else(|| "id".to_string());
                }
                row
            })
            .collect();

        // Primary keys are reported ordered by table, then key position
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        let primary_keys = tables
            .into_iter()
            .flat_map(|t| {
                let name = t.name;
                t.primary_key
                    .into_iter()
                    .map(move |column| PkRow::new(name.clone(), column))
            })
            .collect();

        SchemaFacts {
            primary_keys,
            foreign_keys,
        }
    }
}

fn capture_name(re: &Regex, s: &str) -> Option<String> {
    re.captures(s)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract the body of a CREATE TABLE statement (between first ( and matching ))
fn extract_table_body(stmt: &str) -> Option<String> {
    let bytes = stmt.as_bytes();
    let mut depth = 0;
    let mut start = None;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, &b) in bytes.iter().enumerate() {
        if escape_next {
            escape_next = false;
            continue;
        }

        if b == b'\\' && in_string {
            escape_next = true;
            continue;
        }

        if b == b'\'' {
            in_string = !in_string;
            continue;
        }

        if in_string {
            continue;
        }

        if b == b'(' {
            if depth == 0 {
                start = Some(i + 1);
            }
            depth += 1;
        } else if b == b')' {
            depth -= 1;
            if depth == 0 {
                if let Some(s) = start {
                    return Some(stmt[s..i].to_string());
                }
            }
        }
    }

    None
}

/// Split table body by commas, respecting nested parentheses and strings
fn split_table_body(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for ch in body.chars() {
        if escape_next {
            current.push(ch);
            escape_next = false;
            continue;
        }

        if ch == '\\' && in_string {
            current.push(ch);
            escape_next = true;
            continue;
        }

        if ch == '\'' {
            in_string = !in_string;
            current.push(ch);
            continue;
        }

        if in_string {
            current.push(ch);
            continue;
        }

        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                let part = current.trim();
                if !part.is_empty() {
                    parts.push(part.to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }

    parts
}

/// Parse PRIMARY KEY constraint, returns column names
fn parse_primary_key_constraint(constraint: &str) -> Option<Vec<String>> {
    let caps = PRIMARY_KEY_RE.captures(constraint)?;
    Some(parse_column_list(caps.get(1)?.as_str()))
}

/// Parse FOREIGN KEY constraints, one row per column pair
fn parse_foreign_keys(table: &str, stmt: &str) -> Vec<FkRow> {
    let mut rows = Vec::new();

    for caps in FOREIGN_KEY_RE.captures_iter(stmt) {
        let local_cols = caps
            .get(2)
            .map(|m| parse_column_list(m.as_str()))
            .unwrap_or_default();
        let ref_table = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
        let ref_cols = caps
            .get(4)
            .map(|m| parse_column_list(m.as_str()))
            .unwrap_or_default();

        if ref_table.is_empty() {
            continue;
        }

        for (local, referenced) in local_cols.into_iter().zip(ref_cols) {
            rows.push(FkRow::new(table, local, ref_table, referenced));
        }
    }

    rows
}

/// Parse a comma-separated column list, stripping quotes (backticks, double quotes, brackets)
/// and any trailing sort order
pub fn parse_column_list(s: &str) -> Vec<String> {
    s.split(',')
        .filter_map(|c| c.split_whitespace().next())
        .map(|c| {
            c.trim_matches('`')
                .trim_matches('"')
                .trim_matches('[')
                .trim_matches(']')
                .to_string()
        })
        .filter(|c| !c.is_empty())
        .collect()
}

//! In-memory schema graph: tables keyed by name plus FK relationships.

use crate::metadata::{FkRow, PkRow};
use ahash::AHashSet;
use glob::Pattern;
use indexmap::IndexMap;

/// A table in the diagram together with its primary-key columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNode {
    /// Table name
    pub name: String,
    /// Primary key columns in key order (empty when the table has no PK)
    pub key_columns: Vec<String>,
}

/// A foreign-key relationship, one per referencing column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Table holding the FK column
    pub parent_table: String,
    /// Table being referenced
    pub referenced_table: String,
    /// FK column on the parent table
    pub parent_column: String,
    /// Referenced column (usually part of the PK)
    pub referenced_column: String,
}

impl From<FkRow> for Relationship {
    fn from(row: FkRow) -> Self {
        Self {
            parent_table: row.parent_table,
            referenced_table: row.referenced_table,
            parent_column: row.parent_column,
            referenced_column: row.referenced_column,
        }
    }
}

/// Graph model consumed by the DOT emitter.
///
/// Tables keep the order in which they were first seen so that emission is
/// reproducible. Edges are never merged: two FK columns between the same
/// pair of tables yield two relationships.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaGraph {
    pub tables: IndexMap<String, TableNode>,
    pub edges: Vec<Relationship>,
}

impl SchemaGraph {
    /// Build the graph from the primary-key and foreign-key relations.
    ///
    /// Nothing is validated: an edge may name a table that has no node.
    pub fn build<P, F>(pk_rows: P, fk_rows: F) -> Self
    where
        P: IntoIterator<Item = PkRow>,
        F: IntoIterator<Item = FkRow>,
    {
        let mut tables: IndexMap<String, TableNode> = IndexMap::new();

        for row in pk_rows {
            tables
                .entry(row.table.clone())
                .or_insert_with(|| TableNode {
                    name: row.table,
                    key_columns: Vec::new(),
                })
                .key_columns
                .push(row.column);
        }

        let edges = fk_rows.into_iter().map(Relationship::from).collect();

        Self { tables, edges }
    }

    /// Tables referenced by an edge that have no node, in first-mention order
    pub fn dangling_tables(&self) -> Vec<&str> {
        let mut seen = AHashSet::new();
        let mut dangling = Vec::new();

        for edge in &self.edges {
            for name in [edge.parent_table.as_str(), edge.referenced_table.as_str()] {
                if !self.tables.contains_key(name) && seen.insert(name) {
                    dangling.push(name);
                }
            }
        }

        dangling
    }

    /// Keep only tables matching any of the given patterns
    pub fn filter_tables(&mut self, patterns: &[Pattern]) {
        if patterns.is_empty() {
            return;
        }
        self.retain_by_name(|name| patterns.iter().any(|p| p.matches(name)));
    }

    /// Drop tables matching any of the given patterns
    pub fn exclude_tables(&mut self, patterns: &[Pattern]) {
        if patterns.is_empty() {
            return;
        }
        self.retain_by_name(|name| !patterns.iter().any(|p| p.matches(name)));
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.edges.is_empty()
    }

    pub fn get_table(&self, name: &str) -> Option<&TableNode> {
        self.tables.get(name)
    }

    fn retain_by_name<F: Fn(&str) -> bool>(&mut self, keep: F) {
        // IndexMap::retain keeps the survivors in insertion order
        self.tables.retain(|name, _| keep(name));
        self.edges
            .retain(|e| keep(&e.parent_table) && keep(&e.referenced_table));
    }
}

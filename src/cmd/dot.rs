//! Dot command: emit the Graphviz description without rendering it.

use super::source::{load_config, load_facts, parse_patterns, resolve_kind};
use crate::graph::{to_dot, Layout, SchemaGraph};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

#[allow(clippy::too_many_arguments)]
pub fn run(
    source: PathBuf,
    output: Option<PathBuf>,
    source_kind: Option<String>,
    config: Option<PathBuf>,
    tables: Option<String>,
    exclude: Option<String>,
    layout: Option<String>,
    progress: bool,
) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let kind = resolve_kind(&source, source_kind.as_deref())?;

    let mut style = config.style;
    if let Some(ref layout) = layout {
        style.layout = Some(layout.parse::<Layout>().map_err(|e| anyhow::anyhow!(e))?);
    }

    let facts = load_facts(&source, kind, progress)?;
    if facts.is_empty() {
        eprintln!("No primary keys or foreign keys found in the input.");
    }

    let mut graph = SchemaGraph::build(facts.primary_keys, facts.foreign_keys);
    graph.filter_tables(&parse_patterns(tables.as_deref())?);
    graph.exclude_tables(&parse_patterns(exclude.as_deref())?);

    let dot = to_dot(&graph, &style);

    match output {
        Some(ref path) => {
            fs::write(path, &dot).with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("DOT written to: {}", path.display());
            eprintln!(
                "\nDiagram: {} tables, {} relationships",
                graph.table_count(),
                graph.edge_count()
            );
        }
        None => print!("{}", dot),
    }

    Ok(())
}

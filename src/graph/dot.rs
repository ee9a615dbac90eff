//! Graphviz DOT output for schema diagrams.

use crate::graph::model::{Relationship, SchemaGraph};
use crate::graph::style::DiagramStyle;
use crate::graph::tooltip::TooltipPayload;

/// Generate the DOT description of `graph`.
///
/// Tables are declared in model order, followed by tables that only appear
/// as an edge endpoint (header cell only), followed by the edges in input
/// order. The output depends on nothing but the graph and the style.
pub fn to_dot(graph: &SchemaGraph, style: &DiagramStyle) -> String {
    let mut output = String::new();

    output.push_str(&format!("digraph {} {{\n", dot_id(&style.graph_name)));
    if let Some(layout) = style.layout {
        output.push_str(&format!("  rankdir={};\n", layout.rankdir()));
    }
    output.push_str(&format!(
        "  node [shape=plaintext fontname=\"{}\"];\n",
        escape_quoted(&style.font)
    ));

    for table in graph.tables.values() {
        write_table(&mut output, &table.name, &table.key_columns, style);
    }

    for name in graph.dangling_tables() {
        write_table(&mut output, name, &[], style);
    }

    for edge in &graph.edges {
        write_edge(&mut output, edge, style);
    }

    output.push_str("}\n");
    output
}

fn write_table(out: &mut String, name: &str, key_columns: &[String], style: &DiagramStyle) {
    out.push_str(&format!("  \"{}\" [label=<\n", escape_quoted(name)));
    out.push_str(&format!(
        "  <table border=\"0\" cellborder=\"1\" cellspacing=\"0\" cellpadding=\"{}\" bgcolor=\"{}\">\n",
        style.cell_padding,
        escape_html(&style.table_background)
    ));

    // Header row
    out.push_str(&format!(
        "    <tr><td bgcolor=\"{}\" sides=\"tb\" align=\"center\" port=\"header\"><font color=\"{}\"><b>{}</b></font></td></tr>\n",
        escape_html(&style.header_background),
        escape_html(&style.header_text),
        escape_html(name)
    ));

    // One row per key column, each addressable as a port
    for column in key_columns {
        let column = escape_html(column);
        out.push_str(&format!(
            "    <tr><td bgcolor=\"{}\" align=\"center\" port=\"{}\"><font color=\"{}\"><b>{}</b></font></td></tr>\n",
            escape_html(&style.key_background),
            column,
            escape_html(&style.key_text),
            column
        ));
    }

    out.push_str("  </table>\n");
    out.push_str(">];\n");
}

fn write_edge(out: &mut String, edge: &Relationship, style: &DiagramStyle) {
    let tooltip = TooltipPayload::for_relationship(&edge.parent_table, &edge.referenced_table);

    out.push_str(&format!(
        "  {} -> {} [\n",
        dot_id(&edge.parent_table),
        dot_id(&edge.referenced_table)
    ));
    out.push_str(&format!("    color=\"{}\",\n", escape_quoted(&style.edge_color)));
    out.push_str(&format!("    penwidth={},\n", style.edge_penwidth));
    out.push_str(&format!("    arrowhead={},\n", dot_id(&style.arrowhead)));
    out.push_str(&format!("    arrowsize={},\n", style.arrowsize));
    out.push_str(&format!("    style={},\n", dot_id(&style.edge_style)));
    out.push_str(&format!("    URL=\"{}\"\n", tooltip.to_data_uri()));
    out.push_str("  ];\n");
}

/// Escape a string for use inside a DOT HTML-like label
pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Escape a string for use between double quotes
fn escape_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render a DOT ID: bare when it is a plain identifier, quoted otherwise
fn dot_id(s: &str) -> String {
    const KEYWORDS: [&str; 6] = ["node", "edge", "graph", "digraph", "subgraph", "strict"];

    let plain = !s.is_empty()
        && !s.starts_with(|c: char| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(s));

    if plain {
        s.to_string()
    } else {
        format!("\"{}\"", escape_quoted(s))
    }
}

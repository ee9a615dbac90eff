//! End-to-end run: key facts to DOT, SVG and the interactive page.

use crate::compose::{compose, edge_tooltips, PageOptions};
use crate::error::{Error, Result};
use crate::graph::{to_dot, DiagramStyle, SchemaGraph};
use crate::metadata::SchemaFacts;
use crate::render::Renderer;
use glob::Pattern;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DOT_FILE: &str = "graph_output.dot";
pub const DEFAULT_SVG_FILE: &str = "graph_output.svg";
pub const DEFAULT_HTML_FILE: &str = "index.html";

/// Where the three artifacts of a run are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub dot: PathBuf,
    pub svg: PathBuf,
    pub html: PathBuf,
}

impl OutputPaths {
    /// Default file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            dot: dir.join(DEFAULT_DOT_FILE),
            svg: dir.join(DEFAULT_SVG_FILE),
            html: dir.join(DEFAULT_HTML_FILE),
        }
    }
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Tables with a primary key
    pub tables: usize,
    pub relationships: usize,
    /// Edge endpoints without a primary key, drawn as header-only nodes
    pub dangling_tables: usize,
    /// Edges in the SVG whose tooltip the page script will bind
    pub tooltip_bindings: usize,
    pub dot: PathBuf,
    pub svg: PathBuf,
    pub html: PathBuf,
}

/// Sequential build, emit, render and compose stages.
///
/// Each artifact is written before the next stage starts and nothing is
/// cleaned up on failure: a failed render leaves the DOT file behind and
/// skips composition.
pub struct Pipeline<R: Renderer> {
    renderer: R,
    style: DiagramStyle,
    page: PageOptions,
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl<R: Renderer> Pipeline<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            style: DiagramStyle::default(),
            page: PageOptions::default(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    pub fn with_style(mut self, style: DiagramStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_page(mut self, page: PageOptions) -> Self {
        self.page = page;
        self
    }

    /// Keep tables matching `include` (all when empty), then drop those matching `exclude`
    pub fn with_filter(mut self, include: Vec<Pattern>, exclude: Vec<Pattern>) -> Self {
        self.include = include;
        self.exclude = exclude;
        self
    }

    /// Build the filtered graph model
    pub fn build_graph(&self, facts: SchemaFacts) -> SchemaGraph {
        let mut graph = SchemaGraph::build(facts.primary_keys, facts.foreign_keys);
        graph.filter_tables(&self.include);
        graph.exclude_tables(&self.exclude);
        graph
    }

    /// Run every stage and write the artifacts to `paths`
    pub fn run(&self, facts: SchemaFacts, paths: &OutputPaths) -> Result<RunReport> {
        if facts.is_empty() {
            return Err(Error::MetadataUnavailable(
                "no primary keys or foreign keys found".to_string(),
            ));
        }

        let graph = self.build_graph(facts);
        let dot = to_dot(&graph, &self.style);
        write_artifact(&paths.dot, &dot)?;

        create_parent(&paths.svg)?;
        self.renderer.render(&paths.dot, &paths.svg)?;

        let svg = fs::read_to_string(&paths.svg).map_err(|e| Error::io(&paths.svg, e))?;
        let html = compose(&svg, &self.page);
        write_artifact(&paths.html, &html)?;

        Ok(RunReport {
            tables: graph.table_count(),
            relationships: graph.edge_count(),
            dangling_tables: graph.dangling_tables().len(),
            tooltip_bindings: edge_tooltips(&svg).len(),
            dot: paths.dot.clone(),
            svg: paths.svg.clone(),
            html: paths.html.clone(),
        })
    }
}

fn create_parent(path: &Path) -> Result<()> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => fs::create_dir_all(parent).map_err(|e| Error::io(parent, e)),
        None => Ok(()),
    }
}

/// Write `contents` to `path`, creating missing parent directories
fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    create_parent(path)?;
    fs::write(path, contents).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{FkRow, PkRow};
    use regex::Regex;
    use tempfile::TempDir;

    /// Stands in for Graphviz: one SVG edge group per `URL` attribute of the DOT file
    fn fake_render(dot: &Path, svg: &Path) -> Result<()> {
        let source = fs::read_to_string(dot).map_err(|e| Error::io(dot, e))?;
        let url_re = Regex::new(r#"URL="([^"]*)""#).unwrap();

        let mut out = String::from("<svg xmlns=\"http://www.w3.org/2000/svg\">\n");
        out.push_str("<g id=\"graph0\" class=\"graph\">\n");
        for (i, caps) in url_re.captures_iter(&source).enumerate() {
            out.push_str(&format!(
                "<g id=\"edge{}\" class=\"edge\"><title>e</title><g id=\"a_edge{}\"><a xlink:href=\"{}\"><path/></a></g></g>\n",
                i + 1,
                i + 1,
                &caps[1]
            ));
        }
        out.push_str("</g>\n</svg>\n");
        fs::write(svg, out).map_err(|e| Error::io(svg, e))
    }

    fn sample_facts() -> SchemaFacts {
        SchemaFacts {
            primary_keys: vec![
                PkRow::new("Customers", "CustomerID"),
                PkRow::new("Orders", "OrderID"),
            ],
            foreign_keys: vec![FkRow::new("Orders", "CustomerID", "Customers", "CustomerID")],
        }
    }

    #[test]
    fn test_run_writes_all_artifacts() {
        let dir = TempDir::new().unwrap();
        let paths = OutputPaths::in_dir(dir.path());

        let report = Pipeline::new(fake_render)
            .run(sample_facts(), &paths)
            .unwrap();

        assert_eq!(report.tables, 2);
        assert_eq!(report.relationships, 1);
        assert_eq!(report.dangling_tables, 0);
        assert_eq!(report.tooltip_bindings, 1);

        let dot = fs::read_to_string(&paths.dot).unwrap();
        assert!(dot.starts_with("digraph schema {"));
        let html = fs::read_to_string(&paths.html).unwrap();
        assert!(html.contains("<g id=\"edge1\" class=\"edge\">"));
        assert!(html.contains("<div id='custom-tooltip'></div>"));
    }

    #[test]
    fn test_tooltip_survives_the_round_trip() {
        let dir = TempDir::new().unwrap();
        let paths = OutputPaths::in_dir(dir.path());

        Pipeline::new(fake_render)
            .run(sample_facts(), &paths)
            .unwrap();

        let svg = fs::read_to_string(&paths.svg).unwrap();
        let tooltips = edge_tooltips(&svg);
        assert_eq!(
            tooltips[0].fragment,
            "<b>each <b>Orders</b> may have multiple <b>Customers</b></b>"
        );
    }

    #[test]
    fn test_empty_facts_are_unavailable() {
        let dir = TempDir::new().unwrap();
        let paths = OutputPaths::in_dir(dir.path());

        let result = Pipeline::new(fake_render).run(SchemaFacts::default(), &paths);

        assert!(matches!(result, Err(Error::MetadataUnavailable(_))));
        assert!(!paths.dot.exists());
    }

    #[test]
    fn test_failed_render_skips_compose() {
        let dir = TempDir::new().unwrap();
        let paths = OutputPaths::in_dir(dir.path());
        let failing = |_: &Path, _: &Path| -> Result<()> {
            Err(Error::RenderToolFailure {
                program: "dot".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "syntax error in line 3".to_string(),
            })
        };

        let result = Pipeline::new(failing).run(sample_facts(), &paths);

        match result {
            Err(Error::RenderToolFailure { stderr, .. }) => {
                assert_eq!(stderr, "syntax error in line 3")
            }
            other => panic!("expected RenderToolFailure, got {:?}", other),
        }
        assert!(paths.dot.exists());
        assert!(!paths.html.exists());
    }

    #[test]
    fn test_filters_apply_before_emit() {
        let dir = TempDir::new().unwrap();
        let paths = OutputPaths::in_dir(dir.path());

        let report = Pipeline::new(fake_render)
            .with_filter(Vec::new(), vec![Pattern::new("Cust*").unwrap()])
            .run(sample_facts(), &paths)
            .unwrap();

        assert_eq!(report.tables, 1);
        assert_eq!(report.relationships, 0);
        assert_eq!(report.tooltip_bindings, 0);
    }

    #[test]
    fn test_creates_missing_output_directory() {
        let dir = TempDir::new().unwrap();
        let paths = OutputPaths::in_dir(dir.path().join("nested/out"));

        Pipeline::new(fake_render)
            .run(sample_facts(), &paths)
            .unwrap();

        assert!(paths.html.exists());
    }

    #[test]
    fn test_default_paths() {
        let paths = OutputPaths::in_dir("out");
        assert_eq!(paths.dot, Path::new("out/graph_output.dot"));
        assert_eq!(paths.svg, Path::new("out/graph_output.svg"));
        assert_eq!(paths.html, Path::new("out/index.html"));
    }
}

//! Render command: metadata to DOT, SVG and the interactive page in one run.

use super::source::{
    describe_source, load_config, load_facts, parse_patterns, resolve_kind, spinner,
};
use crate::error::Error;
use crate::graph::Layout;
use crate::pipeline::{OutputPaths, Pipeline};
use crate::render::{GraphvizRenderer, Renderer};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Options of the render command
pub struct RenderArgs {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub dot: Option<PathBuf>,
    pub svg: Option<PathBuf>,
    pub html: Option<PathBuf>,
    pub source_kind: Option<String>,
    pub config: Option<PathBuf>,
    pub tables: Option<String>,
    pub exclude: Option<String>,
    pub layout: Option<String>,
    pub title: Option<String>,
    pub graphviz: Option<PathBuf>,
    pub progress: bool,
    pub json: bool,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let kind = resolve_kind(&args.source, args.source_kind.as_deref())?;
    let include = parse_patterns(args.tables.as_deref())?;
    let exclude = parse_patterns(args.exclude.as_deref())?;

    let mut style = config.style;
    if let Some(ref layout) = args.layout {
        style.layout = Some(layout.parse::<Layout>().map_err(|e| anyhow::anyhow!(e))?);
    }
    let mut page = config.page;
    if let Some(title) = args.title {
        page.title = title;
    }

    let defaults = OutputPaths::in_dir(&args.output_dir);
    let paths = OutputPaths {
        dot: args.dot.unwrap_or(defaults.dot),
        svg: args.svg.unwrap_or(defaults.svg),
        html: args.html.unwrap_or(defaults.html),
    };

    if !args.json {
        eprintln!(
            "Generating schema diagram from {}",
            describe_source(&args.source, kind)
        );
    }

    let start_time = Instant::now();
    let facts = load_facts(&args.source, kind, args.progress && !args.json)?;

    let graphviz = GraphvizRenderer::new(args.graphviz.unwrap_or(config.graphviz.program))
        .with_engine_args(config.graphviz.args);
    let show_spinner = args.progress && !args.json;
    let renderer = |dot: &Path, svg: &Path| -> crate::error::Result<()> {
        if !show_spinner {
            return graphviz.render(dot, svg);
        }
        let pb = spinner("Rendering with Graphviz...");
        let result = graphviz.render(dot, svg);
        pb.finish_and_clear();
        result
    };

    let pipeline = Pipeline::new(renderer)
        .with_style(style)
        .with_page(page)
        .with_filter(include, exclude);

    let report = match pipeline.run(facts, &paths) {
        Ok(report) => report,
        Err(e @ (Error::RenderToolNotFound { .. } | Error::RenderToolFailure { .. })) => {
            if !args.json {
                eprintln!("DOT description kept at: {}", paths.dot.display());
            }
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    let elapsed = start_time.elapsed();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    eprintln!("DOT written to: {}", report.dot.display());
    eprintln!("SVG written to: {}", report.svg.display());
    eprintln!("Page written to: {}", report.html.display());
    eprintln!(
        "\nDiagram: {} tables, {} relationships, {} tooltips",
        report.tables, report.relationships, report.tooltip_bindings
    );
    if report.dangling_tables > 0 {
        eprintln!(
            "  {} referenced tables have no primary key and are drawn without key cells",
            report.dangling_tables
        );
    }
    eprintln!("  Elapsed time: {:.3?}", elapsed);

    Ok(())
}

//! Compose command: wrap an already rendered SVG in the interactive page.

use super::source::load_config;
use crate::compose::{compose, edge_tooltips};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn run(
    svg: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    title: Option<String>,
) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let mut page = config.page;
    if let Some(title) = title {
        page.title = title;
    }

    let content =
        fs::read_to_string(&svg).with_context(|| format!("failed to read {}", svg.display()))?;
    let html = compose(&content, &page);
    let bindings = edge_tooltips(&content).len();

    match output {
        Some(ref path) => {
            fs::write(path, &html).with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Page written to: {}", path.display());
        }
        None => print!("{}", html),
    }

    if bindings == 0 {
        eprintln!("No edge tooltips found; the page will show the diagram only.");
    } else {
        eprintln!("{} edge tooltips bound", bindings);
    }

    Ok(())
}

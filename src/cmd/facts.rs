//! Facts command: print the primary-key and foreign-key relations as JSON.

use super::source::{describe_source, load_facts, resolve_kind};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn run(
    source: PathBuf,
    output: Option<PathBuf>,
    source_kind: Option<String>,
    progress: bool,
) -> Result<()> {
    let kind = resolve_kind(&source, source_kind.as_deref())?;
    eprintln!("Reading keys from {}", describe_source(&source, kind));
    let facts = load_facts(&source, kind, progress)?;
    let json = serde_json::to_string_pretty(&facts)?;

    match output {
        Some(ref path) => {
            fs::write(path, format!("{}\n", json))
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "{} primary key columns, {} foreign key columns written to: {}",
                facts.primary_keys.len(),
                facts.foreign_keys.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

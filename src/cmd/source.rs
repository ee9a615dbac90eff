//! Helpers shared by the commands: reading metadata, config and table filters.

use crate::config::DiagramConfig;
use crate::metadata::{open_source, MetadataSource, SchemaFacts, SourceKind, SqlDumpSource};
use anyhow::{bail, Context, Result};
use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Parse a comma-separated list of table globs
pub fn parse_patterns(list: Option<&str>) -> Result<Vec<Pattern>> {
    let Some(list) = list else {
        return Ok(Vec::new());
    };

    list.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| Pattern::new(s).with_context(|| format!("invalid table pattern '{}'", s)))
        .collect()
}

/// Load the YAML config when given, defaults otherwise
pub fn load_config(path: Option<&Path>) -> Result<DiagramConfig> {
    match path {
        Some(path) => Ok(DiagramConfig::load(path)?),
        None => Ok(DiagramConfig::default()),
    }
}

/// Resolve `--source`, falling back to detection from the file name
pub fn resolve_kind(path: &Path, source: Option<&str>) -> Result<SourceKind> {
    match source {
        Some(s) => s.parse().map_err(|e: String| anyhow::anyhow!(e)),
        None => Ok(SourceKind::from_path(path)),
    }
}

/// Banner line naming the source, e.g. `SQL dump shop.sql`
pub fn describe_source(path: &Path, kind: SourceKind) -> String {
    open_source(path, Some(kind)).describe()
}

/// Read both key relations from `path`.
///
/// With `progress`, SQL dumps show a byte progress bar over the raw file.
pub fn load_facts(path: &Path, kind: SourceKind, progress: bool) -> Result<SchemaFacts> {
    if !path.exists() {
        bail!("input file does not exist: {}", path.display());
    }

    if progress && kind == SourceKind::Sql {
        let file_size = std::fs::metadata(path)
            .with_context(|| format!("failed to stat {}", path.display()))?
            .len();

        let pb = ProgressBar::new(file_size);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {msg}",
            )
            .unwrap()
            .progress_chars("█▓▒░  ")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Reading keys...");

        let pb_clone = pb.clone();
        let source = SqlDumpSource::new(path).with_progress(move |bytes| {
            pb_clone.set_position(bytes);
        });

        let facts = source.load()?;
        pb.finish_with_message("done");
        return Ok(facts);
    }

    Ok(open_source(path, Some(kind)).load()?)
}

/// Spinner shown while a long step runs without measurable progress
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_patterns() {
        let patterns = parse_patterns(Some("users, order_*,,")).unwrap();
        assert_eq!(patterns.len(), 2);
        assert!(patterns[1].matches("order_items"));
        assert!(parse_patterns(None).unwrap().is_empty());
    }

    #[test]
    fn test_parse_patterns_invalid() {
        assert!(parse_patterns(Some("[unclosed")).is_err());
    }

    #[test]
    fn test_resolve_kind() {
        let path = Path::new("keys.json");
        assert_eq!(resolve_kind(path, None).unwrap(), SourceKind::Json);
        assert_eq!(resolve_kind(path, Some("sql")).unwrap(), SourceKind::Sql);
        assert!(resolve_kind(path, Some("csv")).is_err());
    }

    #[test]
    fn test_load_facts_from_dump() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.sql");
        fs::write(
            &path,
            "CREATE TABLE users (id INT PRIMARY KEY);\n\
             CREATE TABLE posts (id INT PRIMARY KEY, user_id INT REFERENCES users(id));\n",
        )
        .unwrap();

        let facts = load_facts(&path, SourceKind::Sql, true).unwrap();
        assert_eq!(facts.primary_keys.len(), 2);
        assert_eq!(facts.foreign_keys.len(), 1);
    }

    #[test]
    fn test_describe_source() {
        let path = Path::new("warehouse.db");
        assert_eq!(
            describe_source(path, SourceKind::DuckDb),
            "DuckDB database warehouse.db"
        );
        assert_eq!(describe_source(path, SourceKind::Sql), "SQL dump warehouse.db");
    }

    #[test]
    fn test_load_facts_missing_file() {
        let err = load_facts(Path::new("/nonexistent/dump.sql"), SourceKind::Sql, false)
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}

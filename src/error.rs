//! Error types shared by the metadata sources, the render step and the pipeline.

use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The metadata source could not be read or produced no key rows
    #[error("schema metadata unavailable: {0}")]
    MetadataUnavailable(String),

    /// The layout tool binary could not be started
    #[error(
        "Graphviz '{program}' command not found. Install Graphviz or pass --graphviz <path>."
    )]
    RenderToolNotFound { program: String },

    /// The layout tool ran but exited unsuccessfully
    #[error("{program} exited with {status}:\n{stderr}")]
    RenderToolFailure {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("duckdb: {0}")]
    DuckDb(#[from] duckdb::Error),
}

impl Error {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

//! Turning a DOT file into an SVG file with an external layout tool.

use crate::error::{Error, Result};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Lays out a DOT file and writes the resulting SVG
pub trait Renderer {
    fn render(&self, dot: &Path, svg: &Path) -> Result<()>;
}

impl<F> Renderer for F
where
    F: Fn(&Path, &Path) -> Result<()>,
{
    fn render(&self, dot: &Path, svg: &Path) -> Result<()> {
        self(dot, svg)
    }
}

/// Runs Graphviz as `<program> [engine args] -Tsvg <dot> -o <svg>`.
///
/// The call blocks until the tool exits. There is no timeout and no retry.
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    program: PathBuf,
    engine_args: Vec<String>,
}

impl Default for GraphvizRenderer {
    fn default() -> Self {
        Self::new("dot")
    }
}

impl GraphvizRenderer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            engine_args: Vec::new(),
        }
    }

    /// Extra arguments placed before the output format, e.g. `-Kneato`
    pub fn with_engine_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.engine_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl Renderer for GraphvizRenderer {
    fn render(&self, dot: &Path, svg: &Path) -> Result<()> {
        let output = Command::new(&self.program)
            .args(&self.engine_args)
            .arg("-Tsvg")
            .arg(dot)
            .arg("-o")
            .arg(svg)
            .output()
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    Error::RenderToolNotFound {
                        program: self.program_name(),
                    }
                } else {
                    Error::io(&self.program, e)
                }
            })?;

        if !output.status.success() {
            return Err(Error::RenderToolFailure {
                program: self.program_name(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_program() {
        let dir = TempDir::new().unwrap();
        let renderer = GraphvizRenderer::new("schema-diagram-no-such-graphviz");

        let result = renderer.render(&dir.path().join("g.dot"), &dir.path().join("g.svg"));

        match result {
            Err(Error::RenderToolNotFound { program }) => {
                assert_eq!(program, "schema-diagram-no-such-graphviz")
            }
            other => panic!("expected RenderToolNotFound, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_failure() {
        let dir = TempDir::new().unwrap();
        let renderer = GraphvizRenderer::new("false");

        let result = renderer.render(&dir.path().join("g.dot"), &dir.path().join("g.svg"));

        assert!(matches!(result, Err(Error::RenderToolFailure { .. })));
    }

    #[test]
    fn test_closure_renderer() {
        let dir = TempDir::new().unwrap();
        let calls = RefCell::new(Vec::new());
        let renderer = |dot: &Path, svg: &Path| -> Result<()> {
            calls.borrow_mut().push(dot.to_path_buf());
            fs::write(svg, "<svg/>").map_err(|e| Error::io(svg, e))
        };

        let svg = dir.path().join("g.svg");
        renderer.render(&dir.path().join("g.dot"), &svg).unwrap();

        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(fs::read_to_string(svg).unwrap(), "<svg/>");
    }

    #[test]
    fn test_engine_args() {
        let renderer = GraphvizRenderer::default().with_engine_args(["-Kneato"]);
        assert_eq!(renderer.program(), Path::new("dot"));
        assert_eq!(renderer.engine_args, vec!["-Kneato".to_string()]);
    }
}

mod compose;
mod dot;
mod facts;
mod render;
mod source;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "schema-diagram")]
#[command(version)]
#[command(
    about = "Draw database schemas as Graphviz diagrams with relationship tooltips",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read key metadata, emit DOT, render SVG with Graphviz and write the HTML page
    Render {
        /// SQL dump (.sql, optionally .gz/.bz2/.xz/.zst), DuckDB database or facts JSON
        source: PathBuf,

        /// Directory for graph_output.dot, graph_output.svg and index.html
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// DOT output path (overrides --output-dir)
        #[arg(long)]
        dot: Option<PathBuf>,

        /// SVG output path (overrides --output-dir)
        #[arg(long)]
        svg: Option<PathBuf>,

        /// HTML output path (overrides --output-dir)
        #[arg(long)]
        html: Option<PathBuf>,

        /// Source kind: sql, duckdb, or json (detected from the extension if not specified)
        #[arg(long = "source")]
        source_kind: Option<String>,

        /// YAML config file with style, page and graphviz sections
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only include these tables (comma-separated, supports globs)
        #[arg(short, long)]
        tables: Option<String>,

        /// Exclude these tables (comma-separated, supports globs)
        #[arg(short, long)]
        exclude: Option<String>,

        /// Layout direction: lr (left-right) or tb (top-bottom)
        #[arg(long)]
        layout: Option<String>,

        /// Page title
        #[arg(long)]
        title: Option<String>,

        /// Graphviz binary to run (default: dot)
        #[arg(long)]
        graphviz: Option<PathBuf>,

        /// Show progress while reading and rendering
        #[arg(short, long)]
        progress: bool,

        /// Output the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Emit the Graphviz DOT description only
    Dot {
        /// SQL dump, DuckDB database or facts JSON
        source: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Source kind: sql, duckdb, or json (detected from the extension if not specified)
        #[arg(long = "source")]
        source_kind: Option<String>,

        /// YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only include these tables (comma-separated, supports globs)
        #[arg(short, long)]
        tables: Option<String>,

        /// Exclude these tables (comma-separated, supports globs)
        #[arg(short, long)]
        exclude: Option<String>,

        /// Layout direction: lr (left-right) or tb (top-bottom)
        #[arg(long)]
        layout: Option<String>,

        /// Show progress while reading
        #[arg(short, long)]
        progress: bool,
    },

    /// Wrap a rendered SVG in the interactive HTML page
    Compose {
        /// SVG produced by Graphviz from a schema-diagram DOT file
        svg: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// YAML config file (page section)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Page title
        #[arg(long)]
        title: Option<String>,
    },

    /// Print the primary-key and foreign-key relations as JSON
    Facts {
        /// SQL dump, DuckDB database or facts JSON
        source: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Source kind: sql, duckdb, or json (detected from the extension if not specified)
        #[arg(long = "source")]
        source_kind: Option<String>,

        /// Show progress while reading
        #[arg(short, long)]
        progress: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Render {
            source,
            output_dir,
            dot,
            svg,
            html,
            source_kind,
            config,
            tables,
            exclude,
            layout,
            title,
            graphviz,
            progress,
            json,
        } => render::run(render::RenderArgs {
            source,
            output_dir,
            dot,
            svg,
            html,
            source_kind,
            config,
            tables,
            exclude,
            layout,
            title,
            graphviz,
            progress,
            json,
        }),
        Commands::Dot {
            source,
            output,
            source_kind,
            config,
            tables,
            exclude,
            layout,
            progress,
        } => dot::run(
            source,
            output,
            source_kind,
            config,
            tables,
            exclude,
            layout,
            progress,
        ),
        Commands::Compose {
            svg,
            output,
            config,
            title,
        } => compose::run(svg, output, config, title),
        Commands::Facts {
            source,
            output,
            source_kind,
            progress,
        } => facts::run(source, output, source_kind, progress),
        Commands::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "schema-diagram",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}

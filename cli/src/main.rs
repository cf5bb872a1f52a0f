
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;
use tallskog::config::{ConfigError, ENV_CHAR_WIDTH, ENV_LINE_HEIGHT, ENV_UNDO_MERGE_MS, EditorConfig};
use tallskog::error::ErrorCode;
use tallskog::geom::Point;
use tallskog::hit::{insertion_position, layout_node_at};
use tallskog::layout::{MonospaceMeasure, layout_forest};
use tallskog::{ParseError, parse, unparse};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ErrorCode for CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "E_IO",
            Self::Parse(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Json(_) => "E_JSON",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "tallskog", about = "Format, check, and lay out bracket-notation forests")]
struct Cli {
    /// Width of one label character in layout units.
    #[arg(long, global = true, env = ENV_CHAR_WIDTH)]
    char_width: Option<String>,

    /// Height of one label line in layout units.
    #[arg(long, global = true, env = ENV_LINE_HEIGHT)]
    line_height: Option<String>,

    /// Undo merge window in milliseconds.
    #[arg(long, global = true, env = ENV_UNDO_MERGE_MS)]
    undo_merge_ms: Option<String>,

    /// Log parser and layout decisions to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the canonical form of a forest.
    Fmt { file: Option<PathBuf> },
    /// Validate a forest and print a summary.
    Check { file: Option<PathBuf> },
    /// Print the computed layout as JSON.
    Layout {
        file: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
    },
    /// Report the node and insertion slot under a diagram point.
    Hit {
        file: Option<PathBuf>,
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
    },
}

impl Command {
    fn file(&self) -> Option<&PathBuf> {
        match self {
            Self::Fmt { file } | Self::Check { file } | Self::Layout { file, .. } | Self::Hit { file, .. } => {
                file.as_ref()
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run_cli(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error[{}]: {e}", e.error_code());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).init();
}

fn run_cli(cli: &Cli) -> Result<String, CliError> {
    let config = load_config(cli)?;
    let input = read_input(cli.command.file())?;
    run(&cli.command, &config, &input)
}

/// Validate the settings clap collected from flags and the environment.
fn load_config(cli: &Cli) -> Result<EditorConfig, CliError> {
    let config = EditorConfig::from_lookup(|key| match key {
        ENV_CHAR_WIDTH => cli.char_width.clone(),
        ENV_LINE_HEIGHT => cli.line_height.clone(),
        ENV_UNDO_MERGE_MS => cli.undo_merge_ms.clone(),
        _ => None,
    })?;
    Ok(config)
}

fn read_input(file: Option<&PathBuf>) -> Result<String, CliError> {
    match file {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .map_err(|source| CliError::Io { path: path.display().to_string(), source }),
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| CliError::Io { path: "<stdin>".into(), source })?;
            Ok(text)
        }
    }
}

fn run(command: &Command, config: &EditorConfig, input: &str) -> Result<String, CliError> {
    let forest = parse(input)?;
    tracing::debug!(trees = forest.tree_count(), nodes = forest.node_count(), "parsed forest");

    match command {
        Command::Fmt { .. } => Ok(unparse(&forest)),
        Command::Check { .. } => Ok(format!(
            "ok: {} trees, {} nodes, {} arrows",
            forest.tree_count(),
            forest.node_count(),
            forest.live_arrows().count()
        )),
        Command::Layout { pretty, .. } => {
            let layout = layout_forest(&MonospaceMeasure::from_config(config), &forest, None, &[]);
            let rendered =
                if *pretty { serde_json::to_string_pretty(&layout)? } else { serde_json::to_string(&layout)? };
            Ok(rendered)
        }
        Command::Hit { x, y, .. } => {
            let layout = layout_forest(&MonospaceMeasure::from_config(config), &forest, None, &[]);
            let pt = Point::new(*x, *y);
            let node = layout_node_at(&layout, pt).map(|h| {
                let at = h.diagram_position();
                json!({ "id": h.node.node_id, "label": h.node.label, "tree": h.tree_index, "x": at.x, "y": at.y })
            });
            let slot = insertion_position(&layout, pt);
            Ok(serde_json::to_string_pretty(&json!({ "node": node, "insertion": slot }))?)
        }
    }
}

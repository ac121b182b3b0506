use crate::config::{PhaseArrangement, load_config};
use crate::document::load_document;
use crate::error::LoadError;
use crate::layout_dump::write_layout_dump;
use crate::pipeline::{OutputFormat, RenderOutcome, prepare, write_artifact};
use crate::summary::GraphSummary;
use crate::viewer::open_in_viewer;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_INPUT: &str = "config/sample_graph.json";

#[derive(Parser, Debug)]
#[command(
    name = "fsmviz",
    version,
    about = "Render multi-phase state graphs as interactive HTML or static images"
)]
pub struct Args {
    /// Output format: html (default), png, or svg. Unrecognized values fall back to html
    #[arg(value_name = "FORMAT")]
    pub format: Option<String>,

    /// Graph description (JSON)
    #[arg(short = 'i', long = "input", default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Output file. Defaults to graph_visualization.<format>
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Render config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// How to arrange three or more phases
    #[arg(long = "arrangement", value_enum)]
    pub arrangement: Option<PhaseArrangement>,

    /// Write computed node coordinates as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Do not open the result in a viewer
    #[arg(long = "no-open")]
    pub no_open: bool,

    /// Skip the printed graph summary
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl Args {
    pub fn output_format(&self) -> OutputFormat {
        let Some(token) = self.format.as_deref() else {
            return OutputFormat::default();
        };
        token.parse().unwrap_or_else(|err: String| {
            tracing::warn!(format = token, error = %err, "falling back to html");
            OutputFormat::default()
        })
    }
}

/// Installs the stderr log subscriber; `RUST_LOG` overrides the `warn` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run() -> Result<()> {
    run_with_args(Args::parse())
}

pub fn run_with_args(args: Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(arrangement) = args.arrangement {
        config.layout.arrangement = arrangement;
    }
    let format = args.output_format();
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format.default_file_name()));

    let document = match load_document(&args.input) {
        Ok(document) => document,
        Err(err) => {
            report_load_error(&err);
            return Ok(());
        }
    };

    if !args.quiet {
        println!("{}", GraphSummary::new(&document));
    }

    let prepared = prepare(&document, &config);
    if prepared.graph.is_empty() {
        println!("No nodes to visualize");
        return Ok(());
    }
    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &prepared.layout, &prepared.graph)?;
        println!("Layout written to {}", path.display());
    }

    println!("Generating {format} visualization...");
    if let RenderOutcome::Written { nodes, edges } =
        write_artifact(&prepared, format, &output, &config)?
    {
        tracing::debug!(nodes, edges, "rendered graph");
        println!("Graph saved to {}", output.display());
    }

    if !args.no_open && !open_in_viewer(&output) {
        println!(
            "Could not open a viewer automatically. Please open {} manually.",
            output.display()
        );
    }
    Ok(())
}

fn report_load_error(err: &LoadError) {
    tracing::error!(path = %err.path().display(), error = %err, "failed to load graph");
    println!("Error: {err}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_defaults_to_html() {
        let args = Args::try_parse_from(["fsmviz"]).unwrap();
        assert_eq!(args.format, None);
        assert_eq!(args.output_format(), OutputFormat::Html);
        assert_eq!(args.input, PathBuf::from(DEFAULT_INPUT));
        assert!(!args.no_open);
    }

    #[test]
    fn positional_format_accepts_aliases() {
        let args = Args::try_parse_from(["fsmviz", "image"]).unwrap();
        assert_eq!(args.output_format(), OutputFormat::Png);
        let args = Args::try_parse_from(["fsmviz", "interactive", "--no-open"]).unwrap();
        assert_eq!(args.output_format(), OutputFormat::Html);
        assert!(args.no_open);
    }

    #[test]
    fn unrecognized_format_falls_back_to_html() {
        let args = Args::try_parse_from(["fsmviz", "gif"]).unwrap();
        assert_eq!(args.format.as_deref(), Some("gif"));
        assert_eq!(args.output_format(), OutputFormat::Html);
    }

    #[test]
    fn flags_override_paths_and_arrangement() {
        let args = Args::try_parse_from([
            "fsmviz",
            "svg",
            "-i",
            "graph.json",
            "-o",
            "out.svg",
            "--arrangement",
            "row",
            "--dumpLayout",
            "layout.json",
            "-q",
        ])
        .unwrap();
        assert_eq!(args.input, PathBuf::from("graph.json"));
        assert_eq!(args.output, Some(PathBuf::from("out.svg")));
        assert_eq!(args.arrangement, Some(PhaseArrangement::Row));
        assert_eq!(args.dump_layout, Some(PathBuf::from("layout.json")));
        assert!(args.quiet);
    }

    #[test]
    fn missing_input_returns_without_output() {
        let dir = std::env::temp_dir();
        let output = dir.join(format!("fsmviz-cli-{}-missing.html", std::process::id()));
        let args = Args::try_parse_from([
            "fsmviz".to_string(),
            "-i".to_string(),
            dir.join("fsmviz-no-such-input.json").display().to_string(),
            "-o".to_string(),
            output.display().to_string(),
            "--no-open".to_string(),
        ])
        .unwrap();
        assert!(run_with_args(args).is_ok());
        assert!(!output.exists());
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fsmviz-cli-{}-{name}", std::process::id()))
    }

    fn args_for(input: &PathBuf, output: &PathBuf, dump: &PathBuf) -> Args {
        Args::try_parse_from([
            "fsmviz".to_string(),
            "svg".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-o".to_string(),
            output.display().to_string(),
            "--dumpLayout".to_string(),
            dump.display().to_string(),
            "--no-open".to_string(),
            "-q".to_string(),
        ])
        .unwrap()
    }

    #[test]
    fn dump_layout_writes_coordinates_next_to_output() {
        let input = temp_path("dump-in.json");
        let output = temp_path("dump-out.svg");
        let dump = temp_path("dump-layout.json");
        std::fs::write(
            &input,
            r#"{"phases":[{"id":"p","initial_state":"a","nodes":[{"id":"a"},{"id":"b"}],
                "edges":[{"from":"a","to":"b"}]}]}"#,
        )
        .unwrap();
        let result = run_with_args(args_for(&input, &output, &dump));
        let layout = std::fs::read_to_string(&dump);
        let rendered = output.exists();
        for path in [&input, &output, &dump] {
            std::fs::remove_file(path).ok();
        }
        assert!(result.is_ok());
        assert!(rendered);
        let layout: serde_json::Value = serde_json::from_str(&layout.unwrap()).unwrap();
        assert_eq!(layout["nodes"].as_array().map(Vec::len), Some(2));
        assert_eq!(layout["phases"][0]["id"], "p");
    }

    #[test]
    fn empty_graph_writes_neither_output_nor_dump() {
        let input = temp_path("empty-in.json");
        let output = temp_path("empty-out.svg");
        let dump = temp_path("empty-layout.json");
        std::fs::write(&input, r#"{"phases":[{"id":"lonely"}]}"#).unwrap();
        let result = run_with_args(args_for(&input, &output, &dump));
        std::fs::remove_file(&input).ok();
        assert!(result.is_ok());
        assert!(!output.exists());
        assert!(!dump.exists());
    }
}

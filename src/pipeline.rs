//! load → build → layout → render, as one call.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::Result;

use crate::config::Config;
use crate::document::{GraphDocument, load_document};
use crate::graph::StateGraph;
use crate::html::{render_html, write_output_html};
use crate::layout::{Layout, compute_layout};
use crate::render::{render_svg, write_output_svg};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Html,
    Png,
    Svg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }

    pub fn default_file_name(self) -> String {
        format!("graph_visualization.{}", self.extension())
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension().to_ascii_uppercase())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.to_ascii_lowercase().as_str() {
            "html" | "plotly" | "interactive" => Ok(OutputFormat::Html),
            "png" | "image" | "matplotlib" => Ok(OutputFormat::Png),
            "svg" => Ok(OutputFormat::Svg),
            other => Err(format!(
                "unknown output format '{other}' (expected html, png, or svg)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Written { nodes: usize, edges: usize },
    /// The document declared no nodes; nothing was written.
    Empty,
}

pub struct Prepared {
    pub graph: StateGraph,
    pub layout: Layout,
}

pub fn prepare(document: &GraphDocument, config: &Config) -> Prepared {
    let graph = StateGraph::build(document);
    let layout = compute_layout(&graph, &config.layout);
    Prepared { graph, layout }
}

/// Renders an already prepared graph to `output`.
pub fn write_artifact(
    prepared: &Prepared,
    format: OutputFormat,
    output: &Path,
    config: &Config,
) -> Result<RenderOutcome> {
    let Prepared { graph, layout } = prepared;
    if graph.is_empty() {
        return Ok(RenderOutcome::Empty);
    }
    match format {
        OutputFormat::Html => {
            let html = render_html(graph, layout, config);
            write_output_html(&html, output)?;
        }
        OutputFormat::Svg => {
            let svg = render_svg(graph, layout, config);
            write_output_svg(&svg, output)?;
        }
        OutputFormat::Png => write_png(graph, layout, output, config)?,
    }
    tracing::info!(path = %output.display(), format = %format, "wrote visualization");
    Ok(RenderOutcome::Written {
        nodes: graph.node_count(),
        edges: graph.edge_count(),
    })
}

#[cfg(feature = "png")]
fn write_png(graph: &StateGraph, layout: &Layout, output: &Path, config: &Config) -> Result<()> {
    let svg = render_svg(graph, layout, config);
    crate::render::write_output_png(&svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_graph: &StateGraph, _layout: &Layout, _output: &Path, _config: &Config) -> Result<()> {
    anyhow::bail!("PNG output requires the `png` feature")
}

/// Loads `input` and writes the visualization to `output`.
///
/// Load failures surface as [`crate::LoadError`] inside the returned error and
/// leave `output` untouched.
pub fn render_file(
    input: &Path,
    output: &Path,
    format: OutputFormat,
    config: &Config,
) -> Result<RenderOutcome> {
    let document = load_document(input)?;
    let prepared = prepare(&document, config);
    write_artifact(&prepared, format, output, config)
}

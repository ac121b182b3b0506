use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum PhaseArrangement {
    /// Three or more phases evenly spaced on a circle.
    Ring,
    /// Three or more phases side by side on a horizontal line.
    Row,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Distance between the two centers when there are exactly two phases.
    pub phase_spacing: f32,
    pub phase_ring_radius: f32,
    pub row_spacing: f32,
    pub node_ring_radius: f32,
    pub boundary_radius: f32,
    pub label_offset: f32,
    pub arrangement: PhaseArrangement,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            phase_spacing: 6.0,
            phase_ring_radius: 4.0,
            row_spacing: 8.0,
            node_ring_radius: 2.0,
            boundary_radius: 2.8,
            label_offset: 3.2,
            arrangement: PhaseArrangement::Ring,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Pixels per layout unit.
    pub scale: f32,
    pub padding: f32,
    /// Rasterization multiplier applied to the SVG canvas for PNG output.
    pub png_scale: f32,
    pub condition_limit: usize,
    pub action_limit: usize,
    pub node_radius: f32,
    pub label_line_height: f32,
    pub fast_text_metrics: bool,
    pub title: String,
    pub legend_width: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: 90.0,
            padding: 40.0,
            png_scale: 2.0,
            condition_limit: 20,
            action_limit: 15,
            node_radius: 20.0,
            label_line_height: 1.3,
            fast_text_metrics: false,
            title: "Multi-Phase State Graph Visualization".to_string(),
            legend_width: 190.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    phase_colors: Option<Vec<String>>,
    text_color: Option<String>,
    node_border_color: Option<String>,
    internal_edge_color: Option<String>,
    transition_edge_color: Option<String>,
    boundary_color: Option<String>,
    selected_color: Option<String>,
    edge_label_background: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    phase_spacing: Option<f32>,
    phase_ring_radius: Option<f32>,
    row_spacing: Option<f32>,
    node_ring_radius: Option<f32>,
    boundary_radius: Option<f32>,
    label_offset: Option<f32>,
    arrangement: Option<PhaseArrangement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    scale: Option<f32>,
    padding: Option<f32>,
    png_scale: Option<f32>,
    condition_limit: Option<usize>,
    action_limit: Option<usize>,
    node_radius: Option<f32>,
    fast_text_metrics: Option<bool>,
    title: Option<String>,
}

/// Loads a render configuration file (JSON or JSON5) layered over defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" => config.theme = Theme::modern(),
            "classic" | "default" => config.theme = Theme::classic(),
            other => tracing::warn!(theme = other, "unknown theme name; keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        let theme = &mut config.theme;
        if let Some(v) = vars.font_family {
            theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            theme.font_size = v;
        }
        if let Some(v) = vars.phase_colors.filter(|colors| !colors.is_empty()) {
            theme.phase_colors = v;
        }
        if let Some(v) = vars.text_color {
            theme.text_color = v;
        }
        if let Some(v) = vars.node_border_color {
            theme.node_border_color = v;
        }
        if let Some(v) = vars.internal_edge_color {
            theme.internal_edge_color = v;
        }
        if let Some(v) = vars.transition_edge_color {
            theme.transition_edge_color = v;
        }
        if let Some(v) = vars.boundary_color {
            theme.boundary_color = v;
        }
        if let Some(v) = vars.selected_color {
            theme.selected_color = v;
        }
        if let Some(v) = vars.edge_label_background {
            theme.edge_label_background = v;
        }
        if let Some(v) = vars.background {
            theme.background = v;
        }
    }

    if let Some(file) = parsed.layout {
        let layout = &mut config.layout;
        if let Some(v) = file.phase_spacing {
            layout.phase_spacing = v;
        }
        if let Some(v) = file.phase_ring_radius {
            layout.phase_ring_radius = v;
        }
        if let Some(v) = file.row_spacing {
            layout.row_spacing = v;
        }
        if let Some(v) = file.node_ring_radius {
            layout.node_ring_radius = v;
        }
        if let Some(v) = file.boundary_radius {
            layout.boundary_radius = v;
        }
        if let Some(v) = file.label_offset {
            layout.label_offset = v;
        }
        if let Some(v) = file.arrangement {
            layout.arrangement = v;
        }
    }

    if let Some(file) = parsed.render {
        let render = &mut config.render;
        if let Some(v) = file.scale {
            render.scale = v.max(1.0);
        }
        if let Some(v) = file.padding {
            render.padding = v.max(0.0);
        }
        if let Some(v) = file.png_scale {
            render.png_scale = v.max(0.1);
        }
        if let Some(v) = file.condition_limit {
            render.condition_limit = v;
        }
        if let Some(v) = file.action_limit {
            render.action_limit = v;
        }
        if let Some(v) = file.node_radius {
            render.node_radius = v.max(1.0);
        }
        if let Some(v) = file.fast_text_metrics {
            render.fast_text_metrics = v;
        }
        if let Some(v) = file.title {
            render.title = v;
        }
    }

    Ok(config)
}

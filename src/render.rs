use crate::config::{Config, RenderConfig};
use crate::graph::{EdgeKind, NodeKey, StateEdge, StateGraph, StateNode};
use crate::layout::{Layout, Point};
use crate::text::{TextBlock, edge_label_lines, format_mapping, measure_lines};
use crate::theme::Theme;
use anyhow::Result;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

const TITLE_HEIGHT: f32 = 48.0;
const SUBTITLE_HEIGHT: f32 = 18.0;
const LABEL_PAD_X: f32 = 5.0;
const LABEL_PAD_Y: f32 = 3.0;
const PARALLEL_EDGE_SPACING: f32 = 30.0;
const LEGEND_ROW: f32 = 22.0;

/// Maps layout units onto the SVG canvas, fitted to the layout bounds.
#[derive(Debug, Clone, Copy)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
    scale: f32,
    origin_x: f32,
    origin_y: f32,
}

impl Canvas {
    pub fn fit(layout: &Layout, render: &RenderConfig, header: f32) -> Self {
        let bounds = layout.bounds();
        let pad = render.padding + render.node_radius;
        let plot_width = bounds.width() * render.scale + 2.0 * pad;
        let plot_height = bounds.height() * render.scale + 2.0 * pad;
        Self {
            width: (plot_width + render.legend_width).max(320.0),
            height: (plot_height + header).max(240.0),
            scale: render.scale,
            origin_x: pad - bounds.min_x * render.scale,
            origin_y: header + pad + bounds.max_y * render.scale,
        }
    }

    pub fn map(&self, point: Point) -> (f32, f32) {
        (
            self.origin_x + point.x * self.scale,
            self.origin_y - point.y * self.scale,
        )
    }

    pub fn length(&self, units: f32) -> f32 {
        units * self.scale
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SvgFlavor {
    Static,
    Interactive,
}

/// Static diagram: phase boundaries, nodes, edges, inline labels, legend.
pub fn render_svg(graph: &StateGraph, layout: &Layout, config: &Config) -> String {
    render_svg_flavored(graph, layout, config, SvgFlavor::Static)
}

pub(crate) fn render_svg_flavored(
    graph: &StateGraph,
    layout: &Layout,
    config: &Config,
    flavor: SvgFlavor,
) -> String {
    let theme = &config.theme;
    let render = &config.render;
    let interactive = flavor == SvgFlavor::Interactive;
    let header = if interactive {
        TITLE_HEIGHT + SUBTITLE_HEIGHT
    } else {
        TITLE_HEIGHT
    };
    let canvas = Canvas::fit(layout, render, header);
    let width = canvas.width;
    let height = canvas.height;
    let mut svg = String::new();

    let id_attr = if interactive { " id=\"graph\"" } else { "" };
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\"{id_attr} width=\"{width:.0}\" height=\"{height:.0}\" viewBox=\"0 0 {width:.2} {height:.2}\" font-family=\"{}\">",
        escape_xml(&theme.font_family)
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str("<defs>");
    push_marker(&mut svg, "arrow-internal", &theme.internal_edge_color);
    push_marker(&mut svg, "arrow-transition", &theme.transition_edge_color);
    svg.push_str("</defs>");

    let title_x = (width - render.legend_width) / 2.0;
    svg.push_str(&format!(
        "<text x=\"{title_x:.2}\" y=\"30\" text-anchor=\"middle\" font-size=\"{:.1}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
        theme.font_size * 1.6,
        theme.text_color,
        escape_xml(&render.title)
    ));
    if interactive {
        svg.push_str(&format!(
            "<text x=\"{title_x:.2}\" y=\"52\" text-anchor=\"middle\" font-size=\"{:.1}\" fill=\"{}\">Hover over nodes and edges for details; drag to pan, scroll to zoom, click a node to select it</text>",
            theme.font_size,
            theme.boundary_color
        ));
    }

    svg.push_str("<g class=\"phases\">");
    for phase in &layout.phases {
        let (cx, cy) = canvas.map(phase.center);
        let r = canvas.length(phase.boundary_radius);
        svg.push_str(&format!(
            "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{r:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\" stroke-dasharray=\"8 6\" stroke-opacity=\"0.7\"/>",
            theme.boundary_color
        ));
        let (lx, ly) = canvas.map(phase.label_anchor);
        svg.push_str(&format!(
            "<text x=\"{lx:.2}\" y=\"{ly:.2}\" text-anchor=\"middle\" font-size=\"{:.1}\" font-weight=\"bold\" fill=\"{}\">Phase: {}</text>",
            theme.font_size * 1.2,
            theme.text_color,
            escape_xml(&phase.id)
        ));
    }
    svg.push_str("</g>");

    let node_points: HashMap<&NodeKey, (f32, f32)> = layout
        .positions
        .iter()
        .map(|(key, point)| (key, canvas.map(*point)))
        .collect();
    let bends = edge_bends(graph.edges());
    let mut occupied: Vec<(f32, f32, f32, f32)> = Vec::new();
    let mut labels = String::new();

    svg.push_str("<g class=\"edges\">");
    for (idx, edge) in graph.edges().iter().enumerate() {
        let (Some(&from), Some(&to)) = (node_points.get(&edge.from), node_points.get(&edge.to))
        else {
            continue;
        };
        let geometry = edge_geometry(from, to, bends[idx], render.node_radius);
        let (color, stroke_width, dash, marker) = match edge.kind {
            EdgeKind::Internal { .. } => (
                theme.internal_edge_color.as_str(),
                1.4,
                "",
                "arrow-internal",
            ),
            EdgeKind::PhaseTransition { .. } => (
                theme.transition_edge_color.as_str(),
                2.4,
                " stroke-dasharray=\"8 5\"",
                "arrow-transition",
            ),
        };
        if interactive {
            let hover = edge_hover_lines(edge).join("\n");
            svg.push_str(&format!(
                "<g class=\"edge\" data-from=\"{}\" data-to=\"{}\" data-hover=\"{}\"><title>{}</title>",
                escape_xml(&edge.from.to_string()),
                escape_xml(&edge.to.to_string()),
                escape_xml(&hover),
                escape_xml(&hover)
            ));
        }
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{stroke_width}\"{dash} marker-end=\"url(#{marker})\"/>",
            geometry.path
        ));
        if interactive {
            // Wide transparent stroke so thin edges are easy to hover.
            svg.push_str(&format!(
                "<path d=\"{}\" fill=\"none\" stroke=\"transparent\" stroke-width=\"12\"/></g>",
                geometry.path
            ));
        }

        let lines = edge_label_lines(
            edge.condition.as_deref(),
            Some(&edge.actions),
            render.condition_limit,
            render.action_limit,
        );
        if !lines.is_empty() {
            let font_size = theme.font_size * 0.8;
            let block = measure_lines(
                lines,
                font_size,
                render.label_line_height,
                &theme.font_family,
                render.fast_text_metrics,
            );
            let (x, y) = place_label(geometry.label_at, &block, &mut occupied);
            push_edge_label(&mut labels, x, y, &block, font_size, theme, render);
        }
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"edge-labels\">");
    svg.push_str(&labels);
    svg.push_str("</g>");

    svg.push_str("<g class=\"nodes\">");
    for (idx, node) in graph.nodes().enumerate() {
        let Some(&(x, y)) = node_points.get(&node.key) else {
            continue;
        };
        push_node(&mut svg, idx, node, x, y, config, flavor);
    }
    svg.push_str("</g>");

    push_legend(&mut svg, graph, &canvas, config, flavor);

    svg.push_str("</svg>");
    svg
}

fn push_marker(svg: &mut String, id: &str, color: &str) {
    svg.push_str(&format!(
        "<marker id=\"{id}\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"7\" markerHeight=\"7\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{color}\"/></marker>"
    ));
}

fn push_node(
    svg: &mut String,
    idx: usize,
    node: &StateNode,
    x: f32,
    y: f32,
    config: &Config,
    flavor: SvgFlavor,
) {
    let theme = &config.theme;
    let render = &config.render;
    let fill = theme.phase_color(node.phase_index);
    let interactive = flavor == SvgFlavor::Interactive;

    if interactive {
        let hover = node_hover_lines(node).join("\n");
        svg.push_str(&format!(
            "<g class=\"node\" id=\"node-{idx}\" data-key=\"{}\" data-fill=\"{}\" data-hover=\"{}\"><title>{}</title>",
            escape_xml(&node.key.to_string()),
            escape_xml(fill),
            escape_xml(&hover),
            escape_xml(&hover)
        ));
    }

    if node.is_initial {
        let side = render.node_radius * 2.1;
        svg.push_str(&format!(
            "<rect class=\"shape\" x=\"{:.2}\" y=\"{:.2}\" width=\"{side:.2}\" height=\"{side:.2}\" fill=\"{}\" fill-opacity=\"0.9\" stroke=\"{}\" stroke-width=\"2.5\"/>",
            x - side / 2.0,
            y - side / 2.0,
            escape_xml(fill),
            theme.node_border_color
        ));
    } else {
        svg.push_str(&format!(
            "<circle class=\"shape\" cx=\"{x:.2}\" cy=\"{y:.2}\" r=\"{:.2}\" fill=\"{}\" fill-opacity=\"0.85\" stroke=\"{}\" stroke-width=\"1.2\"/>",
            render.node_radius,
            escape_xml(fill),
            theme.node_border_color
        ));
    }

    let mut lines = vec![node.key.node.clone()];
    if flavor == SvgFlavor::Static {
        if let Some(desc) = &node.description {
            lines.push(format!("({desc})"));
        }
    }
    let font_size = theme.font_size * 0.9;
    let block = measure_lines(
        lines,
        font_size,
        render.label_line_height,
        &theme.font_family,
        render.fast_text_metrics,
    );
    svg.push_str(&text_block_svg(x, y, &block, font_size, theme, render, "bold"));

    if interactive {
        svg.push_str("</g>");
    }
}

fn push_edge_label(
    out: &mut String,
    x: f32,
    y: f32,
    block: &TextBlock,
    font_size: f32,
    theme: &Theme,
    render: &RenderConfig,
) {
    let rect_x = x - block.width / 2.0 - LABEL_PAD_X;
    let rect_y = y - block.height / 2.0 - LABEL_PAD_Y;
    let rect_w = block.width + 2.0 * LABEL_PAD_X;
    let rect_h = block.height + 2.0 * LABEL_PAD_Y;
    out.push_str(&format!(
        "<rect x=\"{rect_x:.2}\" y=\"{rect_y:.2}\" width=\"{rect_w:.2}\" height=\"{rect_h:.2}\" rx=\"4\" ry=\"4\" fill=\"{}\" fill-opacity=\"0.85\" stroke=\"{}\" stroke-width=\"0.8\"/>",
        theme.edge_label_background,
        theme.edge_label_border
    ));
    out.push_str(&text_block_svg(x, y, block, font_size, theme, render, "normal"));
}

fn text_block_svg(
    x: f32,
    y: f32,
    block: &TextBlock,
    font_size: f32,
    theme: &Theme,
    render: &RenderConfig,
    weight: &str,
) -> String {
    let line_step = font_size * render.label_line_height;
    // Baseline of the first line so the block is vertically centered on y.
    let start_y = y - block.height / 2.0 + line_step / 2.0 + font_size * 0.35;
    let mut text = String::new();
    text.push_str(&format!(
        "<text x=\"{x:.2}\" y=\"{start_y:.2}\" text-anchor=\"middle\" font-size=\"{font_size:.1}\" font-weight=\"{weight}\" fill=\"{}\">",
        theme.text_color
    ));
    for (idx, line) in block.lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_step };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
}

fn push_legend(
    svg: &mut String,
    graph: &StateGraph,
    canvas: &Canvas,
    config: &Config,
    flavor: SvgFlavor,
) {
    let theme = &config.theme;
    let render = &config.render;
    let x = canvas.width - render.legend_width + 10.0;
    let mut y = TITLE_HEIGHT + 20.0;
    let font_size = theme.font_size;
    let swatch = 14.0;

    svg.push_str("<g class=\"legend\">");
    let row = |svg: &mut String, y: f32, marker: String, label: &str| {
        svg.push_str(&marker);
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{font_size:.1}\" fill=\"{}\">{}</text>",
            x + swatch + 10.0,
            y + swatch * 0.8,
            theme.text_color,
            escape_xml(label)
        ));
    };

    for phase in graph.phases() {
        let marker = format!(
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{swatch}\" height=\"{swatch}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"0.6\"/>",
            escape_xml(theme.phase_color(phase.index)),
            theme.node_border_color
        );
        row(svg, y, marker, &format!("Phase: {}", phase.id));
        y += LEGEND_ROW;
    }

    let half = swatch / 2.0;
    let regular = format!(
        "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{half}\" fill=\"#BBBBBB\" stroke=\"{}\"/>",
        x + half,
        y + half,
        theme.node_border_color
    );
    row(svg, y, regular, "Regular Node");
    y += LEGEND_ROW;

    let initial = format!(
        "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{swatch}\" height=\"{swatch}\" fill=\"#BBBBBB\" stroke=\"{}\" stroke-width=\"2\"/>",
        theme.node_border_color
    );
    row(svg, y, initial, "Initial Node");
    y += LEGEND_ROW;

    if flavor == SvgFlavor::Interactive {
        let selected = format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{half}\" fill=\"{}\" stroke=\"{}\"/>",
            x + half,
            y + half,
            escape_xml(&theme.selected_color),
            theme.node_border_color
        );
        row(svg, y, selected, "Selected Node");
        y += LEGEND_ROW;
    }

    let internal = format!(
        "<line x1=\"{x:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"1.4\"/>",
        y + half,
        x + swatch,
        y + half,
        theme.internal_edge_color
    );
    row(svg, y, internal, "Internal Edge");
    y += LEGEND_ROW;

    let transition = format!(
        "<line x1=\"{x:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"2.4\" stroke-dasharray=\"4 3\"/>",
        y + half,
        x + swatch,
        y + half,
        theme.transition_edge_color
    );
    row(svg, y, transition, "Phase Transition");
    svg.push_str("</g>");
}

struct EdgeGeometry {
    path: String,
    label_at: (f32, f32),
}

/// Perpendicular offset for each edge so parallel and antiparallel edges
/// between the same pair of nodes do not overlap. Self-loops get a growing
/// loop size instead.
fn edge_bends(edges: &[StateEdge]) -> Vec<f32> {
    let mut groups: HashMap<(&NodeKey, &NodeKey), Vec<usize>> = HashMap::new();
    for (idx, edge) in edges.iter().enumerate() {
        let pair = if edge.from <= edge.to {
            (&edge.from, &edge.to)
        } else {
            (&edge.to, &edge.from)
        };
        groups.entry(pair).or_default().push(idx);
    }

    let mut bends = vec![0.0; edges.len()];
    for members in groups.values() {
        let count = members.len() as f32;
        for (slot, &idx) in members.iter().enumerate() {
            let edge = &edges[idx];
            if edge.from == edge.to {
                bends[idx] = slot as f32;
                continue;
            }
            let offset = slot as f32 - (count - 1.0) / 2.0;
            let sign = if edge.from <= edge.to { 1.0 } else { -1.0 };
            bends[idx] = sign * offset * PARALLEL_EDGE_SPACING;
        }
    }
    bends
}

fn edge_geometry(from: (f32, f32), to: (f32, f32), bend: f32, node_radius: f32) -> EdgeGeometry {
    let (x0, y0) = from;
    let (x1, y1) = to;
    let dx = x1 - x0;
    let dy = y1 - y0;
    let len = (dx * dx + dy * dy).sqrt();

    if len < f32::EPSILON {
        let size = 1.0 + bend * 0.5;
        let r = node_radius;
        let top = y0 - r * 3.0 * size;
        let path = format!(
            "M {:.2} {:.2} C {:.2} {top:.2} {:.2} {top:.2} {:.2} {:.2}",
            x0 - r * 0.5,
            y0 - r * 0.85,
            x0 - r * 2.2 * size,
            x0 + r * 2.2 * size,
            x0 + r * 0.5,
            y0 - r * 0.85,
        );
        return EdgeGeometry {
            path,
            label_at: (x0, y0 - r * 2.4 * size),
        };
    }

    let nx = -dy / len;
    let ny = dx / len;
    let cx = (x0 + x1) / 2.0 + nx * bend;
    let cy = (y0 + y1) / 2.0 + ny * bend;

    let (sx, sy) = step_toward((x0, y0), (cx, cy), node_radius);
    let (ex, ey) = step_toward((x1, y1), (cx, cy), node_radius);

    let path = if bend.abs() < f32::EPSILON {
        format!("M {sx:.2} {sy:.2} L {ex:.2} {ey:.2}")
    } else {
        format!("M {sx:.2} {sy:.2} Q {cx:.2} {cy:.2} {ex:.2} {ey:.2}")
    };
    EdgeGeometry {
        path,
        label_at: (
            0.25 * x0 + 0.5 * cx + 0.25 * x1,
            0.25 * y0 + 0.5 * cy + 0.25 * y1,
        ),
    }
}

fn step_toward(from: (f32, f32), toward: (f32, f32), distance: f32) -> (f32, f32) {
    let dx = toward.0 - from.0;
    let dy = toward.1 - from.1;
    let len = (dx * dx + dy * dy).sqrt();
    if len < f32::EPSILON {
        return from;
    }
    let step = distance.min(len);
    (from.0 + dx / len * step, from.1 + dy / len * step)
}

fn place_label(
    anchor: (f32, f32),
    block: &TextBlock,
    occupied: &mut Vec<(f32, f32, f32, f32)>,
) -> (f32, f32) {
    let (x, mid_y) = anchor;
    let mut offset = 0.0;
    for _ in 0..6 {
        let y = mid_y + offset;
        let rect = (
            x - block.width / 2.0 - LABEL_PAD_X,
            y - block.height / 2.0 - LABEL_PAD_Y,
            block.width + 2.0 * LABEL_PAD_X,
            block.height + 2.0 * LABEL_PAD_Y,
        );
        if !collides(&rect, occupied) {
            occupied.push(rect);
            return (x, y);
        }
        offset += block.height + 6.0;
    }
    (x, mid_y)
}

fn collides(rect: &(f32, f32, f32, f32), occupied: &[(f32, f32, f32, f32)]) -> bool {
    occupied.iter().any(|(x, y, w, h)| {
        rect.0 < x + w && rect.0 + rect.2 > *x && rect.1 < y + h && rect.1 + rect.3 > *y
    })
}

pub(crate) fn node_hover_lines(node: &StateNode) -> Vec<String> {
    let mut lines = vec![
        format!("Node: {}", node.key.node),
        format!("Phase: {}", node.key.phase),
        format!("Description: {}", node.description.as_deref().unwrap_or("")),
        format!("Variables: {}", format_mapping(Some(&node.vars))),
    ];
    // `desc` already has its own line.
    let params: Map<String, Value> = node
        .params
        .iter()
        .filter(|(key, _)| key.as_str() != "desc")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    if !params.is_empty() {
        lines.push(format!("Params: {}", format_mapping(Some(&params))));
    }
    lines.push(format!("Initial: {}", node.is_initial));
    lines
}

pub(crate) fn edge_hover_lines(edge: &StateEdge) -> Vec<String> {
    let mut lines = vec![
        format!("From: {}", edge.from),
        format!("To: {}", edge.to),
        format!("Condition: {}", edge.condition.as_deref().unwrap_or("Always")),
    ];
    if !edge.actions.is_empty() {
        lines.push(format!("Actions: {}", format_mapping(Some(&edge.actions))));
    }
    lines.push(format!("Type: {}", edge.kind.name()));
    lines
}

pub fn write_output_svg(svg: &str, output: &Path) -> Result<()> {
    std::fs::write(output, svg)?;
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "DejaVu Sans".to_string();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let scale = render_cfg.png_scale.max(0.1);
    let size = tree.size();
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width.max(1), height.max(1))
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate {width}x{height} pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    Ok(())
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

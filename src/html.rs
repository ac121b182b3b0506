//! Self-contained interactive HTML output.
//!
//! The page embeds the same SVG the static renderer produces, annotated with
//! per-node and per-edge hover text, plus a small inline script for tooltips,
//! drag-to-pan, wheel zoom, and click-to-select with a reset button. No
//! external assets are referenced.

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::graph::StateGraph;
use crate::layout::Layout;
use crate::render::{SvgFlavor, escape_xml, render_svg_flavored};

const STYLE: &str = r#"
body { margin: 0; background: #f5f6f8; font-family: sans-serif; color: #1c2430; }
#toolbar { display: flex; gap: 12px; align-items: center; padding: 8px 14px; background: #ffffff; border-bottom: 1px solid #d9dde3; }
#toolbar button { padding: 4px 14px; cursor: pointer; }
#stage { position: relative; overflow: hidden; }
#stage svg { display: block; width: 100%; height: calc(100vh - 90px); cursor: grab; background: #ffffff; }
#stage svg.panning { cursor: grabbing; }
#tooltip { position: fixed; pointer-events: none; display: none; white-space: pre; font-size: 12px; padding: 6px 8px; background: rgba(255, 255, 224, 0.96); border: 1px solid #999999; border-radius: 4px; box-shadow: 0 2px 6px rgba(0, 0, 0, 0.2); }
#info { position: absolute; top: 10px; left: 10px; display: none; white-space: pre; font-size: 13px; padding: 8px 10px; background: lightyellow; border: 1px solid #999999; border-radius: 6px; }
#footer { padding: 4px 14px; font-size: 12px; color: gray; }
.node, .edge { cursor: pointer; }
"#;

const SCRIPT: &str = r#"
(function () {
  const svg = document.getElementById('graph');
  const tooltip = document.getElementById('tooltip');
  const info = document.getElementById('info');
  const selectedColor = document.body.dataset.selectedColor;
  const initial = svg.getAttribute('viewBox').split(/\s+/).map(Number);
  let view = initial.slice();
  let selected = null;
  let drag = null;

  function applyView() {
    svg.setAttribute('viewBox', view.map(function (v) { return v.toFixed(2); }).join(' '));
  }

  function toGraph(event) {
    const rect = svg.getBoundingClientRect();
    const scale = Math.max(view[2] / rect.width, view[3] / rect.height);
    const offsetX = (rect.width * scale - view[2]) / 2;
    const offsetY = (rect.height * scale - view[3]) / 2;
    return {
      x: view[0] - offsetX + (event.clientX - rect.left) * scale,
      y: view[1] - offsetY + (event.clientY - rect.top) * scale,
      scale: scale
    };
  }

  svg.addEventListener('wheel', function (event) {
    event.preventDefault();
    const at = toGraph(event);
    const factor = event.deltaY < 0 ? 0.9 : 1.1;
    view = [
      at.x - (at.x - view[0]) * factor,
      at.y - (at.y - view[1]) * factor,
      view[2] * factor,
      view[3] * factor
    ];
    applyView();
  }, { passive: false });

  svg.addEventListener('mousedown', function (event) {
    drag = { x: event.clientX, y: event.clientY, view: view.slice(), moved: false };
    svg.classList.add('panning');
  });

  window.addEventListener('mousemove', function (event) {
    if (drag) {
      const scale = toGraph(event).scale;
      const dx = event.clientX - drag.x;
      const dy = event.clientY - drag.y;
      if (Math.abs(dx) + Math.abs(dy) > 3) { drag.moved = true; }
      view = [drag.view[0] - dx * scale, drag.view[1] - dy * scale, view[2], view[3]];
      applyView();
    }
    const target = event.target.closest ? event.target.closest('.node, .edge') : null;
    if (target && !drag) {
      tooltip.textContent = target.dataset.hover;
      tooltip.style.left = (event.clientX + 14) + 'px';
      tooltip.style.top = (event.clientY + 14) + 'px';
      tooltip.style.display = 'block';
    } else {
      tooltip.style.display = 'none';
    }
  });

  window.addEventListener('mouseup', function (event) {
    if (!drag) { return; }
    const moved = drag.moved;
    drag = null;
    svg.classList.remove('panning');
    if (moved) { return; }
    const node = event.target.closest ? event.target.closest('.node') : null;
    if (node) { select(node); }
  });

  function paint(node, color) {
    const shape = node.querySelector('.shape');
    if (shape) { shape.setAttribute('fill', color); }
  }

  function select(node) {
    if (selected) { paint(selected, selected.dataset.fill); }
    selected = node;
    paint(node, selectedColor);
    info.textContent = node.dataset.hover;
    info.style.display = 'block';
  }

  document.getElementById('reset').addEventListener('click', function () {
    if (selected) { paint(selected, selected.dataset.fill); }
    selected = null;
    info.style.display = 'none';
    view = initial.slice();
    applyView();
  });
})();
"#;

pub fn render_html(graph: &StateGraph, layout: &Layout, config: &Config) -> String {
    let svg = render_svg_flavored(graph, layout, config, SvgFlavor::Interactive);
    let title = escape_xml(&config.render.title);
    let summary = format!(
        "{} phases, {} nodes, {} edges",
        graph.phases().len(),
        graph.node_count(),
        graph.edge_count()
    );

    let mut html = String::with_capacity(svg.len() + STYLE.len() + SCRIPT.len() + 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{title}</title>\n"));
    html.push_str(&format!("<style>{STYLE}</style>\n</head>\n"));
    html.push_str(&format!(
        "<body data-selected-color=\"{}\">\n",
        escape_xml(&config.theme.selected_color)
    ));
    html.push_str(&format!(
        "<div id=\"toolbar\"><strong>{title}</strong><span>{summary}</span><button id=\"reset\" type=\"button\">Reset</button></div>\n"
    ));
    html.push_str("<div id=\"stage\">\n");
    html.push_str(&svg);
    html.push_str("\n<div id=\"info\"></div>\n</div>\n");
    html.push_str("<div id=\"tooltip\"></div>\n");
    html.push_str(
        "<div id=\"footer\">Interactive HTML visualization with edge conditions</div>\n",
    );
    html.push_str(&format!("<script>{SCRIPT}</script>\n</body>\n</html>\n"));
    html
}

pub fn write_output_html(html: &str, output: &Path) -> Result<()> {
    std::fs::write(output, html)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::GraphDocument;
    use crate::layout::compute_layout;

    fn sample_html() -> String {
        let doc = GraphDocument::from_json_str(
            r#"{"phases":[
                {"id":"p1","initial_state":"s0",
                 "nodes":[{"id":"s0","params":{"desc":"start"},"vars":{"count":0}},{"id":"s1"}],
                 "edges":[{"from":"s0","to":"s1","condition":"x>0","actions":{"count":1}}]},
                {"id":"p2","initial_state":"t0","nodes":[{"id":"t0"}]}
            ],"phase_edges":[{"from":"p1","to":"p2","condition":"finished"}]}"#,
        )
        .unwrap();
        let graph = StateGraph::build(&doc);
        let mut config = Config::default();
        config.render.fast_text_metrics = true;
        let layout = compute_layout(&graph, &config.layout);
        render_html(&graph, &layout, &config)
    }

    #[test]
    fn html_is_self_contained() {
        let html = sample_html();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<svg xmlns=\"http://www.w3.org/2000/svg\" id=\"graph\""));
        assert!(html.contains("<script>"));
        assert!(!html.contains("src=\"http"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn nodes_carry_hover_text() {
        let html = sample_html();
        assert!(html.contains("data-key=\"p1::s0\""));
        assert!(html.contains("Node: s0\nPhase: p1\nDescription: start\nVariables: {count: 0}\nInitial: true"));
        assert_eq!(html.matches("class=\"node\"").count(), 3);
    }

    #[test]
    fn edges_carry_hover_text() {
        let html = sample_html();
        assert!(html.contains("Condition: x&gt;0"));
        assert!(html.contains("Actions: {count: 1}"));
        assert!(html.contains("Type: internal"));
        assert!(html.contains("Type: phase_transition"));
        assert_eq!(html.matches("class=\"edge\"").count(), 2);
    }

    #[test]
    fn extra_params_show_in_node_hover() {
        let doc = GraphDocument::from_json_str(
            r#"{"phases":[{"id":"p","nodes":[
                {"id":"x","params":{"desc":"d","timeout":42,"mode":"safe"}}
            ]}]}"#,
        )
        .unwrap();
        let graph = StateGraph::build(&doc);
        let mut config = Config::default();
        config.render.fast_text_metrics = true;
        let layout = compute_layout(&graph, &config.layout);
        let html = render_html(&graph, &layout, &config);
        assert!(html.contains("Description: d\nVariables: {}\nParams: {timeout: 42, mode: safe}\nInitial: false"));
        assert!(!html.contains("desc: d"));
    }

    #[test]
    fn selection_controls_are_present() {
        let html = sample_html();
        assert!(html.contains("id=\"reset\""));
        assert!(html.contains("data-selected-color=\"orange\""));
        assert!(html.contains("Selected Node"));
    }
}

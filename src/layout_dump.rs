use crate::graph::StateGraph;
use crate::layout::Layout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub phases: Vec<PhaseDump>,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct PhaseDump {
    pub id: String,
    pub center: [f32; 2],
    pub boundary_radius: f32,
    pub nodes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub phase: String,
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub initial: bool,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    pub kind: &'static str,
    pub condition: Option<String>,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, graph: &StateGraph) -> Self {
        let phases = layout
            .phases
            .iter()
            .map(|phase| PhaseDump {
                id: phase.id.clone(),
                center: [phase.center.x, phase.center.y],
                boundary_radius: phase.boundary_radius,
                nodes: phase.nodes.iter().map(|key| key.node.clone()).collect(),
            })
            .collect();

        let nodes = graph
            .nodes()
            .filter_map(|node| {
                let point = layout.position(&node.key)?;
                Some(NodeDump {
                    phase: node.key.phase.clone(),
                    id: node.key.node.clone(),
                    x: point.x,
                    y: point.y,
                    initial: node.is_initial,
                })
            })
            .collect();

        let edges = graph
            .edges()
            .iter()
            .map(|edge| EdgeDump {
                from: edge.from.to_string(),
                to: edge.to.to_string(),
                kind: edge.kind.name(),
                condition: edge.condition.clone(),
                points: [&edge.from, &edge.to]
                    .into_iter()
                    .filter_map(|key| layout.position(key))
                    .map(|point| [point.x, point.y])
                    .collect(),
            })
            .collect();

        let bounds = layout.bounds();
        LayoutDump {
            width: bounds.width(),
            height: bounds.height(),
            phases,
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout, graph: &StateGraph) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, graph);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

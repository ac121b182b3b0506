//! Fixed ring layout.
//!
//! Positions depend only on the number of phases and the number of nodes in
//! each phase; edges play no part. Coordinates are in abstract layout units
//! with y pointing up. Renderers scale and flip them onto a canvas.

use std::f32::consts::TAU;

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::{LayoutConfig, PhaseArrangement};
use crate::graph::{NodeKey, StateGraph};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone)]
pub struct PhaseLayout {
    pub id: String,
    pub index: usize,
    pub center: Point,
    pub boundary_radius: f32,
    pub label_anchor: Point,
    pub nodes: Vec<NodeKey>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    fn around(point: Point, radius: f32) -> Self {
        Self {
            min_x: point.x - radius,
            min_y: point.y - radius,
            max_x: point.x + radius,
            max_y: point.y + radius,
        }
    }

    fn union(self, other: Bounds) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub phases: Vec<PhaseLayout>,
    pub positions: IndexMap<NodeKey, Point>,
}

impl Layout {
    pub fn position(&self, key: &NodeKey) -> Option<Point> {
        self.positions.get(key).copied()
    }

    /// Box covering every phase boundary, phase label, and node.
    pub fn bounds(&self) -> Bounds {
        let mut bounds: Option<Bounds> = None;
        let mut extend = |next: Bounds| {
            bounds = Some(match bounds {
                Some(current) => current.union(next),
                None => next,
            });
        };
        for phase in &self.phases {
            extend(Bounds::around(phase.center, phase.boundary_radius));
            extend(Bounds::around(phase.label_anchor, 0.0));
        }
        for point in self.positions.values() {
            extend(Bounds::around(*point, 0.0));
        }
        bounds.unwrap_or(Bounds::around(Point::ORIGIN, 1.0))
    }
}

/// Centers for `count` phases.
pub fn phase_centers(count: usize, config: &LayoutConfig) -> Vec<Point> {
    match count {
        0 => Vec::new(),
        1 => vec![Point::ORIGIN],
        2 => {
            let half = config.phase_spacing / 2.0;
            vec![Point::new(-half, 0.0), Point::new(half, 0.0)]
        }
        _ => match config.arrangement {
            PhaseArrangement::Ring => (0..count)
                .map(|i| {
                    let angle = TAU * i as f32 / count as f32;
                    Point::new(
                        config.phase_ring_radius * angle.cos(),
                        config.phase_ring_radius * angle.sin(),
                    )
                })
                .collect(),
            PhaseArrangement::Row => {
                let offset = (count - 1) as f32 * config.row_spacing / 2.0;
                (0..count)
                    .map(|i| Point::new(i as f32 * config.row_spacing - offset, 0.0))
                    .collect()
            }
        },
    }
}

/// Positions for `count` nodes around `center`; a lone node sits on it.
pub fn ring_positions(center: Point, count: usize, radius: f32) -> Vec<Point> {
    if count == 1 {
        return vec![center];
    }
    (0..count)
        .map(|j| {
            let angle = TAU * j as f32 / count as f32;
            Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

pub fn compute_layout(graph: &StateGraph, config: &LayoutConfig) -> Layout {
    let centers = phase_centers(graph.phases().len(), config);
    let mut layout = Layout::default();

    for (phase, center) in graph.phases().iter().zip(centers) {
        let points = ring_positions(center, phase.nodes.len(), config.node_ring_radius);
        for (key, point) in phase.nodes.iter().zip(points) {
            layout.positions.insert(key.clone(), point);
        }
        layout.phases.push(PhaseLayout {
            id: phase.id.clone(),
            index: phase.index,
            center,
            boundary_radius: config.boundary_radius,
            label_anchor: Point::new(center.x, center.y + config.label_offset),
            nodes: phase.nodes.clone(),
        });
    }

    tracing::debug!(
        phases = layout.phases.len(),
        nodes = layout.positions.len(),
        arrangement = ?config.arrangement,
        "computed ring layout"
    );
    layout
}

//! Directed multigraph built from a [`GraphDocument`].
//!
//! Nodes are keyed by `(phase, node)` and kept in declaration order, which
//! both the layout and the phase-edge resolution rely on. Parallel edges are
//! allowed: every declared edge becomes its own [`StateEdge`].

use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::document::{GraphDocument, PhaseEdgeSpec};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub phase: String,
    pub node: String,
}

impl NodeKey {
    pub fn new(phase: impl Into<String>, node: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            node: node.into(),
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.phase, self.node)
    }
}

#[derive(Debug, Clone)]
pub struct StateNode {
    pub key: NodeKey,
    /// Declaration index of the owning phase; selects the palette color.
    pub phase_index: usize,
    pub description: Option<String>,
    pub params: Map<String, Value>,
    pub vars: Map<String, Value>,
    pub is_initial: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeKind {
    Internal { phase: String },
    PhaseTransition { from_phase: String, to_phase: String },
}

impl EdgeKind {
    pub fn is_transition(&self) -> bool {
        matches!(self, EdgeKind::PhaseTransition { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            EdgeKind::Internal { .. } => "internal",
            EdgeKind::PhaseTransition { .. } => "phase_transition",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StateEdge {
    pub from: NodeKey,
    pub to: NodeKey,
    pub condition: Option<String>,
    pub actions: Map<String, Value>,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone)]
pub struct PhaseEntry {
    pub id: String,
    pub index: usize,
    pub initial_state: Option<String>,
    /// Node keys in declaration order.
    pub nodes: Vec<NodeKey>,
}

/// Outcome of mapping a phase-level transition onto concrete nodes.
///
/// The source endpoint is the first declared node of the source phase and
/// the target endpoint is the declared initial node of the target phase.
/// Every other outcome means the transition is left out of the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseEdgeResolution {
    Resolved { from: NodeKey, to: NodeKey },
    UnknownPhase(String),
    EmptySourcePhase(String),
    MissingInitialState(String),
    UndeclaredInitialState(NodeKey),
    /// Source and target name the same phase.
    SamePhase(String),
}

#[derive(Debug, Clone, Default)]
pub struct StateGraph {
    phases: Vec<PhaseEntry>,
    nodes: IndexMap<NodeKey, StateNode>,
    edges: Vec<StateEdge>,
}

impl StateGraph {
    pub fn build(document: &GraphDocument) -> Self {
        let mut graph = StateGraph::default();

        for phase in &document.phases {
            let phase_index = graph.phase_entry_index(&phase.id);
            if let Some(initial) = phase.initial_state() {
                graph.phases[phase_index].initial_state = Some(initial.to_string());
            }

            for node in &phase.nodes {
                let key = NodeKey::new(&phase.id, &node.id);
                let state = StateNode {
                    key: key.clone(),
                    phase_index,
                    description: node.description(),
                    params: node.params.clone().unwrap_or_default(),
                    vars: node.vars.clone().unwrap_or_default(),
                    is_initial: false,
                };
                if graph.nodes.insert(key.clone(), state).is_some() {
                    warn!(node = %key, "duplicate node id; later declaration overwrites earlier");
                } else {
                    graph.phases[phase_index].nodes.push(key);
                }
            }

            for edge in &phase.edges {
                let from = NodeKey::new(&phase.id, &edge.from);
                let to = NodeKey::new(&phase.id, &edge.to);
                if !graph.nodes.contains_key(&from) || !graph.nodes.contains_key(&to) {
                    debug!(%from, %to, "edge references an undeclared node; omitted");
                    continue;
                }
                graph.edges.push(StateEdge {
                    from,
                    to,
                    condition: edge.condition().map(str::to_string),
                    actions: edge.actions.clone().unwrap_or_default(),
                    kind: EdgeKind::Internal {
                        phase: phase.id.clone(),
                    },
                });
            }
        }

        // Merged phases may redeclare the initial state, so mark only once the
        // last declaration is known.
        for node in graph.nodes.values_mut() {
            let initial = graph.phases[node.phase_index].initial_state.as_deref();
            node.is_initial = initial == Some(node.key.node.as_str());
        }

        for link in &document.phase_edges {
            match graph.resolve_phase_edge(link) {
                PhaseEdgeResolution::Resolved { from, to } => graph.edges.push(StateEdge {
                    from,
                    to,
                    condition: link.condition().map(str::to_string),
                    actions: Map::new(),
                    kind: EdgeKind::PhaseTransition {
                        from_phase: link.from.clone(),
                        to_phase: link.to.clone(),
                    },
                }),
                unresolved => {
                    debug!(from = %link.from, to = %link.to, reason = ?unresolved, "phase edge dropped");
                }
            }
        }

        debug!(
            phases = graph.phases.len(),
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "built state graph"
        );
        graph
    }

    fn phase_entry_index(&mut self, id: &str) -> usize {
        if let Some(index) = self.phases.iter().position(|phase| phase.id == id) {
            warn!(phase = id, "duplicate phase id; merging into first declaration");
            return index;
        }
        let index = self.phases.len();
        self.phases.push(PhaseEntry {
            id: id.to_string(),
            index,
            initial_state: None,
            nodes: Vec::new(),
        });
        index
    }

    pub fn resolve_phase_edge(&self, link: &PhaseEdgeSpec) -> PhaseEdgeResolution {
        let Some(source) = self.phase(&link.from) else {
            return PhaseEdgeResolution::UnknownPhase(link.from.clone());
        };
        let Some(target) = self.phase(&link.to) else {
            return PhaseEdgeResolution::UnknownPhase(link.to.clone());
        };
        if source.id == target.id {
            return PhaseEdgeResolution::SamePhase(source.id.clone());
        }
        let Some(from) = source.nodes.first() else {
            return PhaseEdgeResolution::EmptySourcePhase(source.id.clone());
        };
        let Some(initial) = target.initial_state.as_deref() else {
            return PhaseEdgeResolution::MissingInitialState(target.id.clone());
        };
        let to = NodeKey::new(&target.id, initial);
        if !self.nodes.contains_key(&to) {
            return PhaseEdgeResolution::UndeclaredInitialState(to);
        }
        PhaseEdgeResolution::Resolved {
            from: from.clone(),
            to,
        }
    }

    pub fn phases(&self) -> &[PhaseEntry] {
        &self.phases
    }

    pub fn phase(&self, id: &str) -> Option<&PhaseEntry> {
        self.phases.iter().find(|phase| phase.id == id)
    }

    pub fn node(&self, key: &NodeKey) -> Option<&StateNode> {
        self.nodes.get(key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &StateNode> {
        self.nodes.values()
    }

    pub fn edges(&self) -> &[StateEdge] {
        &self.edges
    }

    pub fn initial_nodes(&self) -> impl Iterator<Item = &StateNode> {
        self.nodes.values().filter(|node| node.is_initial)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

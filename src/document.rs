//! Input schema for multi-phase state graph documents.
//!
//! The document is a direct mirror of the JSON file: a list of phases, each
//! holding its nodes and intra-phase edges, plus optional phase-level
//! transitions. Nothing here is validated beyond what serde enforces; the
//! graph builder decides what to do with dangling references.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::LoadError;
use crate::text::display_value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    pub phases: Vec<PhaseSpec>,
    #[serde(default)]
    pub phase_edges: Vec<PhaseEdgeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseSpec {
    pub id: String,
    #[serde(default)]
    pub initial_state: Option<String>,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
    #[serde(default)]
    pub vars: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub actions: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseEdgeSpec {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub condition: Option<String>,
}

impl GraphDocument {
    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    pub fn node_count(&self) -> usize {
        self.phases.iter().map(|phase| phase.nodes.len()).sum()
    }

    pub fn edge_count(&self) -> usize {
        self.phases.iter().map(|phase| phase.edges.len()).sum()
    }
}

impl PhaseSpec {
    /// The declared initial state; an empty string counts as undeclared.
    pub fn initial_state(&self) -> Option<&str> {
        self.initial_state
            .as_deref()
            .filter(|state| !state.is_empty())
    }
}

impl NodeSpec {
    pub fn description(&self) -> Option<String> {
        let desc = self.params.as_ref()?.get("desc")?;
        let text = display_value(desc);
        if text.is_empty() { None } else { Some(text) }
    }
}

impl EdgeSpec {
    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref().filter(|cond| !cond.is_empty())
    }
}

impl PhaseEdgeSpec {
    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref().filter(|cond| !cond.is_empty())
    }
}

/// Reads and parses a graph document from disk.
pub fn load_document(path: &Path) -> Result<GraphDocument, LoadError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(LoadError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let document =
        GraphDocument::from_json_str(&contents).map_err(|source| LoadError::MalformedInput {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(
        path = %path.display(),
        phases = document.phases.len(),
        phase_edges = document.phase_edges.len(),
        "loaded graph document"
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fsmviz-doc-{}-{name}", std::process::id()))
    }

    #[test]
    fn parses_phases_and_defaults() {
        let doc = GraphDocument::from_json_str(
            r#"{"phases":[{"id":"a","nodes":[{"id":"x"}]},{"id":"b"},{"id":"c","edges":[]}]}"#,
        )
        .unwrap();
        assert_eq!(doc.phases.len(), 3);
        assert!(doc.phase_edges.is_empty());
        assert!(doc.phases[1].nodes.is_empty());
        assert!(doc.phases[1].edges.is_empty());
        assert_eq!(doc.phases[0].initial_state(), None);
    }

    #[test]
    fn empty_initial_state_counts_as_missing() {
        let doc =
            GraphDocument::from_json_str(r#"{"phases":[{"id":"a","initial_state":""}]}"#).unwrap();
        assert_eq!(doc.phases[0].initial_state(), None);
    }

    #[test]
    fn node_description_comes_from_params() {
        let doc = GraphDocument::from_json_str(
            r#"{"phases":[{"id":"a","nodes":[
                {"id":"x","params":{"desc":"idle","timeout":5}},
                {"id":"y","params":null},
                {"id":"z","params":{"desc":""}}
            ]}]}"#,
        )
        .unwrap();
        let nodes = &doc.phases[0].nodes;
        assert_eq!(nodes[0].description().as_deref(), Some("idle"));
        assert_eq!(nodes[1].description(), None);
        assert_eq!(nodes[2].description(), None);
    }

    #[test]
    fn missing_phases_is_malformed() {
        assert!(GraphDocument::from_json_str(r#"{"phase_edges":[]}"#).is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let path = temp_path("does-not-exist.json");
        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
        assert_eq!(err.path(), path.as_path());
        assert!(err.to_string().contains("could not find file"));
    }

    #[test]
    fn load_reports_malformed_json() {
        let path = temp_path("broken.json");
        std::fs::write(&path, "{ \"phases\": [ ").unwrap();
        let err = load_document(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, LoadError::MalformedInput { .. }));
        assert!(err.to_string().starts_with("invalid JSON format"));
    }

    #[test]
    fn load_reads_well_formed_file() {
        let path = temp_path("ok.json");
        std::fs::write(
            &path,
            r#"{"phases":[{"id":"p1"},{"id":"p2"}],"phase_edges":[{"from":"p1","to":"p2"}]}"#,
        )
        .unwrap();
        let doc = load_document(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(doc.phases.len(), 2);
        assert_eq!(doc.phase_edges.len(), 1);
        assert_eq!(doc.phase_edges[0].condition(), None);
    }
}

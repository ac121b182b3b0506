use std::fmt;

use crate::document::GraphDocument;
use crate::text::format_mapping;

/// Human-readable overview of a document, printed before rendering.
pub struct GraphSummary<'a> {
    document: &'a GraphDocument,
}

impl<'a> GraphSummary<'a> {
    pub fn new(document: &'a GraphDocument) -> Self {
        Self { document }
    }
}

impl fmt::Display for GraphSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = self.document;
        writeln!(f, "=== GRAPH INFORMATION ===")?;
        writeln!(f, "Number of phases: {}", doc.phases.len())?;
        writeln!(f, "Total nodes: {}", doc.node_count())?;
        writeln!(f, "Total internal edges: {}", doc.edge_count())?;

        for phase in &doc.phases {
            writeln!(f)?;
            writeln!(f, "Phase: {}", phase.id)?;
            writeln!(
                f,
                "  Initial state: {}",
                phase.initial_state().unwrap_or("Not specified")
            )?;
            writeln!(f, "  Nodes: {}", phase.nodes.len())?;
            for node in &phase.nodes {
                let desc = node.description();
                writeln!(
                    f,
                    "    - {}: {}",
                    node.id,
                    desc.as_deref().unwrap_or("No description")
                )?;
                if let Some(vars) = node.vars.as_ref().filter(|vars| !vars.is_empty()) {
                    writeln!(f, "      Variables: {}", format_mapping(Some(vars)))?;
                }
            }
            writeln!(f, "  Edges: {}", phase.edges.len())?;
            for edge in &phase.edges {
                write!(
                    f,
                    "    - {} -> {} (Condition: {})",
                    edge.from,
                    edge.to,
                    edge.condition().unwrap_or("Always")
                )?;
                if let Some(actions) = edge.actions.as_ref().filter(|a| !a.is_empty()) {
                    write!(f, " -> Actions: {}", format_mapping(Some(actions)))?;
                }
                writeln!(f)?;
            }
        }

        if !doc.phase_edges.is_empty() {
            writeln!(f)?;
            writeln!(f, "Phase transitions: {}", doc.phase_edges.len())?;
            for edge in &doc.phase_edges {
                writeln!(
                    f,
                    "  - {} -> {} (Condition: {})",
                    edge.from,
                    edge.to,
                    edge.condition().unwrap_or("Always")
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_phases_nodes_and_transitions() {
        let doc = GraphDocument::from_json_str(
            r#"{"phases":[
                {"id":"p1","initial_state":"s0",
                 "nodes":[{"id":"s0","params":{"desc":"start"},"vars":{"n":1}},{"id":"s1"}],
                 "edges":[{"from":"s0","to":"s1","condition":"x>0","actions":{"n":2}},{"from":"s1","to":"s0"}]},
                {"id":"p2","nodes":[]}
            ],"phase_edges":[{"from":"p1","to":"p2"}]}"#,
        )
        .unwrap();
        let text = GraphSummary::new(&doc).to_string();
        assert!(text.contains("Number of phases: 2"));
        assert!(text.contains("Total nodes: 2"));
        assert!(text.contains("    - s0: start"));
        assert!(text.contains("      Variables: {n: 1}"));
        assert!(text.contains("    - s1: No description"));
        assert!(text.contains("    - s0 -> s1 (Condition: x>0) -> Actions: {n: 2}"));
        assert!(text.contains("    - s1 -> s0 (Condition: Always)\n"));
        assert!(text.contains("  Initial state: Not specified"));
        assert!(text.contains("Phase transitions: 1"));
        assert!(text.contains("  - p1 -> p2 (Condition: Always)"));
    }
}

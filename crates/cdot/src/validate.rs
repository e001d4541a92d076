//! Check emitted text against a real DOT grammar.
//!
//! Available with the `graphviz` feature.

use dot_structures::{Graph, Stmt};
use log::debug;

use crate::error::CdotError;

/// Statement counts of a parsed DOT graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DotSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Parse `dot` with `graphviz-rust` and count its node and edge statements.
///
/// # Errors
///
/// Returns [`CdotError::InvalidDot`] if the text is not a DOT graph, or is
/// an undirected one.
pub fn check_dot(dot: &str) -> Result<DotSummary, CdotError> {
    let graph = graphviz_rust::parse(dot).map_err(CdotError::InvalidDot)?;

    let Graph::DiGraph { stmts, .. } = graph else {
        return Err(CdotError::InvalidDot(
            "expected a directed graph".to_string(),
        ));
    };

    let mut summary = DotSummary { nodes: 0, edges: 0 };
    for stmt in &stmts {
        match stmt {
            Stmt::Node(_) => summary.nodes += 1,
            Stmt::Edge(_) => summary.edges += 1,
            _ => {}
        }
    }

    debug!(nodes = summary.nodes, edges = summary.edges; "DOT output validated");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_statements() {
        let dot = "digraph {\n\trankdir=\"BT\";\n\tn0[ label=\"root\", shape=\"box\" ];\n\tn1[ label=\"x\" ];\n\tn1 -> n0;\n}\n";
        let summary = check_dot(dot).unwrap();
        assert_eq!(summary, DotSummary { nodes: 2, edges: 1 });
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            check_dot("digraph {"),
            Err(CdotError::InvalidDot(_))
        ));
    }

    #[test]
    fn test_rejects_undirected_graph() {
        assert!(matches!(
            check_dot("graph { a -- b; }"),
            Err(CdotError::InvalidDot(_))
        ));
    }
}

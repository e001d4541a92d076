//! Append-only DOT text accumulator.

use std::borrow::Cow;

use crate::{id::NodeId, policy::Shape};

/// Escape a label for use inside a quoted DOT string.
///
/// Every `"` becomes `\"`. Labels without quotes are returned unchanged.
pub fn escape_label(label: &str) -> Cow<'_, str> {
    if label.contains('"') {
        Cow::Owned(label.replace('"', "\\\""))
    } else {
        Cow::Borrowed(label)
    }
}

/// Accumulates the statements of one directed graph.
///
/// Statements are written in call order and never reordered. The buffer
/// does not check that the graph is well formed; that is the visitor's job.
#[derive(Debug, Clone)]
pub struct DotBuffer {
    text: String,
    id_prefix: String,
    trailing_newline: bool,
    nodes: usize,
    edges: usize,
}

impl DotBuffer {
    /// Create an empty buffer.
    ///
    /// # Arguments
    ///
    /// * `id_prefix` - Text written before every node identifier.
    /// * `trailing_newline` - Whether the closing `}` is followed by a newline.
    pub fn new(id_prefix: impl Into<String>, trailing_newline: bool) -> Self {
        Self {
            text: String::new(),
            id_prefix: id_prefix.into(),
            trailing_newline,
            nodes: 0,
            edges: 0,
        }
    }

    pub fn open_graph(&mut self) {
        self.text.push_str("digraph {\n");
    }

    /// Write the `rankdir` statement.
    pub fn rank_direction(&mut self, direction: &str) {
        self.text.push_str("\trankdir=\"");
        self.text.push_str(direction);
        self.text.push_str("\";\n");
    }

    /// Declare a node. The label is escaped here.
    pub fn node(&mut self, id: NodeId, label: &str, shape: Shape) {
        self.text.push('\t');
        self.push_id(id);
        self.text.push_str("[ label=\"");
        self.text.push_str(&escape_label(label));
        self.text.push('"');
        if let Some(shape) = shape.dot_attribute() {
            self.text.push_str(", shape=\"");
            self.text.push_str(shape);
            self.text.push('"');
        }
        self.text.push_str(" ];\n");
        self.nodes += 1;
    }

    /// Write an edge from `child` to `parent`.
    pub fn edge(&mut self, child: NodeId, parent: NodeId) {
        self.text.push('\t');
        self.push_id(child);
        self.text.push_str(" -> ");
        self.push_id(parent);
        self.text.push_str(";\n");
        self.edges += 1;
    }

    pub fn close_graph(&mut self) {
        self.text.push('}');
        if self.trailing_newline {
            self.text.push('\n');
        }
    }

    /// Number of node statements written.
    pub fn node_count(&self) -> usize {
        self.nodes
    }

    /// Number of edge statements written.
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// Drop everything written so far.
    pub fn clear(&mut self) {
        self.text.clear();
        self.nodes = 0;
        self.edges = 0;
    }

    pub fn into_string(self) -> String {
        self.text
    }

    fn push_id(&mut self, id: NodeId) {
        self.text.push_str(&self.id_prefix);
        self.text.push_str(&id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdAllocator;

    #[test]
    fn test_escape_label() {
        assert_eq!(escape_label("a\"b"), "a\\\"b");
        assert_eq!(escape_label("\"\""), "\\\"\\\"");
        assert!(matches!(escape_label("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_statement_forms() {
        let mut ids = IdAllocator::new(0);
        let root = ids.next_id();
        let leaf = ids.next_id();

        let mut buffer = DotBuffer::new("n", true);
        buffer.open_graph();
        buffer.rank_direction("BT");
        buffer.node(root, "root", Shape::Box);
        buffer.node(leaf, "x", Shape::Blob);
        buffer.edge(leaf, root);
        buffer.close_graph();

        assert_eq!(buffer.node_count(), 2);
        assert_eq!(buffer.edge_count(), 1);
        assert_eq!(
            buffer.into_string(),
            "digraph {\n\trankdir=\"BT\";\n\tn0[ label=\"root\", shape=\"box\" ];\n\tn1[ label=\"x\" ];\n\tn1 -> n0;\n}\n"
        );
    }

    #[test]
    fn test_node_label_is_escaped() {
        let mut buffer = DotBuffer::new("n", true);
        buffer.node(IdAllocator::new(0).next_id(), "\"hi\"", Shape::Blob);
        assert_eq!(buffer.into_string(), "\tn0[ label=\"\\\"hi\\\"\" ];\n");
    }

    #[test]
    fn test_custom_prefix_without_trailing_newline() {
        let mut ids = IdAllocator::new(10);
        let mut buffer = DotBuffer::new("node_", false);
        buffer.open_graph();
        buffer.edge(ids.next_id(), ids.next_id());
        buffer.close_graph();

        assert_eq!(buffer.into_string(), "digraph {\n\tnode_10 -> node_11;\n}");
    }

    #[test]
    fn test_clear() {
        let mut buffer = DotBuffer::new("n", true);
        buffer.open_graph();
        buffer.node(IdAllocator::new(0).next_id(), "x", Shape::Box);
        buffer.clear();

        assert_eq!(buffer.node_count(), 0);
        assert_eq!(buffer.into_string(), "");
    }
}

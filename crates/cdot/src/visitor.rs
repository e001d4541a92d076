//! The tree-to-DOT visitor.
//!
//! [`DotVisitor`] turns traversal callbacks into DOT statements. It keeps a
//! stack of open ancestor frames: every new node is attached by an edge to
//! the frame on top, and kinds whose [`Rule`](crate::policy::Rule) pushes
//! open a frame of their own until their matching exit.
//!
//! The visitor moves through three states. It starts `Idle`, becomes `Open`
//! once the root is entered and `Closed` when the root is exited. Any error
//! leaves it `Failed`; [`DotVisitor::reset`] returns it to `Idle`.
//!
//! # Example
//!
//! ```
//! # use cdot::{DotVisitor, TraversalError};
//! # use cdot_core::NodeKind;
//! # fn main() -> Result<(), TraversalError> {
//! let mut visitor = DotVisitor::default();
//! visitor.enter_root()?;
//! visitor.enter_composite(NodeKind::AddOp, Some("+"))?;
//! visitor.enter_terminal(NodeKind::IntAtom, "1")?;
//! visitor.visit_generic_terminal("x")?;
//! visitor.exit_composite(NodeKind::AddOp)?;
//! visitor.exit_root()?;
//!
//! let dot = visitor.finish()?;
//! assert!(dot.contains("\tn2 -> n1;\n"));
//! # Ok(())
//! # }
//! ```

use log::{debug, trace};

use cdot_core::{Listener, NodeKind, SyntaxNode, Terminal};

use crate::{
    config::OutputConfig,
    error::TraversalError,
    id::{IdAllocator, NodeId},
    output::DotBuffer,
    policy::{self, LabelSource},
};

/// Rank direction written at the top of every graph; edges point upward.
const RANK_DIRECTION: &str = "BT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Open,
    Closed,
    Failed,
}

impl State {
    fn name(self) -> &'static str {
        match self {
            State::Idle => "idle",
            State::Open => "open",
            State::Closed => "closed",
            State::Failed => "failed",
        }
    }
}

/// An open ancestor: the node new nodes attach to, and the kind that opened it.
#[derive(Debug, Clone, Copy)]
struct Frame {
    id: NodeId,
    kind: NodeKind,
}

/// Emits the DOT text of one syntax tree.
///
/// A visitor renders exactly one tree. Feed it with [`cdot_core::walk`] or
/// drive the operations by hand, then read the text with
/// [`finish`](Self::finish).
#[derive(Debug, Clone)]
pub struct DotVisitor {
    ids: IdAllocator,
    stack: Vec<Frame>,
    buffer: DotBuffer,
    state: State,
}

impl Default for DotVisitor {
    fn default() -> Self {
        Self::new(&OutputConfig::default())
    }
}

impl DotVisitor {
    /// Create an idle visitor writing identifiers as `config` describes.
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            ids: IdAllocator::new(config.first_id()),
            stack: Vec::new(),
            buffer: DotBuffer::new(config.id_prefix(), config.trailing_newline()),
            state: State::Idle,
        }
    }

    /// Open the graph and emit the root node.
    ///
    /// # Errors
    ///
    /// Returns [`TraversalError::InvalidState`] unless the visitor is idle.
    pub fn enter_root(&mut self) -> Result<(), TraversalError> {
        self.guard(|this| {
            if this.state != State::Idle {
                return Err(this.invalid_state("enter the root"));
            }

            this.buffer.open_graph();
            this.buffer.rank_direction(RANK_DIRECTION);

            let rule = policy::rule(NodeKind::Program);
            let label = rule.label(NodeKind::Program, None)?;
            let id = this.ids.next_id();
            this.buffer.node(id, &label, rule.shape);
            this.stack.push(Frame {
                id,
                kind: NodeKind::Program,
            });
            this.state = State::Open;

            trace!(id:% = id; "Root opened");
            Ok(())
        })
    }

    /// Close the graph after the root's last descendant.
    ///
    /// # Errors
    ///
    /// Returns [`TraversalError::StackUnderflow`] if no root is open and
    /// [`TraversalError::UnbalancedStack`] if frames other than the root are
    /// still open.
    pub fn exit_root(&mut self) -> Result<(), TraversalError> {
        self.guard(|this| {
            match this.stack.len() {
                0 => {
                    return Err(TraversalError::StackUnderflow {
                        kind: NodeKind::Program,
                    });
                }
                1 => {}
                depth => return Err(TraversalError::UnbalancedStack { depth: depth - 1 }),
            }

            this.stack.pop();
            this.buffer.close_graph();
            this.state = State::Closed;
            Ok(())
        })
    }

    /// Emit a node that opens a frame, attached under the current top.
    ///
    /// `captured` is the sub-token used by captured and templated labels.
    ///
    /// # Errors
    ///
    /// Returns [`TraversalError::NotComposite`] for kinds drawn as leaves,
    /// [`TraversalError::OrphanAttachment`] when no frame is open and
    /// [`TraversalError::MissingCapture`] when the label needs a token that
    /// is absent.
    pub fn enter_composite(
        &mut self,
        kind: NodeKind,
        captured: Option<&str>,
    ) -> Result<(), TraversalError> {
        self.guard(|this| {
            if kind == NodeKind::Program {
                return Err(this.invalid_state("enter a second root"));
            }
            if !policy::rule(kind).pushes {
                return Err(TraversalError::NotComposite { kind });
            }
            let id = this.attach(kind, captured)?;
            this.stack.push(Frame { id, kind });
            Ok(())
        })
    }

    /// Close the frame opened by the matching [`enter_composite`](Self::enter_composite).
    ///
    /// # Errors
    ///
    /// Returns [`TraversalError::StackUnderflow`] when only the root frame,
    /// or nothing, is open and [`TraversalError::MismatchedExit`] when the
    /// top frame was opened by another kind.
    pub fn exit_composite(&mut self, kind: NodeKind) -> Result<(), TraversalError> {
        self.guard(|this| {
            if this.stack.len() <= 1 {
                return Err(TraversalError::StackUnderflow { kind });
            }
            match this.stack.pop() {
                Some(frame) if frame.kind == kind => Ok(()),
                Some(frame) => Err(TraversalError::MismatchedExit {
                    expected: frame.kind,
                    found: kind,
                }),
                None => Err(TraversalError::StackUnderflow { kind }),
            }
        })
    }

    /// Emit a leaf node of `kind` under the current top.
    ///
    /// `text` is the verbatim source text for atoms and names, or the
    /// captured token for leaf directives such as `#undef`.
    ///
    /// # Errors
    ///
    /// Returns [`TraversalError::NotTerminal`] for kinds that open a frame,
    /// [`TraversalError::OrphanAttachment`] when no frame is open, or a
    /// missing-token error when `text` is empty.
    pub fn enter_terminal(&mut self, kind: NodeKind, text: &str) -> Result<(), TraversalError> {
        self.guard(|this| {
            if policy::rule(kind).pushes {
                return Err(TraversalError::NotTerminal { kind });
            }
            this.attach(kind, Some(text)).map(|_| ())
        })
    }

    /// Emit a generic terminal token as a leaf under the current top.
    ///
    /// # Errors
    ///
    /// Returns [`TraversalError::EmptyTerminal`] when `text` is empty and
    /// [`TraversalError::OrphanTerminal`] when no frame is open.
    pub fn visit_generic_terminal(&mut self, text: &str) -> Result<(), TraversalError> {
        self.guard(|this| {
            if text.is_empty() {
                return Err(TraversalError::EmptyTerminal);
            }
            let parent = this.top().ok_or_else(|| TraversalError::OrphanTerminal {
                text: text.to_string(),
            })?;
            let id = this.ids.next_id();
            this.buffer.node(id, text, policy::GENERIC_TERMINAL.shape);
            this.buffer.edge(id, parent);
            trace!(id:% = id, text; "Generic terminal emitted");
            Ok(())
        })
    }

    /// Return the complete graph text.
    ///
    /// # Errors
    ///
    /// Returns [`TraversalError::UnbalancedStack`] if the root is still open
    /// and [`TraversalError::InvalidState`] if the traversal never started or
    /// failed.
    pub fn finish(self) -> Result<String, TraversalError> {
        match self.state {
            State::Closed => {
                debug!(
                    nodes = self.buffer.node_count(),
                    edges = self.buffer.edge_count();
                    "DOT graph emitted"
                );
                Ok(self.buffer.into_string())
            }
            State::Open => Err(TraversalError::UnbalancedStack {
                depth: self.stack.len(),
            }),
            State::Idle | State::Failed => Err(self.invalid_state("finish")),
        }
    }

    /// Return the visitor to `Idle`, discarding all output.
    pub fn reset(&mut self) {
        self.ids.reset();
        self.stack.clear();
        self.buffer.clear();
        self.state = State::Idle;
    }

    /// Number of frames currently open, the root's included.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Emit a node of `kind` and its edge to the current top.
    fn attach(&mut self, kind: NodeKind, token: Option<&str>) -> Result<NodeId, TraversalError> {
        let parent = self
            .top()
            .ok_or(TraversalError::OrphanAttachment { kind })?;
        let rule = policy::rule(kind);
        let label = rule.label(kind, token)?;

        let id = self.ids.next_id();
        self.buffer.node(id, &label, rule.shape);
        self.buffer.edge(id, parent);

        trace!(id:% = id, kind:% = kind, label:% = label; "Node emitted");
        Ok(id)
    }

    fn top(&self) -> Option<NodeId> {
        self.stack.last().map(|frame| frame.id)
    }

    fn invalid_state(&self, operation: &'static str) -> TraversalError {
        TraversalError::InvalidState {
            operation,
            state: self.state.name(),
        }
    }

    /// Run `op` unless the visitor has failed, and mark it failed on error.
    fn guard<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, TraversalError>,
    ) -> Result<T, TraversalError> {
        if self.state == State::Failed {
            return Err(self.invalid_state("continue"));
        }
        let result = op(self);
        if result.is_err() {
            self.state = State::Failed;
        }
        result
    }
}

impl Listener for DotVisitor {
    type Error = TraversalError;

    fn enter(&mut self, node: &SyntaxNode) -> Result<(), Self::Error> {
        let kind = node.kind();
        if kind == NodeKind::Program {
            return self.enter_root();
        }
        if self.state == State::Idle {
            self.state = State::Failed;
            return Err(TraversalError::MissingRoot { found: kind });
        }

        let rule = policy::rule(kind);
        if rule.pushes {
            return self.enter_composite(kind, node.captured());
        }

        let count = node.children().len();
        if count > 0 {
            self.state = State::Failed;
            return Err(TraversalError::ChildrenUnderLeaf { kind, count });
        }
        let text = match rule.label {
            LabelSource::Verbatim => node.text(),
            LabelSource::Fixed(_) | LabelSource::Captured | LabelSource::Template { .. } => {
                node.captured()
            }
        };
        self.enter_terminal(kind, text.unwrap_or_default())
    }

    fn exit(&mut self, node: &SyntaxNode) -> Result<(), Self::Error> {
        let kind = node.kind();
        if kind == NodeKind::Program {
            return self.exit_root();
        }
        if policy::rule(kind).pushes {
            self.exit_composite(kind)
        } else {
            Ok(())
        }
    }

    fn visit_terminal(&mut self, terminal: &Terminal) -> Result<(), Self::Error> {
        self.visit_generic_terminal(terminal.text())
    }
}

#[cfg(test)]
mod tests {
    use cdot_core::{Span, walk};

    use super::*;

    fn leaf(kind: NodeKind, text: &str) -> SyntaxNode {
        SyntaxNode::new(kind, Span::default()).with_text(text)
    }

    fn render(root: &SyntaxNode) -> Result<String, TraversalError> {
        let mut visitor = DotVisitor::default();
        walk(&mut visitor, root)?;
        visitor.finish()
    }

    #[test]
    fn test_root_only() {
        let mut visitor = DotVisitor::default();
        visitor.enter_root().unwrap();
        assert_eq!(visitor.depth(), 1);
        visitor.exit_root().unwrap();
        assert_eq!(visitor.depth(), 0);

        assert_eq!(
            visitor.finish().unwrap(),
            "digraph {\n\trankdir=\"BT\";\n\tn0[ label=\"root\", shape=\"box\" ];\n}\n"
        );
    }

    #[test]
    fn test_composite_frames_attach_children() {
        let mut visitor = DotVisitor::default();
        visitor.enter_root().unwrap();
        visitor.enter_composite(NodeKind::Statement, None).unwrap();
        visitor.enter_composite(NodeKind::SetVal, Some("+=")).unwrap();
        visitor.enter_terminal(NodeKind::NameAtom, "x").unwrap();
        visitor.enter_terminal(NodeKind::IntAtom, "1").unwrap();
        assert_eq!(visitor.depth(), 3);
        visitor.exit_composite(NodeKind::SetVal).unwrap();
        visitor.enter_terminal(NodeKind::NameAtom, "y").unwrap();
        visitor.exit_composite(NodeKind::Statement).unwrap();
        visitor.exit_root().unwrap();

        let dot = visitor.finish().unwrap();
        assert_eq!(
            dot,
            "digraph {\n\
             \trankdir=\"BT\";\n\
             \tn0[ label=\"root\", shape=\"box\" ];\n\
             \tn1[ label=\"Statement\", shape=\"box\" ];\n\
             \tn1 -> n0;\n\
             \tn2[ label=\"+=\", shape=\"box\" ];\n\
             \tn2 -> n1;\n\
             \tn3[ label=\"x\" ];\n\
             \tn3 -> n2;\n\
             \tn4[ label=\"1\" ];\n\
             \tn4 -> n2;\n\
             \tn5[ label=\"y\" ];\n\
             \tn5 -> n1;\n\
             }\n"
        );
    }

    #[test]
    fn test_terminal_label_is_escaped() {
        let mut visitor = DotVisitor::default();
        visitor.enter_root().unwrap();
        visitor.enter_terminal(NodeKind::StrAtom, "\"hi\"").unwrap();
        visitor.exit_root().unwrap();

        let dot = visitor.finish().unwrap();
        assert!(dot.contains("\tn1[ label=\"\\\"hi\\\"\" ];\n"), "{dot}");
    }

    #[test]
    fn test_leaf_directive_is_box() {
        let mut visitor = DotVisitor::default();
        visitor.enter_root().unwrap();
        visitor.enter_terminal(NodeKind::UnDef, "DEBUG").unwrap();
        visitor.exit_root().unwrap();

        let dot = visitor.finish().unwrap();
        assert!(dot.contains("\tn1[ label=\"#undef DEBUG\", shape=\"box\" ];\n"));
    }

    #[test]
    fn test_attach_before_root_is_orphan() {
        let mut visitor = DotVisitor::default();
        let err = visitor.enter_terminal(NodeKind::IntAtom, "1").unwrap_err();
        assert_eq!(
            err,
            TraversalError::OrphanAttachment {
                kind: NodeKind::IntAtom
            }
        );
    }

    #[test]
    fn test_generic_terminal_before_root_is_orphan() {
        let mut visitor = DotVisitor::default();
        let err = visitor.visit_generic_terminal("...").unwrap_err();
        assert_eq!(
            err,
            TraversalError::OrphanTerminal {
                text: "...".to_string()
            }
        );
    }

    #[test]
    fn test_empty_generic_terminal_is_rejected() {
        let mut visitor = DotVisitor::default();
        visitor.enter_root().unwrap();
        assert_eq!(
            visitor.visit_generic_terminal("").unwrap_err(),
            TraversalError::EmptyTerminal
        );
        assert!(matches!(
            visitor.exit_root(),
            Err(TraversalError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_leaf_kind_cannot_open_a_frame() {
        let mut visitor = DotVisitor::default();
        visitor.enter_root().unwrap();
        let err = visitor
            .enter_composite(NodeKind::NameAtom, Some("x"))
            .unwrap_err();
        assert_eq!(
            err,
            TraversalError::NotComposite {
                kind: NodeKind::NameAtom
            }
        );
        assert_eq!(visitor.depth(), 1);
    }

    #[test]
    fn test_frame_kind_cannot_be_a_terminal() {
        let mut visitor = DotVisitor::default();
        visitor.enter_root().unwrap();
        let err = visitor.enter_terminal(NodeKind::Block, "x").unwrap_err();
        assert_eq!(
            err,
            TraversalError::NotTerminal {
                kind: NodeKind::Block
            }
        );
        assert_eq!(visitor.depth(), 1);
    }

    #[test]
    fn test_attach_after_close_is_orphan() {
        let mut visitor = DotVisitor::default();
        visitor.enter_root().unwrap();
        visitor.exit_root().unwrap();

        let err = visitor.enter_composite(NodeKind::Block, None).unwrap_err();
        assert_eq!(
            err,
            TraversalError::OrphanAttachment {
                kind: NodeKind::Block
            }
        );
    }

    #[test]
    fn test_exit_without_frame_underflows() {
        let mut visitor = DotVisitor::default();
        visitor.enter_root().unwrap();
        let err = visitor.exit_composite(NodeKind::Block).unwrap_err();
        assert_eq!(
            err,
            TraversalError::StackUnderflow {
                kind: NodeKind::Block
            }
        );

        let mut visitor = DotVisitor::default();
        assert!(matches!(
            visitor.exit_root(),
            Err(TraversalError::StackUnderflow { .. })
        ));
    }

    #[test]
    fn test_exit_root_with_open_frames() {
        let mut visitor = DotVisitor::default();
        visitor.enter_root().unwrap();
        visitor.enter_composite(NodeKind::Block, None).unwrap();
        visitor.enter_composite(NodeKind::Statement, None).unwrap();

        let err = visitor.exit_root().unwrap_err();
        assert_eq!(err, TraversalError::UnbalancedStack { depth: 2 });
    }

    #[test]
    fn test_mismatched_exit() {
        let mut visitor = DotVisitor::default();
        visitor.enter_root().unwrap();
        visitor.enter_composite(NodeKind::Block, None).unwrap();

        let err = visitor.exit_composite(NodeKind::Call).unwrap_err();
        assert_eq!(
            err,
            TraversalError::MismatchedExit {
                expected: NodeKind::Block,
                found: NodeKind::Call
            }
        );
    }

    #[test]
    fn test_second_root_is_invalid() {
        let mut visitor = DotVisitor::default();
        visitor.enter_root().unwrap();
        assert!(matches!(
            visitor.enter_root(),
            Err(TraversalError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_failed_visitor_rejects_everything_until_reset() {
        let mut visitor = DotVisitor::default();
        visitor.enter_root().unwrap();
        visitor.enter_composite(NodeKind::AddOp, None).unwrap_err();

        let err = visitor.enter_terminal(NodeKind::IntAtom, "1").unwrap_err();
        assert_eq!(
            err,
            TraversalError::InvalidState {
                operation: "continue",
                state: "failed"
            }
        );

        visitor.reset();
        visitor.enter_root().unwrap();
        visitor.exit_root().unwrap();
        assert!(visitor.finish().unwrap().contains("\tn0[ label=\"root\""));
    }

    #[test]
    fn test_finish_before_close() {
        let mut visitor = DotVisitor::default();
        visitor.enter_root().unwrap();
        assert_eq!(
            visitor.finish().unwrap_err(),
            TraversalError::UnbalancedStack { depth: 1 }
        );

        assert!(matches!(
            DotVisitor::default().finish(),
            Err(TraversalError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_reset_restarts_identifiers() {
        let mut visitor = DotVisitor::default();
        visitor.enter_root().unwrap();
        visitor.enter_terminal(NodeKind::IntAtom, "1").unwrap();
        visitor.exit_root().unwrap();
        let first = visitor.clone().finish().unwrap();

        visitor.reset();
        visitor.enter_root().unwrap();
        visitor.enter_terminal(NodeKind::IntAtom, "1").unwrap();
        visitor.exit_root().unwrap();
        assert_eq!(visitor.finish().unwrap(), first);
    }

    #[test]
    fn test_configured_output() {
        let config = OutputConfig::default()
            .with_id_prefix("v")
            .with_first_id(100)
            .with_trailing_newline(false);
        let mut visitor = DotVisitor::new(&config);
        visitor.enter_root().unwrap();
        visitor.enter_terminal(NodeKind::NameAtom, "a").unwrap();
        visitor.exit_root().unwrap();

        let dot = visitor.finish().unwrap();
        assert!(dot.contains("\tv101 -> v100;\n"));
        assert!(dot.ends_with('}'));
    }

    #[test]
    fn test_listener_routes_by_policy() {
        let tree = SyntaxNode::new(NodeKind::Program, Span::default())
            .with_child(
                SyntaxNode::new(NodeKind::DefineMacro, Span::default())
                    .with_captured("SQ")
                    .with_child(
                        SyntaxNode::new(NodeKind::MacroArgList, Span::default())
                            .with_terminal(Terminal::new("x", Span::default())),
                    )
                    .with_child(
                        SyntaxNode::new(NodeKind::MultOp, Span::default())
                            .with_captured("*")
                            .with_child(leaf(NodeKind::NameAtom, "x"))
                            .with_child(leaf(NodeKind::NameAtom, "x")),
                    ),
            )
            .with_child(SyntaxNode::new(NodeKind::DefineFlag, Span::default()).with_captured("F"));

        let dot = render(&tree).unwrap();
        assert!(dot.contains("\tn1[ label=\"#define SQ (macro)\", shape=\"box\" ];\n\tn1 -> n0;\n"));
        assert!(dot.contains("\tn2[ label=\"Macro args\", shape=\"box\" ];\n\tn2 -> n1;\n"));
        assert!(dot.contains("\tn3[ label=\"x\" ];\n\tn3 -> n2;\n"));
        assert!(dot.contains("\tn4[ label=\"*\", shape=\"box\" ];\n\tn4 -> n1;\n"));
        assert!(dot.contains("\tn6 -> n4;\n"));
        assert!(dot.contains("\tn7[ label=\"#define F (flag)\", shape=\"box\" ];\n\tn7 -> n0;\n"));
    }

    #[test]
    fn test_listener_rejects_non_program_root() {
        let tree = leaf(NodeKind::IntAtom, "1");
        assert_eq!(
            render(&tree).unwrap_err(),
            TraversalError::MissingRoot {
                found: NodeKind::IntAtom
            }
        );
    }

    #[test]
    fn test_listener_rejects_children_under_leaf() {
        let tree = SyntaxNode::new(NodeKind::Program, Span::default()).with_child(
            leaf(NodeKind::NameAtom, "f").with_child(leaf(NodeKind::IntAtom, "1")),
        );
        assert_eq!(
            render(&tree).unwrap_err(),
            TraversalError::ChildrenUnderLeaf {
                kind: NodeKind::NameAtom,
                count: 1
            }
        );
    }

    #[test]
    fn test_listener_reports_missing_capture() {
        let tree = SyntaxNode::new(NodeKind::Program, Span::default())
            .with_child(SyntaxNode::new(NodeKind::IfDef, Span::default()));
        assert_eq!(
            render(&tree).unwrap_err(),
            TraversalError::MissingCapture {
                kind: NodeKind::IfDef
            }
        );
    }

    #[test]
    fn test_listener_reports_missing_text() {
        let tree = SyntaxNode::new(NodeKind::Program, Span::default())
            .with_child(SyntaxNode::new(NodeKind::IntAtom, Span::default()));
        assert_eq!(
            render(&tree).unwrap_err(),
            TraversalError::MissingText {
                kind: NodeKind::IntAtom
            }
        );
    }
}

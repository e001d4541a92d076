//! Syntax tree produced by the parser and consumed by listeners.
//!
//! A [`SyntaxNode`] owns its children. Children are either nested nodes or
//! generic [`Terminal`] tokens: named tokens that have no dedicated kind of
//! their own, such as the parameter names of a function-like macro.

use crate::{kind::NodeKind, span::Span};

/// A token leaf with no dedicated node kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    text: String,
    span: Span,
}

impl Terminal {
    /// Create a terminal from its verbatim source text.
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }

    /// Verbatim source text of the token.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Location of the token in the source.
    pub fn span(&self) -> Span {
        self.span
    }
}

/// A child of a [`SyntaxNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Node(SyntaxNode),
    Terminal(Terminal),
}

/// A node of the syntax tree.
///
/// Beside its kind and children a node may carry:
/// - `text`: the verbatim source text, set on terminal kinds such as
///   [`NodeKind::IntAtom`];
/// - `captured`: a sub-token spelled in source that names the construct, such
///   as the operator of an [`NodeKind::AddOp`] or the macro name of a
///   [`NodeKind::DefineFlag`].
///
/// # Examples
///
/// ```
/// use cdot_core::{NodeKind, Span, SyntaxNode};
///
/// let sum = SyntaxNode::new(NodeKind::AddOp, Span::new(0..5))
///     .with_captured("+")
///     .with_child(SyntaxNode::new(NodeKind::NameAtom, Span::new(0..1)).with_text("a"))
///     .with_child(SyntaxNode::new(NodeKind::IntAtom, Span::new(4..5)).with_text("1"));
///
/// assert_eq!(sum.captured(), Some("+"));
/// assert_eq!(sum.children().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    kind: NodeKind,
    span: Span,
    text: Option<String>,
    captured: Option<String>,
    children: Vec<Child>,
}

impl SyntaxNode {
    /// Create a node with no text, capture or children.
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            span,
            text: None,
            captured: None,
            children: Vec::new(),
        }
    }

    /// Set the verbatim source text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the captured sub-token.
    pub fn with_captured(mut self, captured: impl Into<String>) -> Self {
        self.captured = Some(captured.into());
        self
    }

    /// Append a child node.
    pub fn with_child(mut self, child: SyntaxNode) -> Self {
        self.push_child(child);
        self
    }

    /// Append a generic terminal child.
    pub fn with_terminal(mut self, terminal: Terminal) -> Self {
        self.push_terminal(terminal);
        self
    }

    /// Append a child node in place.
    pub fn push_child(&mut self, child: SyntaxNode) {
        self.span = self.span.union(child.span);
        self.children.push(Child::Node(child));
    }

    /// Append a generic terminal child in place.
    pub fn push_terminal(&mut self, terminal: Terminal) {
        self.span = self.span.union(terminal.span);
        self.children.push(Child::Terminal(terminal));
    }

    /// Replace the span of the node.
    pub fn set_span(&mut self, span: Span) {
        self.span = span;
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn captured(&self) -> Option<&str> {
        self.captured.as_deref()
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Iterate over the child nodes, skipping generic terminals.
    pub fn child_nodes(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter_map(|child| match child {
            Child::Node(node) => Some(node),
            Child::Terminal(_) => None,
        })
    }

    /// Count this node and every descendant, generic terminals included.
    pub fn descendant_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            for child in &node.children {
                match child {
                    Child::Node(node) => pending.push(node),
                    Child::Terminal(_) => count += 1,
                }
            }
        }
        count
    }
}

impl Drop for SyntaxNode {
    // Deep trees would otherwise overflow the stack through recursive drops.
    fn drop(&mut self) {
        let mut pending: Vec<SyntaxNode> = Vec::new();
        collect_child_nodes(&mut self.children, &mut pending);
        while let Some(mut node) = pending.pop() {
            collect_child_nodes(&mut node.children, &mut pending);
        }
    }
}

fn collect_child_nodes(children: &mut Vec<Child>, into: &mut Vec<SyntaxNode>) {
    into.extend(children.drain(..).filter_map(|child| match child {
        Child::Node(node) => Some(node),
        Child::Terminal(_) => None,
    }));
}

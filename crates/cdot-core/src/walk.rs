//! Depth-first traversal driver.
//!
//! [`walk`] visits a [`SyntaxNode`] tree in source order and reports every
//! node to a [`Listener`]: `enter` in pre-order, `exit` in post-order, and
//! `visit_terminal` for each generic terminal child. The walk is iterative so
//! the depth of the tree is bounded by heap memory only.

use log::debug;

use crate::tree::{Child, SyntaxNode, Terminal};

/// Callbacks invoked by [`walk`].
///
/// Any callback may fail; the walk stops at the first error and returns it.
pub trait Listener {
    type Error;

    /// Called before any child of `node` is visited.
    fn enter(&mut self, node: &SyntaxNode) -> Result<(), Self::Error>;

    /// Called after every child of `node` has been visited.
    fn exit(&mut self, node: &SyntaxNode) -> Result<(), Self::Error>;

    /// Called for each generic terminal child, in order among its siblings.
    fn visit_terminal(&mut self, terminal: &Terminal) -> Result<(), Self::Error> {
        let _ = terminal;
        Ok(())
    }
}

/// Walk `root` depth-first, reporting each node to `listener`.
///
/// # Errors
///
/// Returns the first error produced by a listener callback. No further
/// callbacks are made after an error.
pub fn walk<'a, L: Listener>(listener: &mut L, root: &'a SyntaxNode) -> Result<(), L::Error> {
    listener.enter(root)?;

    let mut visited = 1usize;
    let mut frames: Vec<(&'a SyntaxNode, usize)> = vec![(root, 0)];

    while let Some(frame) = frames.last_mut() {
        let node: &'a SyntaxNode = frame.0;
        let Some(child) = node.children().get(frame.1) else {
            frames.pop();
            listener.exit(node)?;
            continue;
        };
        frame.1 += 1;
        visited += 1;

        match child {
            Child::Node(child) => {
                listener.enter(child)?;
                frames.push((child, 0));
            }
            Child::Terminal(terminal) => listener.visit_terminal(terminal)?,
        }
    }

    debug!(visited; "Tree walk complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{kind::NodeKind, span::Span};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Enter(NodeKind),
        Exit(NodeKind),
        Terminal(String),
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
        fail_on: Option<NodeKind>,
    }

    impl Listener for Recorder {
        type Error = NodeKind;

        fn enter(&mut self, node: &SyntaxNode) -> Result<(), NodeKind> {
            if self.fail_on == Some(node.kind()) {
                return Err(node.kind());
            }
            self.events.push(Event::Enter(node.kind()));
            Ok(())
        }

        fn exit(&mut self, node: &SyntaxNode) -> Result<(), NodeKind> {
            self.events.push(Event::Exit(node.kind()));
            Ok(())
        }

        fn visit_terminal(&mut self, terminal: &Terminal) -> Result<(), NodeKind> {
            self.events.push(Event::Terminal(terminal.text().to_string()));
            Ok(())
        }
    }

    fn node(kind: NodeKind) -> SyntaxNode {
        SyntaxNode::new(kind, Span::default())
    }

    #[test]
    fn test_walk_order() {
        let tree = node(NodeKind::Program).with_child(
            node(NodeKind::Statement)
                .with_child(node(NodeKind::NameAtom).with_text("x"))
                .with_terminal(Terminal::new("break", Span::default())),
        );

        let mut recorder = Recorder::default();
        walk(&mut recorder, &tree).unwrap();

        assert_eq!(
            recorder.events,
            vec![
                Event::Enter(NodeKind::Program),
                Event::Enter(NodeKind::Statement),
                Event::Enter(NodeKind::NameAtom),
                Event::Exit(NodeKind::NameAtom),
                Event::Terminal("break".to_string()),
                Event::Exit(NodeKind::Statement),
                Event::Exit(NodeKind::Program),
            ]
        );
    }

    #[test]
    fn test_walk_stops_at_first_error() {
        let tree = node(NodeKind::Program)
            .with_child(node(NodeKind::Block))
            .with_child(node(NodeKind::Statement));

        let mut recorder = Recorder {
            fail_on: Some(NodeKind::Block),
            ..Recorder::default()
        };
        let result = walk(&mut recorder, &tree);

        assert_eq!(result, Err(NodeKind::Block));
        assert_eq!(recorder.events, vec![Event::Enter(NodeKind::Program)]);
    }

    #[test]
    fn test_walk_deep_tree() {
        let mut tree = node(NodeKind::IntAtom).with_text("1");
        for _ in 0..100_000 {
            tree = node(NodeKind::PrefixOp).with_captured("-").with_child(tree);
        }

        let mut recorder = Recorder::default();
        walk(&mut recorder, &tree).unwrap();
        assert_eq!(recorder.events.len(), 2 * 100_001);
    }

    fn arb_tree() -> impl Strategy<Value = SyntaxNode> {
        let leaf = "[a-z]{1,4}".prop_map(|text| node(NodeKind::NameAtom).with_text(text));
        leaf.prop_recursive(4, 64, 4, |inner| {
            prop::collection::vec(inner, 0..4).prop_map(|children| {
                children
                    .into_iter()
                    .fold(node(NodeKind::Block), SyntaxNode::with_child)
            })
        })
    }

    fn check_enters_match_exits(tree: &SyntaxNode) -> Result<(), TestCaseError> {
        let mut recorder = Recorder::default();
        walk(&mut recorder, tree).unwrap();

        let mut depth = 0i64;
        for event in &recorder.events {
            match event {
                Event::Enter(_) => depth += 1,
                Event::Exit(_) => depth -= 1,
                Event::Terminal(_) => {}
            }
            prop_assert!(depth >= 0);
        }
        prop_assert_eq!(depth, 0);
        prop_assert_eq!(recorder.events.len(), 2 * tree.descendant_count());
        Ok(())
    }

    proptest! {
        #[test]
        fn enters_match_exits(tree in arb_tree()) {
            check_enters_match_exits(&tree)?;
        }
    }
}

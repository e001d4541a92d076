//! Error types for cdot operations.
//!
//! This module provides the main error type [`CdotError`] and the
//! [`TraversalError`] raised by the DOT visitor when the tree it is fed breaks
//! the stack discipline.

use std::io;

use thiserror::Error;

use cdot_core::NodeKind;
use cdot_parser::error::ParseError;

/// Fatal conditions detected while turning a tree into DOT text.
///
/// A traversal that fails produces no output.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TraversalError {
    #[error("cannot attach {kind} node: no open ancestor")]
    OrphanAttachment { kind: NodeKind },

    #[error("cannot attach terminal `{text}`: no open ancestor")]
    OrphanTerminal { text: String },

    #[error("{kind} node opens a frame and must be entered as a composite")]
    NotTerminal { kind: NodeKind },

    #[error("{kind} node is a leaf and must be entered as a terminal")]
    NotComposite { kind: NodeKind },

    #[error("generic terminal has no text to build its label")]
    EmptyTerminal,

    #[error("cannot exit {kind} node: no open frame to pop")]
    StackUnderflow { kind: NodeKind },

    #[error("root exited with {depth} frame(s) still open")]
    UnbalancedStack { depth: usize },

    #[error("exit of {found} node does not match the open {expected} frame")]
    MismatchedExit { expected: NodeKind, found: NodeKind },

    #[error("{kind} node has no captured token to build its label")]
    MissingCapture { kind: NodeKind },

    #[error("{kind} node has no source text to build its label")]
    MissingText { kind: NodeKind },

    #[error("{kind} node is drawn as a leaf but has {count} child(ren)")]
    ChildrenUnderLeaf { kind: NodeKind, count: usize },

    #[error("cannot {operation} while the visitor is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("tree root is a {found} node, expected Program")]
    MissingRoot { found: NodeKind },
}

/// The main error type for cdot operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source code alongside the structured parse
/// diagnostics so that callers can render them with source snippets.
#[derive(Debug, Error)]
pub enum CdotError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Traversal error: {0}")]
    Traversal(#[from] TraversalError),

    #[cfg(feature = "graphviz")]
    #[error("Invalid DOT output: {0}")]
    InvalidDot(String),
}

impl CdotError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traversal_error_messages() {
        let err = TraversalError::MismatchedExit {
            expected: NodeKind::Block,
            found: NodeKind::Call,
        };
        assert_eq!(
            err.to_string(),
            "exit of Call node does not match the open Block frame"
        );

        let err = TraversalError::UnbalancedStack { depth: 2 };
        assert_eq!(err.to_string(), "root exited with 2 frame(s) still open");

        let err = TraversalError::OrphanTerminal {
            text: "...".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot attach terminal `...`: no open ancestor"
        );
    }

    #[test]
    fn test_traversal_error_converts() {
        let err: CdotError = TraversalError::MissingRoot {
            found: NodeKind::Statement,
        }
        .into();
        assert!(matches!(err, CdotError::Traversal(_)));
        assert_eq!(
            err.to_string(),
            "Traversal error: tree root is a Statement node, expected Program"
        );
    }
}

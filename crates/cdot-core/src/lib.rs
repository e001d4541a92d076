//! cdot Core Types and Definitions
//!
//! This crate provides the syntax tree shared by the cdot parser and the DOT
//! renderer. It includes:
//!
//! - **Kinds**: The closed set of node kinds ([`kind::NodeKind`])
//! - **Tree**: Owned syntax nodes and generic terminals ([`tree`] module)
//! - **Spans**: Byte ranges into the source ([`span::Span`])
//! - **Walk**: The depth-first [`walk::Listener`] driver ([`walk`] module)

pub mod kind;
pub mod span;
pub mod tree;
pub mod walk;

pub use kind::{Category, NodeKind};
pub use span::Span;
pub use tree::{Child, SyntaxNode, Terminal};
pub use walk::{Listener, walk};

//! # Cdot Parser
//!
//! Parser for a C-like language with preprocessor directives. This crate
//! turns source text into a [`SyntaxNode`](cdot_core::SyntaxNode) tree ready
//! to be walked by a [`Listener`](cdot_core::Listener).
//!
//! ## Usage
//!
//! ```
//! # use cdot_parser::{parse, error::ParseError};
//! # use cdot_core::NodeKind;
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         #include <stdio.h>
//!         int main(void) { return 0; }
//!     "#;
//!
//!     let tree = parse(source)?;
//!     assert_eq!(tree.kind(), NodeKind::Program);
//!     Ok(())
//! }
//! ```

pub mod error;
mod lexer;
mod parser;
mod tokens;

pub use cdot_core::Span;

use log::debug;

use cdot_core::SyntaxNode;

use error::ParseError;

/// Parse source text into a syntax tree.
///
/// The pipeline has two steps:
///
/// 1. **Tokenize** - Convert source text to tokens, reporting every lexical
///    error found
/// 2. **Parse** - Build the tree from the significant tokens, stopping at the
///    first syntax error
///
/// The returned root is a [`Program`](cdot_core::NodeKind::Program) node
/// spanning the whole input.
///
/// # Errors
///
/// Returns a [`ParseError`] with one diagnostic per lexical error, or a
/// single diagnostic for the first syntax error.
pub fn parse(source: &str) -> Result<SyntaxNode, ParseError> {
    // Step 1: Tokenize
    let tokens = lexer::tokenize(source)?;

    // Step 2: Parse, keeping newlines to delimit directive lines
    let significant: Vec<_> = tokens
        .into_iter()
        .filter(|t| !t.token.is_trivia() || t.token == tokens::Token::Newline)
        .collect();
    let mut tree = parser::build_tree(&significant)?;
    tree.set_span(Span::new(0..source.len()));

    debug!(nodes = tree.descendant_count(); "Source parsed");
    Ok(tree)
}

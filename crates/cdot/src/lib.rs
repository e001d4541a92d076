//! cdot - Render syntax trees of a C-like language as DOT graphs.
//!
//! Each node of a parsed tree becomes one graph node, with an edge from every
//! node to the construct that contains it. The output is plain Graphviz DOT
//! text ready for `dot -Tsvg`.

pub mod config;
pub mod id;
pub mod output;
pub mod policy;
#[cfg(feature = "graphviz")]
pub mod validate;

mod error;
mod visitor;

pub use cdot_core::{NodeKind, SyntaxNode};

pub use error::{CdotError, TraversalError};
pub use visitor::DotVisitor;

use log::{debug, info, trace};

use cdot_core::walk;

use config::AppConfig;

/// Render `root` as DOT text with the default output settings.
///
/// # Errors
///
/// Returns a [`TraversalError`] if the tree cannot be rendered, for example
/// when its root is not a [`NodeKind::Program`] node.
///
/// # Examples
///
/// ```
/// # use cdot::{NodeKind, SyntaxNode, render};
/// # use cdot_core::Span;
/// let tree = SyntaxNode::new(NodeKind::Program, Span::default());
/// let dot = render(&tree).expect("Failed to render");
/// assert!(dot.starts_with("digraph {\n\trankdir=\"BT\";\n"));
/// ```
pub fn render(root: &SyntaxNode) -> Result<String, TraversalError> {
    let mut visitor = DotVisitor::default();
    walk(&mut visitor, root)?;
    visitor.finish()
}

/// Builder for parsing and rendering cdot graphs.
///
/// This provides an API for processing source code through the parsing and
/// rendering stages.
///
/// # Examples
///
/// ```rust
/// use cdot::{GraphBuilder, config::AppConfig};
///
/// let source = "int i = 1;";
///
/// // With custom config
/// let config = AppConfig::default();
/// let builder = GraphBuilder::new(config);
///
/// // Parse source to a syntax tree
/// let tree = builder.parse(source)
///     .expect("Failed to parse");
///
/// // Render the tree to DOT
/// let dot = builder.render_dot(&tree)
///     .expect("Failed to render");
///
/// // Or use default config
/// let builder = GraphBuilder::default();
/// ```
#[derive(Default)]
pub struct GraphBuilder {
    config: AppConfig,
}

impl GraphBuilder {
    /// Create a new graph builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including output settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Parse source code into a syntax tree.
    ///
    /// # Errors
    ///
    /// Returns `CdotError::Parse` carrying every lexical error, or the first
    /// syntax error, along with the source.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cdot::{GraphBuilder, NodeKind};
    ///
    /// let builder = GraphBuilder::default();
    /// let tree = builder.parse("#define DEBUG")
    ///     .expect("Failed to parse source");
    /// assert_eq!(tree.kind(), NodeKind::Program);
    /// ```
    pub fn parse(&self, source: &str) -> Result<SyntaxNode, CdotError> {
        info!("Parsing source");

        let tree =
            cdot_parser::parse(source).map_err(|err| CdotError::new_parse_error(err, source))?;

        debug!(nodes = tree.descendant_count(); "Source parsed successfully");
        trace!(tree:?; "Parsed tree");

        Ok(tree)
    }

    /// Render a syntax tree to DOT text.
    ///
    /// # Errors
    ///
    /// Returns `CdotError::Traversal` if the tree breaks the rendering rules,
    /// for example a root that is not a `Program` node.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cdot::GraphBuilder;
    ///
    /// let builder = GraphBuilder::default();
    /// let tree = builder.parse("x = 1;").expect("Failed to parse");
    ///
    /// let dot = builder.render_dot(&tree)
    ///     .expect("Failed to render tree");
    ///
    /// println!("{}", dot);
    /// ```
    pub fn render_dot(&self, tree: &SyntaxNode) -> Result<String, CdotError> {
        info!("Rendering DOT graph");

        let mut visitor = DotVisitor::new(self.config.output());
        walk(&mut visitor, tree)?;
        let dot = visitor.finish()?;

        info!(bytes = dot.len(); "DOT graph rendered successfully");
        Ok(dot)
    }

    /// Parse `source` and render its tree to DOT text.
    ///
    /// # Errors
    ///
    /// Returns any error of [`parse`](Self::parse) or
    /// [`render_dot`](Self::render_dot).
    pub fn source_to_dot(&self, source: &str) -> Result<String, CdotError> {
        let tree = self.parse(source)?;
        self.render_dot(&tree)
    }
}

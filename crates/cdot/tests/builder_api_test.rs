//! Integration tests for the GraphBuilder API
//!
//! These tests verify that the public API works end to end, from source text
//! to DOT output.

use cdot::{
    CdotError, GraphBuilder, TraversalError,
    config::{AppConfig, OutputConfig},
};
use cdot_core::{NodeKind, Span, SyntaxNode};

const SAMPLE: &str = "#include <stdio.h>\n\nint main(int argc, char *argv[])\n{\n\tprintf(\"Hello, world!\");\n}";

#[test]
fn test_builder_api_exists() {
    // Just verify the API compiles and can be constructed
    let _builder = GraphBuilder::default();
}

#[test]
fn test_declaration_with_initializer() {
    let dot = GraphBuilder::default()
        .source_to_dot("int i = 1;")
        .expect("Failed to render");

    assert_eq!(
        dot,
        "digraph {\n\
         \trankdir=\"BT\";\n\
         \tn0[ label=\"root\", shape=\"box\" ];\n\
         \tn1[ label=\"Statement\", shape=\"box\" ];\n\
         \tn1 -> n0;\n\
         \tn2[ label=\"DECL\", shape=\"box\" ];\n\
         \tn2 -> n1;\n\
         \tn3[ label=\"TYPE\", shape=\"box\" ];\n\
         \tn3 -> n2;\n\
         \tn4[ label=\"int\" ];\n\
         \tn4 -> n3;\n\
         \tn5[ label=\"=\", shape=\"box\" ];\n\
         \tn5 -> n2;\n\
         \tn6[ label=\"i\" ];\n\
         \tn6 -> n5;\n\
         \tn7[ label=\"1\" ];\n\
         \tn7 -> n5;\n\
         }\n"
    );
}

#[test]
fn test_define_constant() {
    let dot = GraphBuilder::default()
        .source_to_dot("#define X 1")
        .expect("Failed to render");

    assert_eq!(
        dot,
        "digraph {\n\
         \trankdir=\"BT\";\n\
         \tn0[ label=\"root\", shape=\"box\" ];\n\
         \tn1[ label=\"#define X (constant)\", shape=\"box\" ];\n\
         \tn1 -> n0;\n\
         \tn2[ label=\"1\" ];\n\
         \tn2 -> n1;\n\
         }\n"
    );
}

#[test]
fn test_ifdef_parents_its_body() {
    let dot = GraphBuilder::default()
        .source_to_dot("#ifdef FLAG\nx;\n#endif\ny;\n")
        .expect("Failed to render");

    assert!(dot.contains("\tn1[ label=\"#ifdef FLAG\", shape=\"box\" ];\n\tn1 -> n0;\n"));
    // `x;` sits inside the conditional
    assert!(dot.contains("\tn2[ label=\"Statement\", shape=\"box\" ];\n\tn2 -> n1;\n"));
    assert!(dot.contains("\tn3[ label=\"x\" ];\n\tn3 -> n2;\n"));
    // `y;` attaches to the root again
    assert!(dot.contains("\tn4[ label=\"Statement\", shape=\"box\" ];\n\tn4 -> n0;\n"));
    assert!(dot.contains("\tn5[ label=\"y\" ];\n\tn5 -> n4;\n"));
}

#[test]
fn test_hello_world_sample() {
    let dot = GraphBuilder::default()
        .source_to_dot(SAMPLE)
        .expect("Failed to render");

    assert!(dot.contains("[ label=\"#include <stdio.h>\", shape=\"box\" ];"));
    assert!(dot.contains("[ label=\"FN\", shape=\"box\" ];"));
    assert!(dot.contains("[ label=\"CALL\", shape=\"box\" ];"));
    assert!(dot.contains("[ label=\"\\\"Hello, world!\\\"\" ];"));
    assert_eq!(dot.matches("rankdir").count(), 1);
}

#[test]
fn test_quotes_in_labels_are_escaped() {
    let dot = GraphBuilder::default()
        .source_to_dot("s = \"a\";")
        .expect("Failed to render");

    assert!(dot.contains("[ label=\"\\\"a\\\"\" ];"), "{dot}");
}

#[test]
fn test_builder_with_config() {
    let config = AppConfig::new(
        OutputConfig::default()
            .with_id_prefix("node")
            .with_first_id(1)
            .with_trailing_newline(false),
    );

    let dot = GraphBuilder::new(config)
        .source_to_dot("x;")
        .expect("Failed to render");

    assert!(dot.contains("\tnode1[ label=\"root\", shape=\"box\" ];\n"));
    assert!(dot.contains("\tnode3 -> node2;\n"));
    assert!(dot.ends_with("\n}"));
}

#[test]
fn test_parse_invalid_syntax_returns_error() {
    let source = "int main( {";

    let result = GraphBuilder::default().source_to_dot(source);
    match result {
        Err(CdotError::Parse { err, src }) => {
            assert_eq!(src, source);
            assert!(!err.diagnostics().is_empty());
        }
        other => panic!("Expected parse error, got {other:?}"),
    }
}

#[test]
fn test_render_rejects_non_program_root() {
    let tree = SyntaxNode::new(NodeKind::Block, Span::default());

    let result = GraphBuilder::default().render_dot(&tree);
    assert!(matches!(
        result,
        Err(CdotError::Traversal(TraversalError::MissingRoot {
            found: NodeKind::Block
        }))
    ));
}

#[test]
fn test_builder_reusability() {
    let builder = GraphBuilder::default();

    let first = builder.source_to_dot("int a;").expect("Failed to render first");
    let second = builder.source_to_dot("int b;").expect("Failed to render second");

    // Each render starts numbering afresh
    assert!(first.contains("\tn0[ label=\"root\""));
    assert!(second.contains("\tn0[ label=\"root\""));
    assert_eq!(first.replace("\"a\"", "\"b\""), second);
}

#[test]
fn test_render_free_function_matches_builder() {
    let builder = GraphBuilder::default();
    let tree = builder.parse(SAMPLE).expect("Failed to parse");

    assert_eq!(
        cdot::render(&tree).expect("Failed to render"),
        builder.render_dot(&tree).expect("Failed to render")
    );
}

#[cfg(feature = "graphviz")]
#[test]
fn test_output_is_valid_dot() {
    let builder = GraphBuilder::default();
    let tree = builder
        .parse("#define MAX 10\nint sum(int n) { int t = 0; while (n > 0) t += n--; return t; }")
        .expect("Failed to parse");
    let dot = builder.render_dot(&tree).expect("Failed to render");

    let summary = cdot::validate::check_dot(&dot).expect("Output should be valid DOT");
    assert_eq!(summary.nodes, tree.descendant_count());
    assert_eq!(summary.edges, summary.nodes - 1);
}

//! Parser for C-like source tokens.
//!
//! This module transforms a token stream from the [`lexer`](super::lexer) into
//! a [`SyntaxNode`] tree. The public entry point is [`build_tree`].
//!
//! The token stream handed to the parser carries no whitespace or comments,
//! but keeps [`Token::Newline`]: it is insignificant everywhere except at the
//! end of a preprocessor directive line.

use winnow::{
    Parser as _,
    combinator::{preceded, repeat},
    error::{ContextError, ErrMode},
    stream::{Stateful, Stream, TokenSlice},
    token::any,
};

use cdot_core::{NodeKind, Span, SyntaxNode, Terminal};

use crate::{
    error::{Diagnostic, ErrorCode},
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what was expected
    Label(&'static str),
    /// Remaining token count (`eof_offset()`) at error start position
    ///
    /// Used to calculate start_offset as: `tokens.len() - start_offset_value`
    StartOffset(usize),
    /// An `#ifdef` / `#ifndef` opened at this span reached the end of input
    Unclosed(Span),
    /// Nesting passed [`MAX_NESTING`] at the token with this span
    TooDeep(Span),
}

/// Token stream carrying the current nesting depth
type Input<'src> = Stateful<TokenSlice<'src, PositionedToken<'src>>, usize>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;

/// Binary operator precedence levels, loosest first.
struct BinaryLevel {
    kind: NodeKind,
    operators: &'static [&'static str],
    /// Whether the operator spelling is recorded on the node
    captured: bool,
}

const BINARY_LEVELS: [BinaryLevel; 10] = [
    BinaryLevel {
        kind: NodeKind::LojOrOp,
        operators: &["||"],
        captured: false,
    },
    BinaryLevel {
        kind: NodeKind::LojAndOp,
        operators: &["&&"],
        captured: false,
    },
    BinaryLevel {
        kind: NodeKind::BitOrOp,
        operators: &["|"],
        captured: false,
    },
    BinaryLevel {
        kind: NodeKind::BitXorOp,
        operators: &["^"],
        captured: false,
    },
    BinaryLevel {
        kind: NodeKind::BitAndOp,
        operators: &["&"],
        captured: false,
    },
    BinaryLevel {
        kind: NodeKind::EqOp,
        operators: &["==", "!="],
        captured: true,
    },
    BinaryLevel {
        kind: NodeKind::CompareOp,
        operators: &["<", ">", "<=", ">="],
        captured: true,
    },
    BinaryLevel {
        kind: NodeKind::ShiftOp,
        operators: &["<<", ">>"],
        captured: true,
    },
    BinaryLevel {
        kind: NodeKind::AddOp,
        operators: &["+", "-"],
        captured: true,
    },
    BinaryLevel {
        kind: NodeKind::MultOp,
        operators: &["*", "/", "%"],
        captured: true,
    },
];

const ASSIGNMENT_OPERATORS: [&str; 11] = [
    "=", "+=", "-=", "*=", "/=", "%=", "<<=", ">>=", "&=", "^=", "|=",
];

const PREFIX_OPERATORS: [&str; 8] = ["-", "+", "!", "~", "*", "&", "++", "--"];

/// Deepest nesting of expressions, statements, bodies and tagged types
const MAX_NESTING: usize = 64;

/// Start parsing `tokens` at nesting `depth`
fn input_at_depth<'src>(tokens: &'src [PositionedToken<'src>], depth: usize) -> Input<'src> {
    Stateful {
        input: TokenSlice::new(tokens),
        state: depth,
    }
}

/// Run `f` one nesting level deeper.
///
/// Past [`MAX_NESTING`] levels this fails with a cut error before `f` runs,
/// so recursion depth stays bounded whatever the input.
fn nested<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    if input.state >= MAX_NESTING {
        let at = peek_token(input).map_or_else(Span::default, |t| t.span);
        let mut e = ContextError::new();
        e.push(Context::TooDeep(at));
        return Err(ErrMode::Cut(e));
    }

    input.state += 1;
    let result = f(input);
    input.state -= 1;
    result
}

fn cut_err<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    let start_remaining = input.eof_offset();

    match f(input) {
        Ok(o) => Ok(o),
        Err(ErrMode::Backtrack(mut e)) | Err(ErrMode::Cut(mut e)) => {
            e.push(Context::StartOffset(start_remaining));
            Err(ErrMode::Cut(e))
        }
        Err(e) => Err(e),
    }
}

/// Helper to create a Backtrack error describing what was expected
fn expected(label: &'static str) -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    e.push(Context::Label(label));
    ErrMode::Backtrack(e)
}

/// Helper to create the error for an `#ifdef` / `#ifndef` missing its `#endif`
fn unclosed_error(opened: Span) -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    e.push(Context::Unclosed(opened));
    ErrMode::Cut(e)
}

/// Re-anchor an error raised inside a directive line onto the full token stream.
///
/// Offsets recorded while parsing the line refer to the line slice, so only
/// the labels survive and the span starts at the directive.
fn relocate_line_error(
    error: ErrMode<ContextError<Context>>,
    start_remaining: usize,
) -> ErrMode<ContextError<Context>> {
    let mut relocated = ContextError::new();
    relocated.push(Context::StartOffset(start_remaining));
    if let ErrMode::Backtrack(e) | ErrMode::Cut(e) = &error {
        for ctx in e.context() {
            if let Context::Label(_) | Context::TooDeep(_) = ctx {
                relocated.push(ctx.clone());
            }
        }
    }
    ErrMode::Cut(relocated)
}

/// Skip newline tokens
fn newlines<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(
        0..,
        any.verify(|token: &PositionedToken<'_>| token.token == Token::Newline)
            .void(),
    )
    .parse_next(input)
}

/// Parse the next significant token
fn token<'src>(input: &mut Input<'src>) -> IResult<&'src PositionedToken<'src>> {
    preceded(newlines, any).parse_next(input)
}

/// Look at the next significant token without consuming it
fn peek_token<'src>(input: &mut Input<'src>) -> Option<&'src PositionedToken<'src>> {
    let checkpoint = input.checkpoint();
    let next = token(input).ok();
    input.reset(&checkpoint);
    next
}

/// Look at the token after the next significant one
fn peek_second<'src>(input: &mut Input<'src>) -> Option<&'src PositionedToken<'src>> {
    let checkpoint = input.checkpoint();
    let next = token(input).and_then(|_| token(input)).ok();
    input.reset(&checkpoint);
    next
}

/// Parse a token equal to `expected_token`, or backtrack without consuming.
fn punct<'src>(input: &mut Input<'src>, expected_token: Token<'static>) -> IResult<Span> {
    newlines(input)?;
    let checkpoint = input.checkpoint();
    match token(input) {
        Ok(t) if t.token == expected_token => Ok(t.span),
        _ => {
            input.reset(&checkpoint);
            Err(ErrMode::Backtrack(ContextError::new()))
        }
    }
}

/// Like [`punct`], naming the expected token in the error.
fn expect<'src>(
    input: &mut Input<'src>,
    expected_token: Token<'static>,
    label: &'static str,
) -> IResult<Span> {
    punct(input, expected_token).map_err(|_| expected(label))
}

/// Parse an operator token spelled as one of `operators`
fn operator<'src>(
    input: &mut Input<'src>,
    operators: &[&str],
) -> IResult<&'src PositionedToken<'src>> {
    newlines(input)?;
    let checkpoint = input.checkpoint();
    match token(input) {
        Ok(t) if matches!(t.token, Token::Op(op) if operators.contains(&op)) => Ok(t),
        _ => {
            input.reset(&checkpoint);
            Err(ErrMode::Backtrack(ContextError::new()))
        }
    }
}

/// Parse an identifier token
fn identifier<'src>(input: &mut Input<'src>) -> IResult<&'src PositionedToken<'src>> {
    newlines(input)?;
    let checkpoint = input.checkpoint();
    match token(input) {
        Ok(t) if matches!(t.token, Token::Identifier(_)) => Ok(t),
        _ => {
            input.reset(&checkpoint);
            Err(expected("identifier"))
        }
    }
}

/// Build a terminal-kind node carrying the verbatim text of `token`
fn leaf(kind: NodeKind, token: &PositionedToken<'_>) -> SyntaxNode {
    SyntaxNode::new(kind, token.span).with_text(token.token.to_string())
}

/// Build a generic terminal from `token`
fn terminal(token: &PositionedToken<'_>) -> Terminal {
    Terminal::new(token.token.to_string(), token.span)
}

/// Returns `true` if `token` can only start a type
fn starts_type(token: Option<&PositionedToken<'_>>) -> bool {
    token.is_some_and(|t| {
        matches!(
            t.token,
            Token::TypeKeyword(_) | Token::Const | Token::Struct | Token::Union | Token::Enum
        )
    })
}

// ============================================================================
// Types
// ============================================================================

/// Parse `struct` / `union` / `enum` with an optional tag and body
fn complex_type<'src>(
    input: &mut Input<'src>,
    keyword: &'src PositionedToken<'src>,
) -> IResult<SyntaxNode> {
    let checkpoint = input.checkpoint();
    let tag = identifier(input).ok();
    if tag.is_none() {
        input.reset(&checkpoint);
    }

    let kind = if tag.is_some() {
        NodeKind::ComplexType
    } else {
        NodeKind::AnonType
    };
    let mut node = SyntaxNode::new(kind, keyword.span).with_captured(keyword.token.to_string());
    if let Some(tag) = tag {
        node.push_terminal(terminal(tag));
    }

    let Ok(open) = punct(input, Token::LeftBrace) else {
        return match tag {
            Some(_) => Ok(node),
            None => Err(expected("type tag or `{`")),
        };
    };

    cut_err(input, |input| {
        nested(input, |input| tagged_type_body(input, keyword, &mut node))?;
        node.set_span(node.span().union(open));
        Ok(node)
    })
}

/// Parse the members of a tagged type up to and including the closing `}`
fn tagged_type_body<'src>(
    input: &mut Input<'src>,
    keyword: &PositionedToken<'src>,
    node: &mut SyntaxNode,
) -> IResult<()> {
    if keyword.token == Token::Enum {
        return enumerators(input, node);
    }
    loop {
        if let Ok(close) = punct(input, Token::RightBrace) {
            node.set_span(node.span().union(close));
            return Ok(());
        }
        if peek_token(input).is_none() {
            return Err(expected("`}`"));
        }
        node.push_child(declaration(input)?);
    }
}

/// Parse enumerators up to and including the closing `}`
fn enumerators<'src>(input: &mut Input<'src>, node: &mut SyntaxNode) -> IResult<()> {
    loop {
        if let Ok(close) = punct(input, Token::RightBrace) {
            node.set_span(node.span().union(close));
            return Ok(());
        }
        let name = identifier(input)?;
        let mut enumerator = leaf(NodeKind::SimpleName, name);
        if let Ok(eq) = operator(input, &["="]) {
            let value = expression(input)?;
            enumerator = SyntaxNode::new(NodeKind::SingleDef, eq.span)
                .with_child(enumerator)
                .with_child(value);
        }
        node.push_child(enumerator);
        if punct(input, Token::Comma).is_err() {
            let close = expect(input, Token::RightBrace, "`,` or `}`")?;
            node.set_span(node.span().union(close));
            return Ok(());
        }
    }
}

/// Parse the base of a type: builtin keywords, a typedef name or a tagged type
fn base_type<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    newlines(input)?;
    let checkpoint = input.checkpoint();
    let first = token(input).map_err(|_| expected("type"))?;

    match first.token {
        Token::TypeKeyword(word) => {
            let mut text = word.to_string();
            let mut span = first.span;
            while let Some(next) = peek_token(input) {
                let Token::TypeKeyword(word) = next.token else {
                    break;
                };
                token(input)?;
                text.push(' ');
                text.push_str(word);
                span = span.union(next.span);
            }
            let name = SyntaxNode::new(NodeKind::TypeName, span).with_text(text);
            Ok(SyntaxNode::new(NodeKind::SimpleType, span).with_child(name))
        }
        Token::Identifier(_) => {
            Ok(SyntaxNode::new(NodeKind::SimpleType, first.span)
                .with_child(leaf(NodeKind::TypeName, first)))
        }
        Token::Struct | Token::Union | Token::Enum => complex_type(input, first),
        _ => {
            input.reset(&checkpoint);
            Err(expected("type"))
        }
    }
}

/// Parse a type: `const`, a base type, then any `*` and `const` suffixes
fn type_spec<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    let leading_const = punct(input, Token::Const).ok();
    let mut ty = base_type(input)?;
    if let Some(span) = leading_const {
        ty = SyntaxNode::new(NodeKind::ConstType, span).with_child(ty);
    }

    loop {
        if let Ok(star) = operator(input, &["*"]) {
            ty = SyntaxNode::new(NodeKind::PtrType, star.span).with_child(ty);
        } else if let Ok(span) = punct(input, Token::Const) {
            ty = SyntaxNode::new(NodeKind::ConstType, span).with_child(ty);
        } else {
            return Ok(ty);
        }
    }
}

/// Wrap `ty` in an [`NodeKind::ArrayType`] per trailing `[size?]`
fn array_type_suffix<'src>(input: &mut Input<'src>, mut ty: SyntaxNode) -> IResult<SyntaxNode> {
    while let Ok(open) = punct(input, Token::LeftBracket) {
        let mut array = SyntaxNode::new(NodeKind::ArrayType, open).with_child(ty);
        cut_err(input, |input| {
            if punct(input, Token::RightBracket).is_err() {
                array.push_child(expression(input)?);
                expect(input, Token::RightBracket, "`]`")?;
            }
            Ok(())
        })?;
        ty = array;
    }
    Ok(ty)
}

/// Parse a type without a declarator, as used by casts and `sizeof`
fn type_name<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    let ty = type_spec(input)?;
    array_type_suffix(input, ty)
}

// ============================================================================
// Declarations
// ============================================================================

/// Parse a function pointer declarator: `(*name)(params)`
fn fn_ptr_declarator<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    let open = punct(input, Token::LeftParen)?;
    operator(input, &["*"])?;
    let name = identifier(input)?;
    punct(input, Token::RightParen)?;
    let params_open = punct(input, Token::LeftParen)?;

    cut_err(input, |input| {
        let params = nested(input, |input| parameters(input, params_open))?;
        Ok(SyntaxNode::new(NodeKind::FnPtrType, open)
            .with_child(leaf(NodeKind::SimpleName, name))
            .with_child(params))
    })
}

/// Parse a declarator: a name, an array name, or a function pointer
fn declarator<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    let checkpoint = input.checkpoint();
    match fn_ptr_declarator(input) {
        Ok(node) => return Ok(node),
        Err(ErrMode::Backtrack(_)) => input.reset(&checkpoint),
        Err(e) => return Err(e),
    }

    let name = identifier(input)?;
    let mut decl = leaf(NodeKind::SimpleName, name);
    while let Ok(open) = punct(input, Token::LeftBracket) {
        let mut array = SyntaxNode::new(NodeKind::ArrName, open).with_child(decl);
        cut_err(input, |input| {
            if punct(input, Token::RightBracket).is_err() {
                array.push_child(expression(input)?);
                expect(input, Token::RightBracket, "`]`")?;
            }
            Ok(())
        })?;
        decl = array;
    }
    Ok(decl)
}

/// Parse a declarator with an optional `= initializer`
fn init_declarator<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    let decl = declarator(input)?;
    match operator(input, &["="]) {
        Ok(eq) => {
            let value = cut_err(input, expression)?;
            Ok(SyntaxNode::new(NodeKind::SingleDef, eq.span)
                .with_child(decl)
                .with_child(value))
        }
        Err(_) => Ok(decl),
    }
}

/// Parse a declaration: `type declarator, ...;`
///
/// Several declarators are grouped under a [`NodeKind::MultDecl`]. Only
/// tagged types may be declared without a declarator.
fn declaration<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    let committed = starts_type(peek_token(input));
    let ty = type_spec(input)?;
    let allows_bare = matches!(ty.kind(), NodeKind::ComplexType | NodeKind::AnonType);
    let mut decl = SyntaxNode::new(NodeKind::Declaration, ty.span()).with_child(ty);

    if allows_bare && let Ok(semi) = punct(input, Token::Semicolon) {
        decl.set_span(decl.span().union(semi));
        return Ok(decl);
    }

    let rest = |input: &mut Input<'src>| -> IResult<SyntaxNode> {
        let first = init_declarator(input)?;
        let mut others = Vec::new();
        while punct(input, Token::Comma).is_ok() {
            others.push(cut_err(input, init_declarator)?);
        }
        let semi = expect(input, Token::Semicolon, "`;`")?;

        if others.is_empty() {
            decl.push_child(first);
        } else {
            let list = others.into_iter().fold(
                SyntaxNode::new(NodeKind::MultDecl, first.span()).with_child(first),
                SyntaxNode::with_child,
            );
            decl.push_child(list);
        }
        decl.set_span(decl.span().union(semi));
        Ok(decl)
    };

    if committed {
        cut_err(input, rest)
    } else {
        rest(input)
    }
}

/// Parse a single function parameter
fn parameter<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    let ty = type_spec(input)?;

    let checkpoint = input.checkpoint();
    let (ty, decl) = match declarator(input) {
        Ok(decl) => (ty, Some(decl)),
        Err(ErrMode::Backtrack(_)) => {
            input.reset(&checkpoint);
            (array_type_suffix(input, ty)?, None)
        }
        Err(e) => return Err(e),
    };

    let mut node = SyntaxNode::new(NodeKind::Declaration, ty.span()).with_child(ty);
    if let Some(decl) = decl {
        node.push_child(decl);
    }
    Ok(node)
}

/// Parse a parameter list after its opening `(`, up to and including `)`
fn parameters<'src>(input: &mut Input<'src>, open: Span) -> IResult<SyntaxNode> {
    let mut list = SyntaxNode::new(NodeKind::ArgDeclList, open);
    if let Ok(close) = punct(input, Token::RightParen) {
        list.set_span(list.span().union(close));
        return Ok(list);
    }

    loop {
        if let Ok(span) = punct(input, Token::Ellipsis) {
            list.push_terminal(Terminal::new("...", span));
        } else {
            list.push_child(parameter(input)?);
        }
        if punct(input, Token::Comma).is_err() {
            let close = expect(input, Token::RightParen, "`,` or `)`")?;
            list.set_span(list.span().union(close));
            return Ok(list);
        }
    }
}

/// Parse a function declaration or implementation
fn function<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    let return_type = type_spec(input)?;
    let name = identifier(input)?;
    let open = punct(input, Token::LeftParen)?;

    cut_err(input, |input| {
        let params = parameters(input, open)?;
        let (kind, body) = match punct(input, Token::Semicolon) {
            Ok(_) => (NodeKind::FnDeclaration, None),
            Err(_) => (NodeKind::FnImplementation, Some(nested(input, block)?)),
        };

        let mut node = SyntaxNode::new(kind, return_type.span())
            .with_child(return_type)
            .with_child(leaf(NodeKind::SimpleName, name))
            .with_child(params);
        if let Some(body) = body {
            node.push_child(body);
        }
        Ok(node)
    })
}

// ============================================================================
// Expressions
// ============================================================================

/// Parse a full expression
fn expression<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    nested(input, assignment)
}

/// Parse a right-associative assignment
fn assignment<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    let target = ternary(input)?;
    match operator(input, &ASSIGNMENT_OPERATORS) {
        Ok(op) => {
            let value = cut_err(input, |input| nested(input, assignment))?;
            Ok(SyntaxNode::new(NodeKind::SetVal, op.span)
                .with_captured(op.token.to_string())
                .with_child(target)
                .with_child(value))
        }
        Err(_) => Ok(target),
    }
}

/// Parse `cond ? then : else`
fn ternary<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    let condition = binary(input, 0)?;
    let Ok(question) = punct(input, Token::Question) else {
        return Ok(condition);
    };

    cut_err(input, |input| {
        let then = expression(input)?;
        expect(input, Token::Colon, "`:`")?;
        let otherwise = nested(input, ternary)?;
        Ok(SyntaxNode::new(NodeKind::TernaryOp, question)
            .with_child(condition)
            .with_child(then)
            .with_child(otherwise))
    })
}

/// Parse the next binary operator binding at precedence `min_level` or tighter
fn binary_operator<'src>(
    input: &mut Input<'src>,
    min_level: usize,
) -> Option<(usize, &'src PositionedToken<'src>)> {
    BINARY_LEVELS
        .iter()
        .enumerate()
        .skip(min_level)
        .find_map(|(level, spec)| operator(input, spec.operators).ok().map(|op| (level, op)))
}

/// Parse a left-associative binary operator chain binding at `min_level` or tighter
fn binary<'src>(input: &mut Input<'src>, min_level: usize) -> IResult<SyntaxNode> {
    let mut lhs = prefix(input)?;

    while let Some((level, op)) = binary_operator(input, min_level) {
        let spec = &BINARY_LEVELS[level];
        let rhs = cut_err(input, |input| nested(input, |input| binary(input, level + 1)))?;
        let mut node = SyntaxNode::new(spec.kind, op.span);
        if spec.captured {
            node = node.with_captured(op.token.to_string());
        }
        lhs = node.with_child(lhs).with_child(rhs);
    }
    Ok(lhs)
}

/// Parse unary prefix operators, `sizeof` and casts
fn prefix<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    newlines(input)?;
    let checkpoint = input.checkpoint();
    let first = token(input).map_err(|_| expected("expression"))?;

    match first.token {
        Token::Op(op) if PREFIX_OPERATORS.contains(&op) => {
            let operand = cut_err(input, |input| nested(input, prefix))?;
            Ok(SyntaxNode::new(NodeKind::PrefixOp, first.span)
                .with_captured(op)
                .with_child(operand))
        }
        Token::Sizeof => {
            let is_type = peek_token(input).is_some_and(|t| t.token == Token::LeftParen)
                && starts_type(peek_second(input));
            let operand = cut_err(input, |input| {
                if is_type {
                    punct(input, Token::LeftParen)?;
                    let ty = type_name(input)?;
                    expect(input, Token::RightParen, "`)`")?;
                    Ok(ty)
                } else {
                    nested(input, prefix)
                }
            })?;
            Ok(SyntaxNode::new(NodeKind::PrefixOp, first.span)
                .with_captured("sizeof")
                .with_child(operand))
        }
        Token::LeftParen if starts_type(peek_token(input)) => cut_err(input, |input| {
            let ty = type_name(input)?;
            expect(input, Token::RightParen, "`)`")?;
            let operand = nested(input, prefix)?;
            Ok(SyntaxNode::new(NodeKind::CCast, first.span)
                .with_child(ty)
                .with_child(operand))
        }),
        _ => {
            input.reset(&checkpoint);
            postfix(input)
        }
    }
}

/// Parse call arguments after the opening `(`, up to and including `)`
fn call_arguments<'src>(input: &mut Input<'src>, call: &mut SyntaxNode) -> IResult<()> {
    if let Ok(close) = punct(input, Token::RightParen) {
        call.set_span(call.span().union(close));
        return Ok(());
    }
    loop {
        call.push_child(expression(input)?);
        if punct(input, Token::Comma).is_err() {
            let close = expect(input, Token::RightParen, "`,` or `)`")?;
            call.set_span(call.span().union(close));
            return Ok(());
        }
    }
}

/// Parse postfix calls, subscripts, member access and `++` / `--`
fn postfix<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    let mut expr = primary(input)?;

    loop {
        newlines(input)?;
        let checkpoint = input.checkpoint();
        let Ok(next) = token(input) else {
            input.reset(&checkpoint);
            return Ok(expr);
        };

        expr = match next.token {
            Token::LeftParen => {
                let mut call = SyntaxNode::new(NodeKind::Call, next.span).with_child(expr);
                cut_err(input, |input| call_arguments(input, &mut call))?;
                call
            }
            Token::LeftBracket => {
                let index = cut_err(input, |input| {
                    let index = expression(input)?;
                    expect(input, Token::RightBracket, "`]`")?;
                    Ok(index)
                })?;
                SyntaxNode::new(NodeKind::Subscript, next.span)
                    .with_child(expr)
                    .with_child(index)
            }
            Token::Dot | Token::Arrow => {
                let member = cut_err(input, identifier)?;
                SyntaxNode::new(NodeKind::MemberGet, next.span)
                    .with_captured(next.token.to_string())
                    .with_child(expr)
                    .with_terminal(terminal(member))
            }
            Token::Op(op @ ("++" | "--")) => SyntaxNode::new(NodeKind::SuffixOp, next.span)
                .with_captured(op)
                .with_child(expr),
            _ => {
                input.reset(&checkpoint);
                return Ok(expr);
            }
        };
    }
}

/// Parse a brace-enclosed initializer list after its `{`
fn compound_literal<'src>(input: &mut Input<'src>, open: Span) -> IResult<SyntaxNode> {
    let mut list = SyntaxNode::new(NodeKind::CompLiteral, open);
    loop {
        if let Ok(close) = punct(input, Token::RightBrace) {
            list.set_span(list.span().union(close));
            return Ok(list);
        }
        list.push_child(expression(input)?);
        if punct(input, Token::Comma).is_err() {
            let close = expect(input, Token::RightBrace, "`,` or `}`")?;
            list.set_span(list.span().union(close));
            return Ok(list);
        }
    }
}

/// Parse atoms, parenthesized expressions and initializer lists
fn primary<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    newlines(input)?;
    let checkpoint = input.checkpoint();
    let first = token(input).map_err(|_| expected("expression"))?;

    match first.token {
        Token::Identifier(_) => Ok(leaf(NodeKind::NameAtom, first)),
        Token::IntLiteral(_) => Ok(leaf(NodeKind::IntAtom, first)),
        Token::FloatLiteral(_) => Ok(leaf(NodeKind::FloatAtom, first)),
        Token::CharLiteral(_) => Ok(leaf(NodeKind::CharAtom, first)),
        Token::StringLiteral(_) => Ok(leaf(NodeKind::StrAtom, first)),
        Token::LeftParen => cut_err(input, |input| {
            let inner = expression(input)?;
            expect(input, Token::RightParen, "`)`")?;
            Ok(inner)
        }),
        Token::LeftBrace => cut_err(input, |input| compound_literal(input, first.span)),
        _ => {
            input.reset(&checkpoint);
            Err(expected("expression"))
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

/// Parse `{ item* }`
fn block<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    let open = expect(input, Token::LeftBrace, "`{`")?;

    cut_err(input, |input| {
        let mut block = SyntaxNode::new(NodeKind::Block, open);
        loop {
            match peek_token(input) {
                None => return Err(expected("`}`")),
                Some(t) if t.token == Token::RightBrace => {
                    token(input)?;
                    block.set_span(block.span().union(t.span));
                    return Ok(block);
                }
                Some(_) => block.push_child(cut_err(input, item)?),
            }
        }
    })
}

fn return_statement<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    let keyword = punct(input, Token::Return)?;
    let mut node = SyntaxNode::new(NodeKind::ReturnExpr, keyword);

    cut_err(input, |input| {
        let semi = match punct(input, Token::Semicolon) {
            Ok(semi) => semi,
            Err(_) => {
                node.push_child(expression(input)?);
                expect(input, Token::Semicolon, "`;`")?
            }
        };
        node.set_span(node.span().union(semi));
        Ok(node)
    })
}

/// One `if (condition) then` link of an `else if` chain
struct IfArm {
    keyword: Span,
    condition: SyntaxNode,
    then: SyntaxNode,
    /// The `else` following `then`
    else_span: Option<Span>,
}

impl IfArm {
    fn into_node(self, otherwise: Option<SyntaxNode>) -> SyntaxNode {
        let mut node = SyntaxNode::new(NodeKind::IfStmt, self.keyword)
            .with_child(self.condition)
            .with_child(self.then);
        if let (Some(else_span), Some(otherwise)) = (self.else_span, otherwise) {
            node.push_child(SyntaxNode::new(NodeKind::ElseStmt, else_span).with_child(otherwise));
        }
        node
    }
}

/// Parse `(condition) then` and a trailing `else`, if any
fn if_arm<'src>(input: &mut Input<'src>, keyword: Span) -> IResult<IfArm> {
    let (condition, then) = cut_err(input, |input| {
        expect(input, Token::LeftParen, "`(`")?;
        let condition = expression(input)?;
        expect(input, Token::RightParen, "`)`")?;
        let then = statement(input)?;
        Ok((condition, then))
    })?;
    Ok(IfArm {
        keyword,
        condition,
        then,
        else_span: punct(input, Token::Else).ok(),
    })
}

/// Parse an `if` statement.
///
/// An `else if` chain is read in a loop, then folded into the same nested
/// tree a recursive parse would build: each inner `if` sits in a
/// [`NodeKind::Statement`] under the preceding [`NodeKind::ElseStmt`].
fn if_statement<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    let keyword = punct(input, Token::If)?;
    let first = if_arm(input, keyword)?;

    let mut chain = Vec::new();
    let mut otherwise = None;
    let mut has_else = first.else_span.is_some();
    while has_else {
        match punct(input, Token::If) {
            Ok(keyword) => {
                let arm = if_arm(input, keyword)?;
                has_else = arm.else_span.is_some();
                chain.push(arm);
            }
            Err(_) => {
                otherwise = Some(cut_err(input, statement)?);
                has_else = false;
            }
        }
    }

    for arm in chain.into_iter().rev() {
        let keyword = arm.keyword;
        let node = arm.into_node(otherwise.take());
        otherwise = Some(SyntaxNode::new(NodeKind::Statement, keyword).with_child(node));
    }
    Ok(first.into_node(otherwise))
}

fn for_statement<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    let keyword = punct(input, Token::For)?;
    let mut node = SyntaxNode::new(NodeKind::ForLoop, keyword);

    cut_err(input, |input| {
        expect(input, Token::LeftParen, "`(`")?;

        // Initializer: a declaration consumes its own `;`
        if punct(input, Token::Semicolon).is_err() {
            let checkpoint = input.checkpoint();
            match declaration(input) {
                Ok(decl) => node.push_child(decl),
                Err(ErrMode::Backtrack(_)) => {
                    input.reset(&checkpoint);
                    node.push_child(expression(input)?);
                    expect(input, Token::Semicolon, "`;`")?;
                }
                Err(e) => return Err(e),
            }
        }

        if punct(input, Token::Semicolon).is_err() {
            node.push_child(expression(input)?);
            expect(input, Token::Semicolon, "`;`")?;
        }

        if punct(input, Token::RightParen).is_err() {
            node.push_child(expression(input)?);
            expect(input, Token::RightParen, "`)`")?;
        }

        node.push_child(statement(input)?);
        Ok(node)
    })
}

fn while_statement<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    let keyword = punct(input, Token::While)?;

    cut_err(input, |input| {
        expect(input, Token::LeftParen, "`(`")?;
        let condition = expression(input)?;
        expect(input, Token::RightParen, "`)`")?;
        let body = statement(input)?;
        Ok(SyntaxNode::new(NodeKind::WhileLoop, keyword)
            .with_child(condition)
            .with_child(body))
    })
}

/// Parse `typedef type declarator;`
fn type_definition<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    let keyword = punct(input, Token::Typedef)?;

    cut_err(input, |input| {
        let ty = type_spec(input)?;
        let name = declarator(input)?;
        let semi = expect(input, Token::Semicolon, "`;`")?;
        Ok(SyntaxNode::new(NodeKind::TypeDefinition, keyword.union(semi))
            .with_child(ty)
            .with_child(name))
    })
}

/// Parse `expr;`, returning the expression and the span of its `;`
fn expression_statement<'src>(input: &mut Input<'src>) -> IResult<(SyntaxNode, Span)> {
    let expr = expression(input)?;
    let semi = cut_err(input, |input| expect(input, Token::Semicolon, "`;`"))?;
    Ok((expr, semi))
}

/// Parse a statement, wrapped in a [`NodeKind::Statement`] node
fn statement<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    nested(input, statement_body)
}

fn statement_body<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    let first = peek_token(input).ok_or_else(|| expected("statement"))?;
    let mut stmt = SyntaxNode::new(NodeKind::Statement, first.span);

    match first.token {
        Token::Semicolon => {
            token(input)?;
        }
        Token::Return => stmt.push_child(return_statement(input)?),
        Token::If => stmt.push_child(if_statement(input)?),
        Token::For => stmt.push_child(for_statement(input)?),
        Token::While => stmt.push_child(while_statement(input)?),
        Token::LeftBrace => stmt.push_child(block(input)?),
        Token::Typedef => stmt.push_child(type_definition(input)?),
        Token::Break | Token::Continue => {
            token(input)?;
            stmt.push_terminal(terminal(first));
            let semi = cut_err(input, |input| expect(input, Token::Semicolon, "`;`"))?;
            stmt.set_span(stmt.span().union(semi));
        }
        _ => {
            let checkpoint = input.checkpoint();
            match declaration(input) {
                Ok(decl) => stmt.push_child(decl),
                Err(ErrMode::Backtrack(_)) => {
                    input.reset(&checkpoint);
                    let (expr, semi) = expression_statement(input)?;
                    stmt.push_child(expr);
                    stmt.set_span(stmt.span().union(semi));
                }
                Err(e) => return Err(e),
            }
        }
    }
    Ok(stmt)
}

// ============================================================================
// Preprocessor directives
// ============================================================================

/// Split off the rest of the current directive line
fn directive_line<'src>(input: &mut Input<'src>) -> &'src [PositionedToken<'src>] {
    let len = input
        .offset_for(|t: &PositionedToken<'_>| t.token == Token::Newline)
        .unwrap_or_else(|| input.eof_offset());
    input.next_slice(len)
}

/// Parse a directive line completely with `f`, starting at nesting `depth`
fn parse_line<'src, O, F>(line: &'src [PositionedToken<'src>], depth: usize, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    let mut line_input = input_at_depth(line, depth);
    let out = f(&mut line_input)?;
    if line_input.eof_offset() != 0 {
        return Err(expected("end of directive line"));
    }
    Ok(out)
}

/// Attach the replacement list of a `#define` to `node`.
///
/// A replacement that is a single expression becomes its subtree; anything
/// else is kept as verbatim generic terminals.
fn macro_body<'src>(input: &mut Input<'src>, node: &mut SyntaxNode) {
    let checkpoint = input.checkpoint();
    if let Ok(body) = expression(input)
        && input.eof_offset() == 0
    {
        node.push_child(body);
        return;
    }

    input.reset(&checkpoint);
    while let Ok(t) = token(input) {
        node.push_terminal(terminal(t));
    }
}

/// Parse the parameter list of a function-like macro
fn macro_parameters<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    let open = expect(input, Token::LeftParen, "`(`")?;
    let mut list = SyntaxNode::new(NodeKind::MacroArgList, open);

    if let Ok(close) = punct(input, Token::RightParen) {
        list.set_span(list.span().union(close));
        return Ok(list);
    }
    loop {
        let param = token(input).map_err(|_| expected("macro parameter"))?;
        match param.token {
            Token::Identifier(_) | Token::Ellipsis => list.push_terminal(terminal(param)),
            _ => return Err(expected("macro parameter")),
        }
        if punct(input, Token::Comma).is_err() {
            let close = expect(input, Token::RightParen, "`,` or `)`")?;
            list.set_span(list.span().union(close));
            return Ok(list);
        }
    }
}

/// Parse the rest of a `#define` line
fn define<'src>(input: &mut Input<'src>, head: &PositionedToken<'src>) -> IResult<SyntaxNode> {
    let name = identifier(input)?;
    let span = head.span.union(name.span);
    let captured = name.token.to_string();

    let Some(next) = peek_token(input) else {
        return Ok(SyntaxNode::new(NodeKind::DefineFlag, span).with_captured(captured));
    };

    // A function-like macro has its `(` directly after the name
    let mut node = if next.token == Token::LeftParen && next.span.start() == name.span.end() {
        let params = macro_parameters(input)?;
        SyntaxNode::new(NodeKind::DefineMacro, span)
            .with_captured(captured)
            .with_child(params)
    } else {
        SyntaxNode::new(NodeKind::DefineConst, span).with_captured(captured)
    };
    macro_body(input, &mut node);
    Ok(node)
}

/// Parse `#ifdef NAME` / `#ifndef NAME`, its items and the closing `#endif`
fn conditional<'src>(
    input: &mut Input<'src>,
    head: &'src PositionedToken<'src>,
    start_remaining: usize,
) -> IResult<SyntaxNode> {
    let kind = if head.token == Token::Ifdef {
        NodeKind::IfDef
    } else {
        NodeKind::IfNotDef
    };

    let line = directive_line(input);
    let name = parse_line(line, input.state, identifier).map_err(|e| relocate_line_error(e, start_remaining))?;
    let mut node =
        SyntaxNode::new(kind, head.span.union(name.span)).with_captured(name.token.to_string());
    let opened = node.span();

    loop {
        match peek_token(input) {
            None => return Err(unclosed_error(opened)),
            Some(t) if t.token == Token::Endif => {
                newlines(input)?;
                let endif_remaining = input.eof_offset();
                token(input)?;
                let line = directive_line(input);
                parse_line(line, input.state, |_| Ok(()))
                    .map_err(|e| relocate_line_error(e, endif_remaining))?;
                node.set_span(node.span().union(t.span));
                return Ok(node);
            }
            Some(_) => node.push_child(cut_err(input, |input| nested(input, item))?),
        }
    }
}

/// Parse a preprocessor directive
fn directive<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    newlines(input)?;
    let start_remaining = input.eof_offset();
    let head = token(input)?;

    if matches!(head.token, Token::Ifdef | Token::Ifndef) {
        return conditional(input, head, start_remaining);
    }

    let line = directive_line(input);
    let depth = input.state;
    let node = match head.token {
        Token::Define => parse_line(line, depth, |input| define(input, head)),
        Token::Undef => parse_line(line, depth, identifier).map(|name| {
            SyntaxNode::new(NodeKind::UnDef, head.span.union(name.span))
                .with_captured(name.token.to_string())
        }),
        Token::Include(path) => parse_line(line, depth, |_| Ok(()))
            .map(|()| SyntaxNode::new(NodeKind::IncludeFile, head.span).with_captured(path)),
        _ => Err(expected("preprocessor directive")),
    };
    node.map_err(|e| relocate_line_error(e, start_remaining))
}

// ============================================================================
// Items
// ============================================================================

/// Parse a top-level item: a directive, a function or a statement
fn item<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    match peek_token(input).map(|t| t.token) {
        Some(
            Token::Define | Token::Undef | Token::Include(_) | Token::Ifdef | Token::Ifndef,
        ) => directive(input),
        Some(Token::Endif) => Err(expected("`#ifdef` or `#ifndef` before `#endif`")),
        _ => {
            let checkpoint = input.checkpoint();
            match function(input) {
                Ok(node) => Ok(node),
                Err(ErrMode::Backtrack(_)) => {
                    input.reset(&checkpoint);
                    statement(input)
                }
                Err(e) => Err(e),
            }
        }
    }
}

fn program<'src>(input: &mut Input<'src>) -> IResult<SyntaxNode> {
    let mut root = SyntaxNode::new(NodeKind::Program, Span::default());
    while peek_token(input).is_some() {
        root.push_child(cut_err(input, item)?);
    }
    newlines(input)?;
    Ok(root)
}

// ============================================================================
// Error conversion
// ============================================================================

/// Union of the spans of the first and last non-newline tokens in `tokens`
fn meaningful_span(tokens: &[PositionedToken<'_>]) -> Option<Span> {
    let mut significant = tokens.iter().filter(|t| t.token != Token::Newline);
    let first = significant.next()?.span;
    let last = significant.next_back().map_or(first, |t| t.span);
    Some(first.union(last))
}

/// Utility function to convert winnow errors to our custom error format
///
/// Extracts position information from error context (StartOffset) and calculates
/// precise error spans using the token array.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken<'_>],
    current_remaining: usize,
) -> Diagnostic {
    let end_of_input = tokens
        .last()
        .map(|t| Span::new(t.span.end()..t.span.end()))
        .unwrap_or_default();

    let context = match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    if let Some(at) = context.context().find_map(|ctx| match ctx {
        Context::TooDeep(span) => Some(*span),
        _ => None,
    }) {
        return Diagnostic::error("nesting too deep")
            .with_code(ErrorCode::E103)
            .with_label(at, format!("more than {MAX_NESTING} nested levels"))
            .with_help("split the construct into smaller pieces");
    }

    if let Some(opened) = context.context().find_map(|ctx| match ctx {
        Context::Unclosed(span) => Some(*span),
        _ => None,
    }) {
        return Diagnostic::error("unterminated conditional directive")
            .with_code(ErrorCode::E102)
            .with_label(end_of_input, "input ends here")
            .with_secondary_label(opened, "conditional opened here")
            .with_help("add a matching `#endif`");
    }

    // Calculate offsets from remaining token counts
    let end_offset = tokens.len().saturating_sub(current_remaining);
    let start_offset = context
        .context()
        .find_map(|ctx| match ctx {
            Context::StartOffset(n) => Some(tokens.len().saturating_sub(*n)),
            _ => None,
        })
        .unwrap_or(end_offset);

    let labels: Vec<&str> = context
        .context()
        .filter_map(|ctx| match ctx {
            Context::Label(label) => Some(*label),
            _ => None,
        })
        .collect();
    let expectation = if labels.is_empty() {
        None
    } else {
        Some(format!("expected {}", labels.join(", ")))
    };

    let consumed = if start_offset < end_offset {
        meaningful_span(&tokens[start_offset..end_offset])
    } else {
        None
    };

    match meaningful_span(&tokens[end_offset.min(tokens.len())..]) {
        None => {
            let message = match &expectation {
                Some(expectation) => format!("unexpected end of input: {expectation}"),
                None => "unexpected end of input".to_string(),
            };
            let mut diag = Diagnostic::error(message)
                .with_code(ErrorCode::E101)
                .with_label(end_of_input, "input ends here");
            if let Some(span) = consumed {
                diag = diag.with_secondary_label(span, "while parsing this");
            }
            diag.with_help("the input may be truncated")
        }
        Some(_) => {
            let offending = tokens[end_offset..]
                .iter()
                .find(|t| t.token != Token::Newline)
                .map_or(end_of_input, |t| t.span);
            let message = match &expectation {
                Some(expectation) => format!("unexpected token: {expectation}"),
                None => "unexpected token".to_string(),
            };
            let mut diag = Diagnostic::error(message)
                .with_code(ErrorCode::E100)
                .with_label(offending, "unexpected token");
            if let Some(span) = consumed {
                diag = diag.with_secondary_label(span, "while parsing this");
            }
            diag.with_help("check syntax and token positioning")
        }
    }
}

/// Build a syntax tree from tokens
///
/// `tokens` must not contain whitespace or comments; newlines are kept to
/// delimit directive lines.
pub fn build_tree<'src>(tokens: &'src [PositionedToken<'src>]) -> Result<SyntaxNode, Diagnostic> {
    let mut token_slice = input_at_depth(tokens, 0);

    match program.parse_next(&mut token_slice) {
        Ok(mut tree) => {
            let end = tokens.last().map_or(0, |t| t.span.end());
            tree.set_span(Span::new(0..end));
            Ok(tree)
        }
        Err(e) => {
            let current_remaining = token_slice.eof_offset();
            Err(convert_error(e, tokens, current_remaining))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn significant_tokens(input: &str) -> Vec<PositionedToken<'_>> {
        tokenize(input)
            .expect("Failed to tokenize input")
            .into_iter()
            .filter(|t| !t.token.is_trivia() || t.token == Token::Newline)
            .collect()
    }

    #[test]
    fn test_type_spec_pointer_and_const() {
        let tokens = significant_tokens("const char * const");
        let mut slice = input_at_depth(&tokens, 0);
        let ty = type_spec(&mut slice).unwrap();

        assert_eq!(ty.kind(), NodeKind::ConstType);
        let ptr = ty.child_nodes().next().unwrap();
        assert_eq!(ptr.kind(), NodeKind::PtrType);
        let inner = ptr.child_nodes().next().unwrap();
        assert_eq!(inner.kind(), NodeKind::ConstType);
        assert_eq!(slice.eof_offset(), 0);
    }

    #[test]
    fn test_multi_keyword_type_name() {
        let tokens = significant_tokens("unsigned long int");
        let mut slice = input_at_depth(&tokens, 0);
        let ty = type_spec(&mut slice).unwrap();

        assert_eq!(ty.kind(), NodeKind::SimpleType);
        let name = ty.child_nodes().next().unwrap();
        assert_eq!(name.kind(), NodeKind::TypeName);
        assert_eq!(name.text(), Some("unsigned long int"));
    }

    #[test]
    fn test_binary_precedence() {
        let tokens = significant_tokens("a + b * c");
        let mut slice = input_at_depth(&tokens, 0);
        let expr = expression(&mut slice).unwrap();

        assert_eq!(expr.kind(), NodeKind::AddOp);
        assert_eq!(expr.captured(), Some("+"));
        let kinds: Vec<_> = expr.child_nodes().map(SyntaxNode::kind).collect();
        assert_eq!(kinds, vec![NodeKind::NameAtom, NodeKind::MultOp]);
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let tokens = significant_tokens("a = b += 1");
        let mut slice = input_at_depth(&tokens, 0);
        let expr = expression(&mut slice).unwrap();

        assert_eq!(expr.kind(), NodeKind::SetVal);
        assert_eq!(expr.captured(), Some("="));
        let rhs = expr.child_nodes().nth(1).unwrap();
        assert_eq!(rhs.kind(), NodeKind::SetVal);
        assert_eq!(rhs.captured(), Some("+="));
    }

    #[test]
    fn test_punct_skips_newlines_and_backtracks() {
        let tokens = significant_tokens("\n\n;");
        let mut slice = input_at_depth(&tokens, 0);

        assert!(punct(&mut slice, Token::Comma).is_err());
        assert!(punct(&mut slice, Token::Semicolon).is_ok());
        assert_eq!(slice.eof_offset(), 0);
    }

    #[test]
    fn test_convert_error_at_end_of_input() {
        let tokens = significant_tokens("int x");
        let err = build_tree(&tokens).unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::E101));
        assert_eq!(err.labels()[0].span(), Span::new(5..5));
    }

    #[test]
    fn test_convert_error_points_at_offending_token() {
        let tokens = significant_tokens("int x = 1 2;");
        let err = build_tree(&tokens).unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::E100));
        assert_eq!(err.labels()[0].span(), Span::new(10..11));
        assert!(err.message().contains("`;`"), "{}", err.message());
    }

    #[test]
    fn test_binary_is_left_associative() {
        let tokens = significant_tokens("a - b - c");
        let mut slice = input_at_depth(&tokens, 0);
        let expr = expression(&mut slice).unwrap();

        assert_eq!(expr.kind(), NodeKind::AddOp);
        let kinds: Vec<_> = expr.child_nodes().map(SyntaxNode::kind).collect();
        assert_eq!(kinds, vec![NodeKind::AddOp, NodeKind::NameAtom]);
    }

    #[test]
    fn test_long_operator_chain() {
        let source = format!("x = {};", vec!["a"; 5_000].join(" + "));
        let tokens = significant_tokens(&source);

        assert!(build_tree(&tokens).is_ok());
    }

    #[test]
    fn test_deeply_nested_parens_are_rejected() {
        let source = format!("x = {}1{};", "(".repeat(10_000), ")".repeat(10_000));
        let tokens = significant_tokens(&source);
        let err = build_tree(&tokens).unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::E103));
        assert_eq!(err.labels()[0].span().len(), 1);
    }

    #[test]
    fn test_deeply_nested_blocks_are_rejected() {
        let source = format!("{}{}", "{".repeat(10_000), "}".repeat(10_000));
        let tokens = significant_tokens(&source);
        let err = build_tree(&tokens).unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::E103));
    }

    #[test]
    fn test_nesting_below_limit_is_accepted() {
        let source = format!("x = {}1{};", "(".repeat(40), ")".repeat(40));
        let tokens = significant_tokens(&source);

        assert!(build_tree(&tokens).is_ok());
    }

    #[test]
    fn test_long_else_if_chain() {
        let mut source = String::from("if (x == 0) y = 0;");
        for i in 1..400 {
            source.push_str(&format!(" else if (x == {i}) y = {i};"));
        }
        source.push_str(" else y = -1;");
        let tokens = significant_tokens(&source);

        assert!(build_tree(&tokens).is_ok());
    }

    #[test]
    fn test_else_if_nests_under_else() {
        let tokens = significant_tokens("if (a) x; else if (b) y; else z;");
        let tree = build_tree(&tokens).unwrap();

        let outer = tree
            .child_nodes()
            .next()
            .and_then(|stmt| stmt.child_nodes().next())
            .unwrap();
        assert_eq!(outer.kind(), NodeKind::IfStmt);
        let else_stmt = outer.child_nodes().nth(2).unwrap();
        assert_eq!(else_stmt.kind(), NodeKind::ElseStmt);

        let inner_stmt = else_stmt.child_nodes().next().unwrap();
        assert_eq!(inner_stmt.kind(), NodeKind::Statement);
        assert_eq!(inner_stmt.span(), Span::new(15..17));
        let inner = inner_stmt.child_nodes().next().unwrap();
        assert_eq!(inner.kind(), NodeKind::IfStmt);
        let kinds: Vec<_> = inner.child_nodes().map(SyntaxNode::kind).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::NameAtom, NodeKind::Statement, NodeKind::ElseStmt]
        );
    }
}

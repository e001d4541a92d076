//! Lexical analyzer for C-like source text.
//!
//! The lexer converts source text into a stream of [`Token`]s for parsing.
//! Besides the usual C tokens it recognizes the preprocessor directives the
//! renderer understands (`#define`, `#undef`, `#ifdef`, `#ifndef`, `#endif`
//! and `#include`). Literals are kept verbatim.
//!
//! The public entry point is [`tokenize`], which performs error-recovering
//! lexical analysis and collects all diagnostics in a single pass.

use log::debug;
use winnow::{
    Parser as _,
    ascii::{digit0, digit1, hex_digit1, space0},
    combinator::{alt, cut_err, not, opt, peek, preceded, repeat},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{any, none_of, one_of, take_till, take_until, take_while},
};

use cdot_core::Span;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    tokens::{PositionedToken, Token},
};

/// Rich diagnostic information for lexer errors.
///
/// Attached to winnow errors via `.context()` to provide detailed error
/// messages with codes, help text, and precise span information.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Build a committed error carrying `diagnostic`.
fn cut_error(input: &Input<'_>, diagnostic: LexerDiagnostic) -> ErrMode<ContextError<LexerDiagnostic>> {
    ErrMode::Cut(ContextError::new().add_context(input, &input.checkpoint(), diagnostic))
}

/// Succeed only if the next character cannot continue a word.
fn word_boundary<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    peek(not(one_of(|c: char| c.is_ascii_alphanumeric() || c == '_'))).parse_next(input)
}

/// Parse line comment starting with `//`
fn line_comment<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    preceded("//", take_while(0.., |c| c != '\n'))
        .map(Token::LineComment)
        .parse_next(input)
}

/// Parse a `/* ... */` comment.
///
/// An unterminated comment swallows the rest of the input so that its body
/// is not reported as a cascade of unrelated errors.
fn block_comment<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let start = input.current_token_start();
    "/*".parse_next(input)?;

    let body: IResult<'a, &'a str> = take_until(0.., "*/").parse_next(input);
    match body {
        Ok(body) => {
            "*/".parse_next(input)?;
            Ok(Token::BlockComment(body))
        }
        Err(_) => {
            take_while(0.., |_: char| true).void().parse_next(input)?;
            Err(cut_error(
                input,
                LexerDiagnostic {
                    code: ErrorCode::E004,
                    message: "unterminated block comment",
                    help: Some("add closing `*/`"),
                    start,
                },
            ))
        }
    }
}

/// Parse the path of an `#include`, delimiters included.
fn include_path<'a>(input: &mut Input<'a>, start: usize) -> IResult<'a, Token<'a>> {
    space0.parse_next(input)?;

    let path: IResult<'a, &'a str> = alt((
        ('<', take_till(1.., ['>', '\n']), '>').take(),
        ('"', take_till(1.., ['"', '\n']), '"').take(),
    ))
    .parse_next(input);

    match path {
        Ok(path) => Ok(Token::Include(path)),
        Err(_) => Err(cut_error(
            input,
            LexerDiagnostic {
                code: ErrorCode::E006,
                message: "malformed include path",
                help: Some("use `#include <file.h>` or `#include \"file.h\"`"),
                start,
            },
        )),
    }
}

/// Parse a preprocessor directive introducer such as `#define`.
///
/// Whitespace is allowed between `#` and the directive name.
fn directive<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let start = input.current_token_start();
    ('#', space0).void().parse_next(input)?;

    let name: &str = take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_')
        .parse_next(input)?;

    match name {
        "define" => Ok(Token::Define),
        "undef" => Ok(Token::Undef),
        "ifdef" => Ok(Token::Ifdef),
        "ifndef" => Ok(Token::Ifndef),
        "endif" => Ok(Token::Endif),
        "include" => include_path(input, start),
        _ => Err(cut_error(
            input,
            LexerDiagnostic {
                code: ErrorCode::E005,
                message: "unknown preprocessor directive",
                help: Some(
                    "supported directives: `#define`, `#undef`, `#ifdef`, `#ifndef`, `#endif`, `#include`",
                ),
                start,
            },
        )),
    }
}

/// Parse the body of a quoted literal up to, not including, the closing quote.
///
/// A backslash escapes any following character. The body may not span lines.
fn quoted_body<'a>(input: &mut Input<'a>, quote: char) -> IResult<'a, ()> {
    repeat(
        0..,
        alt((('\\', any).void(), none_of([quote, '\\', '\n']).void())),
    )
    .parse_next(input)
}

/// Parse a double-quoted string literal, quotes included.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let start = input.current_token_start();
    (
        '"',
        cut_err((|i: &mut Input<'a>| quoted_body(i, '"'), '"')).context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add closing `\"`"),
            start,
        }),
    )
        .take()
        .map(Token::StringLiteral)
        .parse_next(input)
}

/// Parse a single-quoted character literal, quotes included.
fn char_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let start = input.current_token_start();
    (
        '\'',
        cut_err((|i: &mut Input<'a>| quoted_body(i, '\''), '\'')).context(LexerDiagnostic {
            code: ErrorCode::E003,
            message: "unterminated character literal",
            help: Some("add closing `'`"),
            start,
        }),
    )
        .take()
        .map(Token::CharLiteral)
        .parse_next(input)
}

fn exponent<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    (one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)
        .void()
        .parse_next(input)
}

/// Parse a float literal such as `1.5`, `.5e3` or `2e-1f`
fn float_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    (
        alt((
            (digit1, '.', digit0, opt(exponent)).void(),
            ('.', digit1, opt(exponent)).void(),
            (digit1, exponent).void(),
        )),
        opt(one_of(['f', 'F', 'l', 'L'])),
        word_boundary,
    )
        .take()
        .map(Token::FloatLiteral)
        .parse_next(input)
}

/// Parse a decimal or hexadecimal integer literal with optional suffix
fn int_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    (
        alt((
            ('0', one_of(['x', 'X']), hex_digit1).void(),
            digit1.void(),
        )),
        take_while(0.., ['u', 'U', 'l', 'L']),
        word_boundary,
    )
        .take()
        .map(Token::IntLiteral)
        .parse_next(input)
}

fn keyword_or_identifier(word: &str) -> Token<'_> {
    match word {
        "typedef" => Token::Typedef,
        "return" => Token::Return,
        "if" => Token::If,
        "else" => Token::Else,
        "for" => Token::For,
        "while" => Token::While,
        "sizeof" => Token::Sizeof,
        "struct" => Token::Struct,
        "union" => Token::Union,
        "enum" => Token::Enum,
        "const" => Token::Const,
        "break" => Token::Break,
        "continue" => Token::Continue,
        "void" | "char" | "short" | "int" | "long" | "float" | "double" | "signed"
        | "unsigned" => Token::TypeKeyword(word),
        _ => Token::Identifier(word),
    }
}

/// Parse a keyword or identifier
fn word<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .map(keyword_or_identifier)
        .parse_next(input)
}

/// Parse operators (order matters - longest first)
fn operator<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt((
        alt((
            "...", "<<=", ">>=", "->", "++", "--", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||",
        )),
        alt(("+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=")),
        one_of(['+', '-', '*', '/', '%', '<', '>', '=', '!', '~', '&', '|', '^']).take(),
    ))
    .map(|op| match op {
        "..." => Token::Ellipsis,
        "->" => Token::Arrow,
        _ => Token::Op(op),
    })
    .parse_next(input)
}

/// Parse single character punctuation
fn punctuation<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt((
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        ';'.value(Token::Semicolon),
        ','.value(Token::Comma),
        '.'.value(Token::Dot),
        '?'.value(Token::Question),
        ':'.value(Token::Colon),
    ))
    .parse_next(input)
}

/// Parse a backslash-newline, which joins two physical lines
fn line_continuation<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt(("\\\n", "\\\r\n"))
        .value(Token::Whitespace)
        .parse_next(input)
}

fn newline<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt(("\r\n", "\n")).value(Token::Newline).parse_next(input)
}

/// Parse whitespace (spaces, tabs, etc. but not newlines)
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    take_while(1.., [' ', '\t', '\r', '\x0b', '\x0c'])
        .value(Token::Whitespace)
        .parse_next(input)
}

/// Parse a single token with position tracking
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<'a, PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        line_comment,      // Must come before operators
        block_comment,     // Must come before operators
        directive,
        string_literal,
        char_literal,
        float_literal,     // Must come before int and `.`
        int_literal,
        word,
        operator,          // Must come before punctuation for `...` and `->`
        punctuation,
        line_continuation,
        newline,           // Must come before whitespace
        whitespace,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    let span = Span::new(start_pos..end_pos);

    Ok(PositionedToken::new(token, span))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Tokenize the input, collecting tokens and errors.
    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            match positioned_token(&mut input) {
                Ok(token) => {
                    self.tokens.push(token);
                }
                Err(e) => {
                    let error_pos = input.current_token_start();

                    let diagnostic = Self::convert_err_mode(e, error_pos);
                    self.diagnostics.emit(diagnostic);

                    // Skip one character and resume
                    if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    /// Finish lexing and return tokens or collected errors.
    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Extracts `LexerDiagnostic` from the error context for rich error info
    /// with code, message, and help. Falls back to E002 (unexpected character)
    /// if no diagnostic context is found.
    fn convert_err_mode(
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos.max(*start + 1));

            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
    }
}

/// Tokenize source text, collecting multiple errors.
///
/// Attempts to recover from errors and continue tokenizing, so that every
/// malformed token of the input is reported in a single pass.
///
/// # Returns
///
/// - `Ok(tokens)` - All tokens successfully parsed
/// - `Err(ParseError)` - One or more errors occurred; contains all diagnostics
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new();
    lexer.tokenize(LocatingSlice::new(input));
    let tokens = lexer.finish()?;
    debug!(tokens = tokens.len(); "Source tokenized");
    Ok(tokens)
}

//! Token types produced by the [`lexer`](super::lexer).

use std::fmt;

use cdot_core::Span;

/// A lexical token of the C-like source language.
///
/// Literals keep their verbatim spelling (quotes and suffixes included) so
/// that the rendered graph shows exactly what was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'src> {
    // Keywords
    Typedef,
    Return,
    If,
    Else,
    For,
    While,
    Sizeof,
    Struct,
    Union,
    Enum,
    Const,
    Break,
    Continue,
    /// Builtin type keyword such as `int`, `unsigned` or `void`.
    TypeKeyword(&'src str),

    Identifier(&'src str),

    // Literals
    IntLiteral(&'src str),
    FloatLiteral(&'src str),
    CharLiteral(&'src str),
    StringLiteral(&'src str),

    /// Arithmetic, logical, bitwise or assignment operator.
    Op(&'src str),

    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,
    Dot,
    Arrow,
    Question,
    Colon,
    Ellipsis,

    // Preprocessor directives
    Define,
    Undef,
    Ifdef,
    Ifndef,
    Endif,
    /// `#include` with its delimited path, e.g. `<stdio.h>`.
    Include(&'src str),

    // Trivia
    LineComment(&'src str),
    BlockComment(&'src str),
    Whitespace,
    Newline,
}

impl Token<'_> {
    /// Returns `true` for whitespace, newlines and comments.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Token::Whitespace | Token::Newline | Token::LineComment(_) | Token::BlockComment(_)
        )
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Typedef => write!(f, "typedef"),
            Token::Return => write!(f, "return"),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::For => write!(f, "for"),
            Token::While => write!(f, "while"),
            Token::Sizeof => write!(f, "sizeof"),
            Token::Struct => write!(f, "struct"),
            Token::Union => write!(f, "union"),
            Token::Enum => write!(f, "enum"),
            Token::Const => write!(f, "const"),
            Token::Break => write!(f, "break"),
            Token::Continue => write!(f, "continue"),
            Token::TypeKeyword(text)
            | Token::Identifier(text)
            | Token::IntLiteral(text)
            | Token::FloatLiteral(text)
            | Token::CharLiteral(text)
            | Token::StringLiteral(text)
            | Token::Op(text)
            | Token::LineComment(text)
            | Token::BlockComment(text) => write!(f, "{text}"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::Arrow => write!(f, "->"),
            Token::Question => write!(f, "?"),
            Token::Colon => write!(f, ":"),
            Token::Ellipsis => write!(f, "..."),
            Token::Define => write!(f, "#define"),
            Token::Undef => write!(f, "#undef"),
            Token::Ifdef => write!(f, "#ifdef"),
            Token::Ifndef => write!(f, "#ifndef"),
            Token::Endif => write!(f, "#endif"),
            Token::Include(path) => write!(f, "#include {path}"),
            Token::Whitespace => write!(f, " "),
            Token::Newline => writeln!(f),
        }
    }
}

/// A token together with its location in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

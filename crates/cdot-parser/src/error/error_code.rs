//! Error codes for the cdot diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A string was opened with `"` but the line ended before it was closed.
    E001,

    /// Unexpected character.
    ///
    /// A character was encountered that does not start any token.
    E002,

    /// Unterminated character literal.
    ///
    /// A character literal was opened with `'` but never closed.
    E003,

    /// Unterminated block comment.
    ///
    /// A `/*` comment runs to the end of the input without `*/`.
    E004,

    /// Unknown preprocessor directive.
    ///
    /// Only `#define`, `#undef`, `#ifdef`, `#ifndef`, `#endif` and `#include`
    /// are recognized.
    E005,

    /// Malformed include path.
    ///
    /// `#include` must be followed by `<path>` or `"path"`.
    E006,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// The parser encountered a token it did not expect at this position.
    E100,

    /// Incomplete input.
    ///
    /// The input ended unexpectedly before a complete construct was parsed.
    E101,

    /// Unterminated conditional directive.
    ///
    /// An `#ifdef` or `#ifndef` has no matching `#endif`.
    E102,

    /// Nesting too deep.
    ///
    /// Parentheses, statements, bodies or nested types are nested past the
    /// parser's depth limit.
    E103,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            ErrorCode::E006 => "E006",
            // Parser errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "unterminated character literal",
            ErrorCode::E004 => "unterminated block comment",
            ErrorCode::E005 => "unknown preprocessor directive",
            ErrorCode::E006 => "malformed include path",
            // Parser errors
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E102 => "unterminated conditional directive",
            ErrorCode::E103 => "nesting too deep",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E102.to_string(), "E102");
        assert_eq!(ErrorCode::E103.to_string(), "E103");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E004.description(), "unterminated block comment");
        assert_eq!(ErrorCode::E005.description(), "unknown preprocessor directive");
        assert_eq!(
            ErrorCode::E102.description(),
            "unterminated conditional directive"
        );
    }
}

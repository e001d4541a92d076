//! The core diagnostic type of the parser error system.
//!
//! A [`Diagnostic`] represents a single error with optional
//! error code, multiple labeled source spans, and help text.

use std::fmt;

use cdot_core::Span;

use crate::error::{error_code::ErrorCode, label::Label};

/// A diagnostic message with source location information.
///
/// Diagnostics carry:
/// - An optional error code for documentation and searchability
/// - A primary message describing the issue
/// - One or more labeled source spans
/// - Optional help text with suggestions
///
/// # Example
///
/// ```text
/// error[E001]: unterminated string literal
///   |
/// 3 |     printf("Hello, world!);
///   |            ^^^^^^^^^^^^^^^^ unterminated string literal
///   |
///   = help: add closing `"`
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use cdot_parser::error::{Diagnostic, ErrorCode};
    /// # use cdot_parser::Span;
    ///
    /// let diag = Diagnostic::error("unknown preprocessor directive `#pragma`")
    ///     .with_code(ErrorCode::E005)
    ///     .with_label(Span::new(0..7), "not supported")
    ///     .with_help("supported directives: #define, #undef, #ifdef, #ifndef, #endif, #include");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // "error[E001]: message" or "error: message"
        write!(f, "error")?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

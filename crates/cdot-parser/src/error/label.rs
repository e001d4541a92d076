//! Labeled source spans for diagnostic messages.

use cdot_core::Span;

/// A message attached to a span of the source.
///
/// A diagnostic usually carries one primary label marking where the problem
/// is, and may add secondary labels for related locations such as the
/// directive that opened an unterminated `#ifdef`.
///
/// ```text
/// error[E102]: `#ifdef DEBUG` is never closed
///   |
/// 1 | #ifdef DEBUG
///   | ------------ conditional opened here
/// 2 | int x;
///   |       ^ input ends here
/// ```
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}

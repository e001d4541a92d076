//! Collector for accumulating diagnostics during lexing.
//!
//! The [`DiagnosticCollector`] lets the lexer report every malformed token
//! in one pass instead of stopping at the first.

use crate::error::{Diagnostic, ParseError};

#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic, marking the collector as failed.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Finish collection.
    ///
    /// Returns `Err(ParseError)` with every diagnostic, in emission order, if
    /// any was emitted.
    pub fn finish(self) -> Result<(), ParseError> {
        if self.diagnostics.is_empty() {
            Ok(())
        } else {
            Err(ParseError::new(self.diagnostics))
        }
    }
}

#[cfg(test)]
mod tests {
    use cdot_core::Span;

    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_collector_empty_is_ok() {
        assert!(DiagnosticCollector::new().finish().is_ok());
    }

    #[test]
    fn test_collector_keeps_all_diagnostics_on_error() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(
            Diagnostic::error("unexpected character")
                .with_code(ErrorCode::E002)
                .with_label(Span::new(4..5), "here"),
        );
        collector.emit(Diagnostic::error("unknown preprocessor directive"));
        collector.emit(Diagnostic::error("unterminated string literal").with_code(ErrorCode::E001));

        let err = collector.finish().unwrap_err();
        assert_eq!(err.diagnostics().len(), 3);
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E002));
        assert_eq!(err.diagnostics()[2].code(), Some(ErrorCode::E001));
    }
}

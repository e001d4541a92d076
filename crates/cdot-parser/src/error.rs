//! Error and diagnostic system for the cdot parser.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Multiple labeled spans for rich error context
//! - Diagnostic collector for accumulating multiple errors
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error message with optional error code, multiple source
//! locations, and help text. Multiple diagnostics are wrapped in [`ParseError`]
//! for returning from [`parse`](crate::parse).
//!
//! # Example
//!
//! ```
//! # use cdot_parser::error::{Diagnostic, ErrorCode};
//! # use cdot_parser::Span;
//!
//! let span = Span::new(12..18);
//! let opened = Span::new(0..12);
//!
//! let diag = Diagnostic::error("`#ifdef DEBUG` is never closed")
//!     .with_code(ErrorCode::E102)
//!     .with_label(span, "input ends here")
//!     .with_secondary_label(opened, "conditional opened here")
//!     .with_help("add a matching `#endif`");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;

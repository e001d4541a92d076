//! Rendering of [`CdotError`] through miette.
//!
//! A parse failure expands into one [`Report`] per diagnostic so that each
//! is drawn against the source; every other failure is a single report with
//! a code and no snippet.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use cdot::CdotError;
use cdot_parser::error::Diagnostic;

/// One miette report of a failed run.
#[derive(Debug)]
pub enum Report<'a> {
    /// A parser diagnostic drawn against `src`.
    Source { diag: &'a Diagnostic, src: &'a str },
    /// An I/O, traversal or DOT failure without a source location.
    Failure(&'a CdotError),
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Source { diag, .. } => f.write_str(diag.message()),
            Report::Failure(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for Report<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Report::Source { .. } => None,
            Report::Failure(err) => err.source(),
        }
    }
}

impl MietteDiagnostic for Report<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self {
            Report::Source { diag, .. } => diag.code()?.as_str(),
            Report::Failure(CdotError::Io(_)) => "cdot::io",
            Report::Failure(CdotError::Parse { .. }) => return None,
            Report::Failure(CdotError::Traversal(_)) => "cdot::traversal",
            #[cfg(feature = "graphviz")]
            Report::Failure(CdotError::InvalidDot(_)) => "cdot::dot",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self {
            Report::Source { diag, .. } => diag.help()?,
            Report::Failure(CdotError::Traversal(_)) => {
                "the syntax tree does not match the node kinds' rendering rules"
            }
            Report::Failure(_) => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Report::Source { src, .. } => Some(src as &dyn miette::SourceCode),
            Report::Failure(_) => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let Report::Source { diag, .. } = self else {
            return None;
        };
        if diag.labels().is_empty() {
            return None;
        }

        Some(Box::new(diag.labels().iter().map(|label| {
            let span = SourceSpan::new(label.span().start().into(), label.span().len());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Split `err` into the reports to render, in order.
pub fn reports(err: &CdotError) -> Vec<Report<'_>> {
    match err {
        CdotError::Parse {
            err: parse_err,
            src,
        } => parse_err
            .diagnostics()
            .iter()
            .map(|diag| Report::Source { diag, src })
            .collect(),
        _ => vec![Report::Failure(err)],
    }
}

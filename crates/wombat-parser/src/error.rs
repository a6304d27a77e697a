//! Parse diagnostics and the pluggable error channel.
//!
//! Malformed input never aborts a parse: every problem becomes a
//! [`Diagnostic`] handed to an [`ErrorHandler`], and the parser recovers.
//! Only resource exhaustion surfaces as a [`ParseError`].

use core::fmt;

use strum_macros::Display;
use thiserror::Error;
use wombat_common::warning::{error_once, warn_once};

use crate::tokenizer::Position;

/// The category of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ErrorKind {
    /// Malformed lexical construct (unterminated tag, bad name character).
    Tokenization,
    /// Mismatched or unbalanced tags, misplaced content.
    Structural,
    /// Reference to an entity the active table does not define.
    UndefinedEntity,
    /// A prefix with no binding in scope.
    NamespaceResolution,
}

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// Recoverable; the construct was kept as best as possible.
    Warning,
    /// The construct was abandoned; the parse still returns a document.
    Fatal,
}

/// One problem found in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Category.
    pub kind: ErrorKind,
    /// Severity.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Where the offending construct starts.
    pub position: Position,
}

impl Diagnostic {
    /// A recoverable diagnostic.
    #[must_use]
    pub fn warning(kind: ErrorKind, position: Position, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            message: message.into(),
            position,
        }
    }

    /// A diagnostic for an abandoned construct.
    #[must_use]
    pub fn fatal(kind: ErrorKind, position: Position, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Fatal,
            message: message.into(),
            position,
        }
    }

    /// Whether this is a fatal diagnostic.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} at {}: {}",
            self.severity, self.kind, self.position, self.message
        )
    }
}

/// Receives every diagnostic a parse produces, in source order.
pub trait ErrorHandler {
    /// Called once per diagnostic.
    fn report(&mut self, diagnostic: &Diagnostic);
}

impl<F> ErrorHandler for F
where
    F: FnMut(&Diagnostic),
{
    fn report(&mut self, diagnostic: &Diagnostic) {
        self(diagnostic);
    }
}

/// Discards everything. Used when no handler is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullErrorHandler;

impl ErrorHandler for NullErrorHandler {
    fn report(&mut self, _diagnostic: &Diagnostic) {}
}

/// Stores diagnostics for later inspection.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollector {
    /// Everything reported so far.
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create an empty collector.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    /// Diagnostics of the given severity.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.severity == severity)
    }

    /// Diagnostics of the given kind.
    pub fn of_kind(&self, kind: ErrorKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    /// Whether anything fatal was reported.
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_fatal)
    }
}

impl ErrorHandler for DiagnosticCollector {
    fn report(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
    }
}

/// Writes diagnostics to stderr through the deduplicating warning log.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleErrorHandler;

impl ErrorHandler for ConsoleErrorHandler {
    fn report(&mut self, diagnostic: &Diagnostic) {
        let component = match diagnostic.kind {
            ErrorKind::Tokenization => "Tokenizer",
            _ => "Tree Builder",
        };
        let message = diagnostic.to_string();
        match diagnostic.severity {
            Severity::Warning => warn_once(component, &message),
            Severity::Fatal => error_once(component, &message),
        }
    }
}

/// The failures that end a parse without a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Element nesting went deeper than the configured limit.
    #[error("element nesting exceeds the limit of {limit} at {position}")]
    DepthLimitExceeded {
        /// The configured maximum depth.
        limit: usize,
        /// Start of the element that crossed the limit.
        position: Position,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::fatal(
            ErrorKind::Structural,
            Position::new(3, 7),
            "end tag </b> does not match <a>",
        );
        assert_eq!(
            d.to_string(),
            "fatal Structural at 3:7: end tag </b> does not match <a>"
        );
    }

    #[test]
    fn test_closure_is_a_handler() {
        let mut seen = 0;
        {
            let mut handler = |_: &Diagnostic| seen += 1;
            let d = Diagnostic::warning(ErrorKind::Tokenization, Position::START, "x");
            handler.report(&d);
            handler.report(&d);
        }
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_console_handler_logs_by_component() {
        use wombat_common::warning::{clear_warnings, has_reported};

        let warning = Diagnostic::warning(
            ErrorKind::Tokenization,
            Position::new(2, 5),
            "attribute value is not quoted",
        );
        let fatal = Diagnostic::fatal(
            ErrorKind::Structural,
            Position::new(4, 1),
            "element <a> is not closed at end of input",
        );

        clear_warnings();
        let mut handler = ConsoleErrorHandler;
        handler.report(&warning);
        handler.report(&fatal);

        assert!(has_reported(
            "Tokenizer",
            "warning Tokenization at 2:5: attribute value is not quoted"
        ));
        assert!(has_reported(
            "Tree Builder",
            "fatal Structural at 4:1: element <a> is not closed at end of input"
        ));
        assert!(!has_reported("Tokenizer", &fatal.to_string()));

        clear_warnings();
        assert!(!has_reported("Tokenizer", &warning.to_string()));
    }

    #[test]
    fn test_collector_filters() {
        let mut collector = DiagnosticCollector::new();
        collector.report(&Diagnostic::warning(
            ErrorKind::UndefinedEntity,
            Position::START,
            "&foo;",
        ));
        collector.report(&Diagnostic::fatal(
            ErrorKind::Structural,
            Position::START,
            "bad",
        ));
        assert!(collector.has_fatal());
        assert_eq!(collector.with_severity(Severity::Warning).count(), 1);
        assert_eq!(collector.of_kind(ErrorKind::Structural).count(), 1);
    }
}

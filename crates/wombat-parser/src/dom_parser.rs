//! The `DOMParser` entry point.
//!
//! [DOM Parsing § 3 The `DOMParser` interface](https://w3c.github.io/DOM-Parsing/#the-domparser-interface)
//!
//! Wires the tokenizer to the tree builder and handles the caller's
//! configuration slots: the error channel, the locator and the `xmlns`
//! map. The locator and the map's `""` entry are written back after every
//! call, including calls that fail.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wombat_common::MimeType;
use wombat_dom::Document;

use crate::builder::{DEFAULT_MAX_DEPTH, DocumentBuilder};
use crate::error::{Diagnostic, ErrorHandler, ErrorKind, NullErrorHandler, ParseError};
use crate::tokenizer::{MarkupTokenizer, Position};

/// Prefix to namespace URI bindings; the `""` key is the default namespace.
pub type NamespaceMap = BTreeMap<String, Option<String>>;

/// The caller-visible parse position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locator {
    /// 1-based line.
    pub line_number: usize,
    /// 1-based column.
    pub column_number: usize,
}

impl Default for Locator {
    fn default() -> Self {
        Position::START.into()
    }
}

impl From<Position> for Locator {
    fn from(position: Position) -> Self {
        Self {
            line_number: position.line,
            column_number: position.column,
        }
    }
}

/// Constructor-time configuration for [`DOMParser`].
pub struct ParserOptions<'a> {
    /// Receives every diagnostic. Parsing is silent without one.
    pub error_handler: Option<&'a mut dyn ErrorHandler>,
    /// Overwritten with the final parse position after each call.
    pub locator: Option<&'a mut Locator>,
    /// Initial prefix bindings; the `""` entry is overwritten with the
    /// resolved default namespace after each call.
    pub xmlns: Option<&'a mut NamespaceMap>,
    /// Element nesting limit.
    pub max_depth: usize,
}

impl<'a> ParserOptions<'a> {
    /// Options with no slots and the default depth limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            error_handler: None,
            locator: None,
            xmlns: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Route diagnostics to `handler`.
    #[must_use]
    pub fn with_error_handler(mut self, handler: &'a mut dyn ErrorHandler) -> Self {
        self.error_handler = Some(handler);
        self
    }

    /// Write the final position into `locator`.
    #[must_use]
    pub fn with_locator(mut self, locator: &'a mut Locator) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Read bindings from, and write the resolved default back into, `xmlns`.
    #[must_use]
    pub fn with_xmlns(mut self, xmlns: &'a mut NamespaceMap) -> Self {
        self.xmlns = Some(xmlns);
        self
    }

    /// Set the element nesting limit.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParserOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses markup strings into [`Document`]s.
///
/// # Example
///
/// ```
/// use wombat_parser::{DOMParser, ParserOptions};
///
/// let mut parser = DOMParser::new(ParserOptions::default());
/// let doc = parser.parse_from_string("<xml>hi</xml>", None).unwrap();
/// assert_eq!(doc.to_string(), "<xml>hi</xml>");
/// ```
pub struct DOMParser<'a> {
    options: ParserOptions<'a>,
}

impl<'a> DOMParser<'a> {
    /// Create a parser over the given configuration.
    #[must_use]
    pub const fn new(options: ParserOptions<'a>) -> Self {
        Self { options }
    }

    /// The parser's configuration.
    #[must_use]
    pub const fn options(&self) -> &ParserOptions<'a> {
        &self.options
    }

    /// Parse `source` as a document of the declared `mime_type`
    /// (`application/xml` when `None`).
    ///
    /// Malformed input is reported to the error handler and repaired; the
    /// call still returns a document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::DepthLimitExceeded`] when elements nest deeper
    /// than the configured limit.
    pub fn parse_from_string(
        &mut self,
        source: &str,
        mime_type: Option<&str>,
    ) -> Result<Document, ParseError> {
        let ParserOptions {
            error_handler,
            locator,
            xmlns,
            max_depth,
        } = &mut self.options;

        let mut fallback = NullErrorHandler;
        let reporter: &mut dyn ErrorHandler = match error_handler.as_deref_mut() {
            Some(handler) => handler,
            None => &mut fallback,
        };

        let mime = resolve_mime_type(mime_type, reporter);
        let bindings = xmlns.as_deref().cloned().unwrap_or_default();

        let mut builder = DocumentBuilder::with_mime_type(mime).max_depth(*max_depth);
        builder.start_document(&bindings);
        forward(reporter, builder.take_diagnostics());

        let result = run(source, &mut builder, reporter);

        if let Some(locator) = locator.as_deref_mut() {
            *locator = builder.last_event_position().into();
        }
        if let Some(xmlns) = xmlns.as_deref_mut() {
            let _ = xmlns.insert(
                String::new(),
                builder.default_namespace().map(str::to_string),
            );
        }

        result.map(|()| builder.into_document())
    }
}

impl Default for DOMParser<'_> {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}

/// Feed every token to the builder, forwarding diagnostics in order.
fn run(
    source: &str,
    builder: &mut DocumentBuilder,
    reporter: &mut dyn ErrorHandler,
) -> Result<(), ParseError> {
    let mut tokenizer = MarkupTokenizer::new(source, builder.flavor());
    while let Some(token) = tokenizer.next_token() {
        forward(reporter, tokenizer.take_diagnostics());
        let processed = builder.process_token(token);
        forward(reporter, builder.take_diagnostics());
        processed?;
    }
    forward(reporter, tokenizer.take_diagnostics());
    Ok(())
}

fn forward(reporter: &mut dyn ErrorHandler, diagnostics: Vec<Diagnostic>) {
    for diagnostic in diagnostics {
        reporter.report(&diagnostic);
    }
}

/// A missing type means `application/xml`; so does a malformed one, after
/// a warning.
fn resolve_mime_type(declared: Option<&str>, reporter: &mut dyn ErrorHandler) -> MimeType {
    let Some(declared) = declared else {
        return MimeType::default();
    };
    MimeType::parse(declared).unwrap_or_else(|| {
        reporter.report(&Diagnostic::warning(
            ErrorKind::Tokenization,
            Position::START,
            format!("malformed MIME type {declared:?}; parsing as application/xml"),
        ));
        MimeType::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiagnosticCollector;

    #[test]
    fn test_locator_default_is_one_one() {
        assert_eq!(
            Locator::default(),
            Locator {
                line_number: 1,
                column_number: 1
            }
        );
    }

    #[test]
    fn test_missing_mime_type_is_xml() {
        let mut parser = DOMParser::default();
        let doc = parser.parse_from_string("<a/>", None).unwrap();
        assert_eq!(doc.content_type(), "application/xml");
    }

    #[test]
    fn test_malformed_mime_type_warns() {
        let mut collector = DiagnosticCollector::new();
        {
            let mut parser =
                DOMParser::new(ParserOptions::new().with_error_handler(&mut collector));
            let doc = parser.parse_from_string("<a/>", Some("nonsense")).unwrap();
            assert_eq!(doc.content_type(), "application/xml");
        }
        assert_eq!(collector.of_kind(ErrorKind::Tokenization).count(), 1);
    }

    #[test]
    fn test_closure_as_error_handler() {
        let mut messages = Vec::new();
        let mut handler = |d: &Diagnostic| messages.push(d.message.clone());
        {
            let mut parser = DOMParser::new(ParserOptions::new().with_error_handler(&mut handler));
            let _ = parser.parse_from_string("<a><b></a>", None).unwrap();
        }
        assert!(!messages.is_empty());
    }

    #[test]
    fn test_slots_written_on_failure() {
        let mut locator = Locator {
            line_number: 9,
            column_number: 9,
        };
        let mut xmlns = NamespaceMap::new();
        {
            let mut parser = DOMParser::new(
                ParserOptions::new()
                    .with_locator(&mut locator)
                    .with_xmlns(&mut xmlns)
                    .with_max_depth(1),
            );
            assert!(parser.parse_from_string("<a><b/></a>", None).is_err());
        }
        assert_eq!(
            locator,
            Locator {
                line_number: 1,
                column_number: 4
            }
        );
        assert_eq!(xmlns.get(""), Some(&None));
    }
}

//! XML and HTML parsing for the Wombat markup parser.
//!
//! # Scope
//!
//! This crate implements:
//! - **Markup Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!   shaped, covering the XML and HTML surface syntax)
//!   - Tags, attributes, text, comments, CDATA, processing instructions, DOCTYPE
//!   - Raw text elements (`script`, `style`, `title`, `textarea`) in HTML
//!   - Line/column tracking and recovery from malformed markup
//!
//! - **Tree Builder** ([Namespaces in XML 1.0](https://www.w3.org/TR/xml-names/))
//!   - Flavor and default namespace chosen from the declared MIME type
//!   - Namespace scope stack and prefix resolution
//!   - Entity decoding with the flavor's entity table
//!   - Structural repair of mismatched or unclosed tags
//!
//! - **`DOMParser`** ([DOM Parsing § 3](https://w3c.github.io/DOM-Parsing/#the-domparser-interface))
//!   - Pluggable error handler, locator and `xmlns` configuration slots
//!
//! # Not Yet Implemented
//!
//! - DTD validation and external entities
//! - The HTML5 tree construction algorithm (implied tags, foster parenting)

/// Tree construction from tokenizer events.
pub mod builder;
/// The `DOMParser` entry point and its configuration.
pub mod dom_parser;
/// Diagnostics, error handlers and the unrecoverable parse error.
pub mod error;
/// Namespace scope stack.
pub mod namespace;
/// Markup tokenizer.
pub mod tokenizer;

pub use builder::{DEFAULT_MAX_DEPTH, DocumentBuilder};
pub use dom_parser::{DOMParser, Locator, NamespaceMap, ParserOptions};
pub use error::{
    ConsoleErrorHandler, Diagnostic, DiagnosticCollector, ErrorHandler, ErrorKind,
    NullErrorHandler, ParseError, Severity,
};
pub use namespace::NamespaceScopes;
pub use tokenizer::{MarkupTokenizer, Position, SourceToken, Token};
pub use wombat_dom::Document;

/// Parse `source` with default options.
///
/// # Errors
///
/// Returns [`ParseError::DepthLimitExceeded`] when elements nest deeper than
/// [`DEFAULT_MAX_DEPTH`].
pub fn parse(source: &str, mime_type: Option<&str>) -> Result<Document, ParseError> {
    DOMParser::default().parse_from_string(source, mime_type)
}

//! Tree construction from tokenizer events.
//!
//! The [`DocumentBuilder`] is the document handler: it receives one event
//! per token (`start_element`, `characters`, ...), keeps the stack of open
//! elements and the namespace scopes, and grows a [`Document`]. Malformed
//! structure is reported and repaired; nothing here panics or aborts except
//! the nesting depth limit.

use std::collections::BTreeMap;

use wombat_common::{EntityIssue, EntityTable, Flavor, MimeType, html_elements, namespace};
use wombat_dom::{
    AttributesMap, DoctypeData, Document, ElementData, NodeId, NodeType, ProcessingInstructionData,
    split_qualified_name,
};

use crate::error::{Diagnostic, ErrorKind, ParseError};
use crate::namespace::NamespaceScopes;
use crate::tokenizer::{Attribute, Position, SourceToken, Token};

/// Default limit on element nesting.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Character data waiting for the next structural event.
struct PendingText {
    data: String,
    position: Position,
    escapable: bool,
}

/// Builds a [`Document`] from markup events.
pub struct DocumentBuilder {
    mime_type: MimeType,
    max_depth: usize,
    document: Document,
    table: EntityTable,
    scopes: NamespaceScopes,
    /// Stack of open elements; the insertion point is the last one, or the
    /// document when empty.
    open_elements: Vec<NodeId>,
    pending_text: Option<PendingText>,
    /// Open tag names inside an ignored subtree (a second root element).
    skipped: Vec<String>,
    default_namespace: Option<String>,
    last_event: Option<Position>,
    diagnostics: Vec<Diagnostic>,
}

impl DocumentBuilder {
    /// A builder for `application/xml` with the default depth limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mime_type(MimeType::default())
    }

    /// A builder for the given content type.
    #[must_use]
    pub fn with_mime_type(mime_type: MimeType) -> Self {
        let flavor = mime_type.flavor();
        let document = Document::new(flavor, mime_type.essence());
        Self {
            mime_type,
            max_depth: DEFAULT_MAX_DEPTH,
            document,
            table: EntityTable::for_flavor(flavor),
            scopes: NamespaceScopes::new(),
            open_elements: Vec::new(),
            pending_text: None,
            skipped: Vec::new(),
            default_namespace: None,
            last_event: None,
            diagnostics: Vec::new(),
        }
    }

    /// Set the element nesting limit.
    #[must_use]
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The content type this builder was created for.
    #[must_use]
    pub const fn mime_type(&self) -> &MimeType {
        &self.mime_type
    }

    /// The flavor of the document being built.
    #[must_use]
    pub const fn flavor(&self) -> Flavor {
        self.mime_type.flavor()
    }

    /// The document built so far.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Finish and hand over the document.
    #[must_use]
    pub fn into_document(self) -> Document {
        self.document
    }

    /// The default namespace chosen by [`DocumentBuilder::start_document`].
    #[must_use]
    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Start of the last markup event handled, or 1:1 if there was none.
    #[must_use]
    pub fn last_event_position(&self) -> Position {
        self.last_event.unwrap_or(Position::START)
    }

    /// Diagnostics found since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Begin a document: pick the flavor and default namespace from the
    /// content type and install the caller's prefix bindings.
    ///
    /// | content type            | flavor | default namespace                  |
    /// |-------------------------|--------|------------------------------------|
    /// | `text/html`             | html   | HTML, overriding the caller's      |
    /// | `application/xhtml+xml` | xml    | HTML, overriding the caller's      |
    /// | `image/svg+xml`         | xml    | SVG                                |
    /// | anything else           | xml    | the caller's `""` binding, or none |
    pub fn start_document(&mut self, bindings: &BTreeMap<String, Option<String>>) {
        let flavor = self.mime_type.flavor();
        self.document = Document::new(flavor, self.mime_type.essence());
        self.table = EntityTable::for_flavor(flavor);
        self.scopes = NamespaceScopes::new();
        self.open_elements.clear();
        self.pending_text = None;
        self.skipped.clear();
        self.last_event = None;

        self.default_namespace = self
            .mime_type
            .default_namespace_override()
            .map(str::to_string)
            .or_else(|| bindings.get("").cloned().flatten());
        if let Some(uri) = self.default_namespace.clone() {
            let _ = self.scopes.declare("", Some(&uri));
        }

        for (prefix, uri) in bindings.iter().filter(|(prefix, _)| !prefix.is_empty()) {
            if !self.scopes.declare(prefix, uri.as_deref()) {
                self.report(Diagnostic::warning(
                    ErrorKind::NamespaceResolution,
                    Position::START,
                    format!("reserved prefix {prefix:?} cannot be rebound"),
                ));
            }
        }
    }

    /// Dispatch one token to its handler.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::DepthLimitExceeded`] when a start tag nests
    /// deeper than the configured limit.
    pub fn process_token(&mut self, source: SourceToken) -> Result<(), ParseError> {
        let SourceToken { token, position } = source;
        if !matches!(token, Token::Text { .. } | Token::EndOfInput) {
            self.last_event = Some(position);
        }
        match token {
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => self.start_element(&name, attributes, self_closing, position)?,
            Token::EndTag { name } => self.end_element(&name, position),
            Token::Text { data, escapable } => self.characters(&data, escapable, position),
            Token::Comment { data } => self.comment(&data, position),
            Token::Cdata { data } => self.cdata(&data, position),
            Token::ProcessingInstruction { target, data } => {
                self.processing_instruction(&target, &data, position);
            }
            Token::Doctype { raw } => self.doctype(&raw, position),
            Token::EndOfInput => self.end_document(position),
        }
        Ok(())
    }

    /// The node new children are appended to.
    fn insertion_point(&self) -> NodeId {
        self.open_elements.last().copied().unwrap_or(NodeId::ROOT)
    }

    fn insert(&mut self, node: NodeId, position: Position) {
        let parent = self.insertion_point();
        if let Err(err) = self.document.append_child(parent, node) {
            self.report(Diagnostic::fatal(
                ErrorKind::Structural,
                position,
                err.to_string(),
            ));
        }
    }

    /// Open an element: declare its namespaces, resolve its name and
    /// attributes, and make it the insertion point.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::DepthLimitExceeded`] past the nesting limit.
    pub fn start_element(
        &mut self,
        name: &str,
        attributes: Vec<Attribute>,
        self_closing: bool,
        position: Position,
    ) -> Result<(), ParseError> {
        self.flush_text();
        let closes_itself = self_closing || self.is_void(name);

        if self.is_skipping() {
            if !closes_itself {
                self.skipped.push(name.to_string());
            }
            return Ok(());
        }

        if self.open_elements.is_empty() && self.document.document_element().is_some() {
            self.report(Diagnostic::fatal(
                ErrorKind::Structural,
                position,
                format!("second root element <{name}> ignored"),
            ));
            if !closes_itself {
                self.skipped.push(name.to_string());
            }
            return Ok(());
        }

        if self.open_elements.len() >= self.max_depth {
            return Err(ParseError::DepthLimitExceeded {
                limit: self.max_depth,
                position,
            });
        }

        self.scopes.push_scope();
        let attributes: Vec<Attribute> = attributes
            .into_iter()
            .map(|attr| {
                let value = self.decode_attribute_value(&attr.value, position);
                Attribute::new(attr.name, value)
            })
            .collect();
        self.declare_namespaces(&attributes, position);

        let namespace_uri = self.resolve_name(name, true, position);
        let mut attrs = AttributesMap::new();
        for attr in attributes {
            let namespace_uri = if attr.name == "xmlns" {
                Some(namespace::XMLNS.to_string())
            } else {
                self.resolve_name(&attr.name, false, position)
            };
            let _ = attrs.insert(wombat_dom::Attribute {
                name: attr.name,
                value: attr.value,
                namespace_uri,
            });
        }

        let element = self.document.alloc(NodeType::Element(ElementData {
            tag_name: name.to_string(),
            namespace_uri,
            attrs,
        }));
        self.insert(element, position);

        if closes_itself {
            self.scopes.pop_scope();
        } else {
            self.open_elements.push(element);
        }
        Ok(())
    }

    /// Close the innermost open element named `name`.
    ///
    /// An end tag that matches an outer element closes everything above it;
    /// one that matches nothing is dropped. Both are reported.
    pub fn end_element(&mut self, name: &str, position: Position) {
        self.flush_text();
        if self.is_void(name) {
            return;
        }
        if self.is_skipping() {
            // Unmatched end tags inside the ignored subtree are dropped with it.
            if let Some(index) = self
                .skipped
                .iter()
                .rposition(|open| self.names_match(open, name))
            {
                self.skipped.truncate(index);
            }
            return;
        }

        let matching = self
            .open_elements
            .iter()
            .rposition(|&id| self.tag_matches(id, name));
        let Some(index) = matching else {
            self.report(Diagnostic::fatal(
                ErrorKind::Structural,
                position,
                format!("end tag </{name}> has no open element; ignored"),
            ));
            return;
        };

        if index + 1 != self.open_elements.len() {
            let innermost = self.open_tag_name(self.open_elements.len() - 1);
            self.report(Diagnostic::fatal(
                ErrorKind::Structural,
                position,
                format!("end tag </{name}> does not match open element <{innermost}>"),
            ));
        }
        while self.open_elements.len() > index {
            let _ = self.open_elements.pop();
            self.scopes.pop_scope();
        }
    }

    /// Buffer character data. Decoding waits for the next structural event.
    pub fn characters(&mut self, data: &str, escapable: bool, position: Position) {
        if self.is_skipping() {
            return;
        }
        if self.open_elements.is_empty() {
            if !data.chars().all(char::is_whitespace) {
                self.report(Diagnostic::warning(
                    ErrorKind::Structural,
                    position,
                    "text outside the document element dropped",
                ));
            }
            return;
        }
        if let Some(pending) = self
            .pending_text
            .as_mut()
            .filter(|pending| pending.escapable == escapable)
        {
            pending.data.push_str(data);
            return;
        }
        self.flush_text();
        self.pending_text = Some(PendingText {
            data: data.to_string(),
            position,
            escapable,
        });
    }

    /// Append a comment at the insertion point.
    pub fn comment(&mut self, data: &str, position: Position) {
        self.flush_text();
        if self.is_skipping() {
            return;
        }
        let node = self.document.create_comment(data);
        self.insert(node, position);
    }

    /// Append a CDATA section at the insertion point.
    pub fn cdata(&mut self, data: &str, position: Position) {
        self.flush_text();
        if self.is_skipping() {
            return;
        }
        if self.open_elements.is_empty() {
            if !data.chars().all(char::is_whitespace) {
                self.report(Diagnostic::warning(
                    ErrorKind::Structural,
                    position,
                    "CDATA section outside the document element dropped",
                ));
            }
            return;
        }
        let node = self.document.alloc(NodeType::CDATASection(data.to_string()));
        self.insert(node, position);
    }

    /// Append a processing instruction. The XML declaration is not a node.
    pub fn processing_instruction(&mut self, target: &str, data: &str, position: Position) {
        self.flush_text();
        if self.is_skipping() {
            return;
        }
        if target.eq_ignore_ascii_case("xml") {
            if position != Position::START {
                self.report(Diagnostic::warning(
                    ErrorKind::Tokenization,
                    position,
                    "XML declaration is only allowed at the start of the document",
                ));
            }
            return;
        }
        let node = self
            .document
            .alloc(NodeType::ProcessingInstruction(ProcessingInstructionData {
                target: target.to_string(),
                data: data.to_string(),
            }));
        self.insert(node, position);
    }

    /// Append the document type node, if it comes before the root element.
    pub fn doctype(&mut self, raw: &str, position: Position) {
        self.flush_text();
        if self.is_skipping() {
            return;
        }
        if !self.open_elements.is_empty()
            || self.document.document_element().is_some()
            || self.document.doctype().is_some()
        {
            self.report(Diagnostic::warning(
                ErrorKind::Structural,
                position,
                "misplaced DOCTYPE ignored",
            ));
            return;
        }
        let node = self.document.create_document_type(parse_doctype(raw));
        self.insert(node, position);
    }

    /// Close whatever is still open.
    pub fn end_document(&mut self, position: Position) {
        self.flush_text();
        while let Some(open) = self.open_elements.pop() {
            let name = self
                .document
                .as_element(open)
                .map(|e| e.tag_name.clone())
                .unwrap_or_default();
            self.report(Diagnostic::fatal(
                ErrorKind::Structural,
                position,
                format!("element <{name}> is not closed at end of input"),
            ));
            self.scopes.pop_scope();
        }
        self.skipped.clear();
    }

    /// Decode the buffered text into one Text node.
    fn flush_text(&mut self) {
        let Some(pending) = self.pending_text.take() else {
            return;
        };
        let data = if pending.escapable {
            self.decode(&pending.data, pending.position)
        } else {
            pending.data
        };
        if data.is_empty() {
            return;
        }
        let node = self.document.create_text_node(&data);
        self.insert(node, pending.position);
    }

    fn decode(&mut self, raw: &str, position: Position) -> String {
        let mut issues = Vec::new();
        let decoded = self.table.decode(raw, |issue| issues.push(issue));
        for issue in &issues {
            self.report_entity_issue(issue, position);
        }
        decoded
    }

    /// [XML 1.0 § 3.3.3 Attribute-Value Normalization](https://www.w3.org/TR/xml/#AVNormalize)
    ///
    /// "For a white space character (#x20, #xD, #xA, #x9), append a space
    /// character (#x20) to the normalized value." Whitespace written as a
    /// character reference survives, so this runs before decoding.
    fn decode_attribute_value(&mut self, raw: &str, position: Position) -> String {
        if self.flavor() == Flavor::Xml && raw.contains(['\t', '\n']) {
            let normalized = raw.replace(['\t', '\n'], " ");
            self.decode(&normalized, position)
        } else {
            self.decode(raw, position)
        }
    }

    fn report_entity_issue(&mut self, issue: &EntityIssue, position: Position) {
        let diagnostic = match issue {
            EntityIssue::Undefined(_) => {
                Diagnostic::warning(ErrorKind::UndefinedEntity, position, issue.to_string())
            }
            EntityIssue::InvalidCharacterReference(_) => {
                Diagnostic::warning(ErrorKind::Tokenization, position, issue.to_string())
            }
            EntityIssue::BareAmpersand if self.flavor() == Flavor::Xml => {
                Diagnostic::warning(ErrorKind::Tokenization, position, issue.to_string())
            }
            EntityIssue::BareAmpersand => return,
        };
        self.report(diagnostic);
    }

    /// Declare every `xmlns` / `xmlns:p` attribute in the current scope.
    fn declare_namespaces(&mut self, attributes: &[Attribute], position: Position) {
        for attr in attributes {
            let prefix = match split_qualified_name(&attr.name) {
                (None, "xmlns") => "",
                (Some("xmlns"), prefix) => prefix,
                _ => continue,
            };
            if !prefix.is_empty() && attr.value.is_empty() {
                // "The attribute value in a namespace declaration for a
                // prefix MAY be empty" only in XML 1.1.
                self.report(Diagnostic::warning(
                    ErrorKind::NamespaceResolution,
                    position,
                    format!("prefix {prefix:?} cannot be undeclared"),
                ));
                continue;
            }
            let uri = (!attr.value.is_empty()).then_some(attr.value.as_str());
            if !self.scopes.declare(prefix, uri) {
                self.report(Diagnostic::warning(
                    ErrorKind::NamespaceResolution,
                    position,
                    format!("reserved prefix {prefix:?} cannot be rebound"),
                ));
            }
        }
    }

    /// Resolve the namespace of an element (`is_element`) or attribute
    /// name. Unprefixed attributes are in no namespace.
    fn resolve_name(&mut self, name: &str, is_element: bool, position: Position) -> Option<String> {
        match split_qualified_name(name) {
            (Some(prefix), _) => match self.scopes.resolve(prefix).flatten() {
                Some(uri) => Some(uri.to_string()),
                None => {
                    self.report(Diagnostic::warning(
                        ErrorKind::NamespaceResolution,
                        position,
                        format!("prefix {prefix:?} of {name:?} is not bound"),
                    ));
                    None
                }
            },
            (None, _) if is_element => self.scopes.resolve_default().map(str::to_string),
            (None, _) => None,
        }
    }

    fn is_void(&self, name: &str) -> bool {
        self.flavor() == Flavor::Html && html_elements::is_void(name)
    }

    fn tag_matches(&self, id: NodeId, name: &str) -> bool {
        self.document
            .as_element(id)
            .is_some_and(|e| self.names_match(&e.tag_name, name))
    }

    fn names_match(&self, open: &str, name: &str) -> bool {
        match self.flavor() {
            Flavor::Html => open.eq_ignore_ascii_case(name),
            Flavor::Xml => open == name,
        }
    }

    fn is_skipping(&self) -> bool {
        !self.skipped.is_empty()
    }

    fn open_tag_name(&self, index: usize) -> String {
        self.open_elements
            .get(index)
            .and_then(|&id| self.document.as_element(id))
            .map(|e| e.tag_name.clone())
            .unwrap_or_default()
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Split the inside of `<!DOCTYPE ...>` into its parts.
///
/// [XML 1.0 § 2.8](https://www.w3.org/TR/xml/#NT-doctypedecl):
/// `'<!DOCTYPE' S Name (S ExternalID)? S? ('[' intSubset ']' S?)? '>'`
#[must_use]
pub fn parse_doctype(raw: &str) -> DoctypeData {
    let raw = raw.trim();
    let name_end = raw
        .find(|c: char| c.is_whitespace() || c == '[')
        .unwrap_or(raw.len());
    let mut doctype = DoctypeData {
        name: raw[..name_end].to_string(),
        ..DoctypeData::default()
    };

    let mut rest = raw[name_end..].trim_start();
    if let Some(after) = strip_keyword(rest, "PUBLIC") {
        if let Some((public, after)) = read_quoted(after) {
            doctype.public_id = Some(public.to_string());
            rest = after;
            if let Some((system, after)) = read_quoted(rest) {
                doctype.system_id = Some(system.to_string());
                rest = after;
            }
        }
    } else if let Some(after) = strip_keyword(rest, "SYSTEM") {
        if let Some((system, after)) = read_quoted(after) {
            doctype.system_id = Some(system.to_string());
            rest = after;
        }
    }

    if let Some(open) = rest.find('[') {
        let close = rest.rfind(']').filter(|&close| close > open).unwrap_or(rest.len());
        doctype.internal_subset = Some(rest[open + 1..close].to_string());
    }
    doctype
}

fn strip_keyword<'a>(s: &'a str, keyword: &str) -> Option<&'a str> {
    s.get(..keyword.len())
        .filter(|head| head.eq_ignore_ascii_case(keyword))
        .map(|_| &s[keyword.len()..])
}

/// Read a `"..."` or `'...'` literal after optional whitespace.
fn read_quoted(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    let quote = s.chars().next().filter(|&c| c == '"' || c == '\'')?;
    let body = &s[1..];
    let end = body.find(quote)?;
    Some((&body[..end], body[end + 1..].trim_start()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> Token {
        Token::StartTag {
            name: name.to_string(),
            attributes: Vec::new(),
            self_closing: false,
        }
    }

    fn at(token: Token, line: usize, column: usize) -> SourceToken {
        SourceToken {
            token,
            position: Position::new(line, column),
        }
    }

    #[test]
    fn test_default_builder_is_xml() {
        let mut builder = DocumentBuilder::new();
        assert_eq!(builder.mime_type(), &MimeType::XmlApplication);
        builder.start_document(&BTreeMap::new());
        assert_eq!(builder.document().flavor(), Flavor::Xml);
        assert!(builder.document().children(NodeId::ROOT).is_empty());
    }

    #[test]
    fn test_html_builder_is_html() {
        let mut builder = DocumentBuilder::with_mime_type(MimeType::Html);
        builder.start_document(&BTreeMap::new());
        assert_eq!(builder.document().flavor(), Flavor::Html);
        assert_eq!(builder.default_namespace(), Some(namespace::HTML));
    }

    #[test]
    fn test_events_build_tree() {
        let mut builder = DocumentBuilder::new();
        builder.start_document(&BTreeMap::new());
        builder.process_token(at(tag("a"), 1, 1)).unwrap();
        builder
            .process_token(at(
                Token::Text {
                    data: "x &amp; y".to_string(),
                    escapable: true,
                },
                1,
                4,
            ))
            .unwrap();
        builder
            .process_token(at(
                Token::EndTag {
                    name: "a".to_string(),
                },
                1,
                13,
            ))
            .unwrap();
        builder.process_token(at(Token::EndOfInput, 1, 17)).unwrap();

        assert!(builder.take_diagnostics().is_empty());
        assert_eq!(builder.last_event_position(), Position::new(1, 13));
        let doc = builder.into_document();
        let root = doc.document_element().unwrap();
        assert_eq!(doc.text_content(root), "x & y");
    }

    #[test]
    fn test_depth_limit() {
        let mut builder = DocumentBuilder::new().max_depth(2);
        builder.start_document(&BTreeMap::new());
        builder.process_token(at(tag("a"), 1, 1)).unwrap();
        builder.process_token(at(tag("b"), 1, 4)).unwrap();
        let err = builder.process_token(at(tag("c"), 1, 7)).unwrap_err();
        assert_eq!(
            err,
            ParseError::DepthLimitExceeded {
                limit: 2,
                position: Position::new(1, 7)
            }
        );
    }

    #[test]
    fn test_parse_doctype_public() {
        let doctype = parse_doctype(
            "html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\"",
        );
        assert_eq!(doctype.name, "html");
        assert_eq!(
            doctype.public_id.as_deref(),
            Some("-//W3C//DTD XHTML 1.0 Strict//EN")
        );
        assert_eq!(
            doctype.system_id.as_deref(),
            Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd")
        );
        assert_eq!(doctype.internal_subset, None);
    }

    #[test]
    fn test_parse_doctype_internal_subset() {
        let doctype = parse_doctype("note SYSTEM 'note.dtd' [<!ENTITY a \"b\">]");
        assert_eq!(doctype.name, "note");
        assert_eq!(doctype.system_id.as_deref(), Some("note.dtd"));
        assert_eq!(
            doctype.internal_subset.as_deref(),
            Some("<!ENTITY a \"b\">")
        );
    }

    #[test]
    fn test_parse_doctype_name_only() {
        let doctype = parse_doctype("html");
        assert_eq!(doctype.name, "html");
        assert_eq!(doctype.public_id, None);
        assert_eq!(doctype.system_id, None);
    }
}

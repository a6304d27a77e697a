//! [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
//!
//! "Each document has an associated ... content type, ... type ("xml" or
//! "html")". A [`Document`] owns its [`DomTree`] arena and fixes its flavor
//! at construction.

use std::fmt;
use std::ops::{Deref, DerefMut};

use wombat_common::{Flavor, namespace};

use crate::{
    DoctypeData, DomError, DomTree, ElementData, NodeId, NodeType, ProcessingInstructionData,
    serializer,
};

/// A parsed or constructed document.
///
/// Dereferences to its [`DomTree`], so every tree query and mutation is
/// available directly on the document.
#[derive(Debug, Clone)]
pub struct Document {
    flavor: Flavor,
    content_type: String,
    tree: DomTree,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new(flavor: Flavor, content_type: impl Into<String>) -> Self {
        Self {
            flavor,
            content_type: content_type.into(),
            tree: DomTree::new(),
        }
    }

    /// "type" - immutable after creation.
    #[must_use]
    pub const fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Whether this is an HTML document.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.flavor == Flavor::Html
    }

    /// "content type" - the essence of the declared MIME type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The underlying arena.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// [§ 4.5 createElement](https://dom.spec.whatwg.org/#dom-document-createelement)
    ///
    /// "Let namespace be the HTML namespace, if this is an HTML document or
    /// this's content type is "application/xhtml+xml"; otherwise null."
    ///
    /// The node is allocated detached.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidCharacter`] if `tag_name` is not a valid name.
    pub fn create_element(&mut self, tag_name: &str) -> Result<NodeId, DomError> {
        let namespace_uri = (self.is_html() || self.content_type == "application/xhtml+xml")
            .then(|| namespace::HTML.to_string());
        self.create_element_ns(namespace_uri.as_deref(), tag_name)
    }

    /// [§ 4.5 createElementNS](https://dom.spec.whatwg.org/#dom-document-createelementns)
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidCharacter`] if `qualified_name` is empty or
    /// contains whitespace or markup delimiters.
    pub fn create_element_ns(
        &mut self,
        namespace_uri: Option<&str>,
        qualified_name: &str,
    ) -> Result<NodeId, DomError> {
        let invalid = qualified_name.is_empty()
            || qualified_name.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.')
            || qualified_name
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '/' | '=' | '"' | '\'' | '&'));
        if invalid {
            return Err(DomError::InvalidCharacter(qualified_name.to_string()));
        }
        Ok(self.tree.alloc(NodeType::Element(ElementData::new(
            qualified_name.to_string(),
            namespace_uri.map(str::to_string),
        ))))
    }

    /// "createTextNode(data)"
    pub fn create_text_node(&mut self, data: &str) -> NodeId {
        self.tree.alloc(NodeType::Text(data.to_string()))
    }

    /// "createComment(data)"
    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.tree.alloc(NodeType::Comment(data.to_string()))
    }

    /// "createCDATASection(data)"
    ///
    /// # Errors
    ///
    /// "If this is an HTML document, then throw a `NotSupportedError`." We
    /// report that as a hierarchy error. Data containing `]]>` is rejected
    /// with [`DomError::InvalidCharacter`].
    pub fn create_cdata_section(&mut self, data: &str) -> Result<NodeId, DomError> {
        if self.is_html() {
            return Err(DomError::HierarchyRequest(
                "CDATA sections are not supported in HTML documents",
            ));
        }
        if data.contains("]]>") {
            return Err(DomError::InvalidCharacter(data.to_string()));
        }
        Ok(self.tree.alloc(NodeType::CDATASection(data.to_string())))
    }

    /// "createProcessingInstruction(target, data)"
    ///
    /// # Errors
    ///
    /// "If data contains the string "?>", then throw an `InvalidCharacterError`."
    pub fn create_processing_instruction(
        &mut self,
        target: &str,
        data: &str,
    ) -> Result<NodeId, DomError> {
        if target.is_empty() || target.contains(char::is_whitespace) || data.contains("?>") {
            return Err(DomError::InvalidCharacter(format!("{target} {data}")));
        }
        Ok(self
            .tree
            .alloc(NodeType::ProcessingInstruction(ProcessingInstructionData {
                target: target.to_string(),
                data: data.to_string(),
            })))
    }

    /// Allocate a detached doctype node.
    pub fn create_document_type(&mut self, doctype: DoctypeData) -> NodeId {
        self.tree.alloc(NodeType::DocumentType(doctype))
    }
}

impl Deref for Document {
    type Target = DomTree;

    fn deref(&self) -> &DomTree {
        &self.tree
    }
}

impl DerefMut for Document {
    fn deref_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serializer::serialize(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_element_namespace_follows_flavor() {
        let mut html = Document::new(Flavor::Html, "text/html");
        let div = html.create_element("div").unwrap();
        assert_eq!(
            html.as_element(div).unwrap().namespace_uri.as_deref(),
            Some(namespace::HTML)
        );

        let mut xml = Document::new(Flavor::Xml, "application/xml");
        let item = xml.create_element("item").unwrap();
        assert_eq!(xml.as_element(item).unwrap().namespace_uri, None);
    }

    #[test]
    fn test_create_element_rejects_bad_names() {
        let mut doc = Document::new(Flavor::Xml, "application/xml");
        assert!(doc.create_element("").is_err());
        assert!(doc.create_element("a b").is_err());
        assert!(doc.create_element("1abc").is_err());
    }

    #[test]
    fn test_cdata_refused_in_html() {
        let mut doc = Document::new(Flavor::Html, "text/html");
        assert!(doc.create_cdata_section("x").is_err());
    }

    #[test]
    fn test_created_nodes_are_detached() {
        let mut doc = Document::new(Flavor::Xml, "application/xml");
        let text = doc.create_text_node("hi");
        assert_eq!(doc.parent(text), None);
        assert_eq!(doc.owner_document(text), Some(NodeId::ROOT));
        assert!(doc.children(doc.root()).is_empty());
    }
}

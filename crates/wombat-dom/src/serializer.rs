//! Markup serialization.
//!
//! [DOM Parsing § 3.2 XML serialization](https://w3c.github.io/DOM-Parsing/#xml-serialization)
//!
//! Walks a tree in document order and writes markup text. Escaping follows
//! the document's flavor: the minimal table escapes only what markup needs,
//! HTML documents also write named references from the full entity table.
//! Namespace declarations are added wherever an element or prefixed
//! attribute is in a namespace that is not already visible.

use std::fmt::Write;

use wombat_common::{EntityTable, html_elements, namespace};

use crate::{Attribute, Document, ElementData, NodeId, NodeType, split_qualified_name};

/// Serialize a whole document.
#[must_use]
pub fn serialize(doc: &Document) -> String {
    serialize_node(doc, doc.root())
}

/// Serialize `id` and its subtree. The document node serializes its children.
#[must_use]
pub fn serialize_node(doc: &Document, id: NodeId) -> String {
    let mut serializer = Serializer::new(doc);
    serializer.run(id);
    serializer.out
}

/// One step of the iterative walk.
enum Step {
    Enter(NodeId),
    Close(NodeId),
}

/// A namespace binding visible at some depth; `prefix` "" is the default.
struct Binding {
    prefix: String,
    uri: Option<String>,
    depth: usize,
}

struct Serializer<'a> {
    doc: &'a Document,
    table: EntityTable,
    out: String,
    bindings: Vec<Binding>,
    depth: usize,
    /// "generated namespace prefix index"
    prefix_index: usize,
}

impl<'a> Serializer<'a> {
    fn new(doc: &'a Document) -> Self {
        let mut bindings = vec![Binding {
            prefix: "xml".to_string(),
            uri: Some(namespace::XML.to_string()),
            depth: 0,
        }];
        // HTML documents imply the HTML namespace for unprefixed elements.
        if doc.is_html() {
            bindings.push(Binding {
                prefix: String::new(),
                uri: Some(namespace::HTML.to_string()),
                depth: 0,
            });
        }
        Self {
            doc,
            table: EntityTable::for_flavor(doc.flavor()),
            out: String::new(),
            bindings,
            depth: 0,
            prefix_index: 0,
        }
    }

    fn run(&mut self, start: NodeId) {
        let mut stack = vec![Step::Enter(start)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(id) => {
                    if self.enter(id) {
                        stack.push(Step::Close(id));
                        stack.extend(self.doc.children(id).iter().rev().copied().map(Step::Enter));
                    }
                }
                Step::Close(id) => self.close(id),
            }
        }
    }

    fn visible(&self, prefix: &str) -> Option<Option<&str>> {
        self.bindings
            .iter()
            .rev()
            .find(|b| b.prefix == prefix)
            .map(|b| b.uri.as_deref())
    }

    fn bind(&mut self, prefix: &str, uri: Option<&str>) {
        self.bindings.push(Binding {
            prefix: prefix.to_string(),
            uri: uri.map(str::to_string),
            depth: self.depth,
        });
    }

    /// Write the opening part of `id`. Returns true when children follow
    /// and a matching [`Step::Close`] is needed.
    fn enter(&mut self, id: NodeId) -> bool {
        let doc = self.doc;
        let Some(node) = doc.get(id) else {
            return false;
        };
        match &node.node_type {
            NodeType::Document => true,
            NodeType::Element(element) => {
                self.depth += 1;
                self.write_start_tag(element);
                if node.children().is_empty() {
                    self.out.push_str("/>");
                    self.pop_bindings();
                    false
                } else {
                    self.out.push('>');
                    true
                }
            }
            NodeType::Text(data) => {
                let raw = doc.is_html()
                    && node
                        .parent()
                        .and_then(|p| doc.as_element(p))
                        .is_some_and(|e| html_elements::is_raw_text(e.local_name()));
                if raw {
                    self.out.push_str(data);
                } else {
                    self.write_escaped(data, false);
                }
                false
            }
            NodeType::CDATASection(data) => {
                self.out.push_str("<![CDATA[");
                self.out.push_str(&data.replace("]]>", "]]]]><![CDATA[>"));
                self.out.push_str("]]>");
                false
            }
            NodeType::Comment(data) => {
                let _ = write!(self.out, "<!--{data}-->");
                false
            }
            NodeType::ProcessingInstruction(pi) => {
                if pi.data.is_empty() {
                    let _ = write!(self.out, "<?{}?>", pi.target);
                } else {
                    let _ = write!(self.out, "<?{} {}?>", pi.target, pi.data);
                }
                false
            }
            NodeType::DocumentType(doctype) => {
                let _ = write!(self.out, "<!DOCTYPE {}", doctype.name);
                match (&doctype.public_id, &doctype.system_id) {
                    (Some(public), Some(system)) => {
                        let _ = write!(self.out, " PUBLIC \"{public}\" \"{system}\"");
                    }
                    (Some(public), None) => {
                        let _ = write!(self.out, " PUBLIC \"{public}\"");
                    }
                    (None, Some(system)) => {
                        let _ = write!(self.out, " SYSTEM \"{system}\"");
                    }
                    (None, None) => {}
                }
                if let Some(subset) = &doctype.internal_subset {
                    let _ = write!(self.out, " [{subset}]");
                }
                self.out.push('>');
                false
            }
        }
    }

    fn close(&mut self, id: NodeId) {
        if let Some(element) = self.doc.as_element(id) {
            let _ = write!(self.out, "</{}>", element.tag_name);
            self.pop_bindings();
        }
    }

    fn pop_bindings(&mut self) {
        while self.bindings.last().is_some_and(|b| b.depth == self.depth) {
            let _ = self.bindings.pop();
        }
        self.depth -= 1;
    }

    fn write_start_tag(&mut self, element: &ElementData) {
        self.out.push('<');
        self.out.push_str(&element.tag_name);

        // Declarations written in the source are visible to everything below.
        for attr in &element.attrs {
            if attr.name == "xmlns" {
                self.bind("", (!attr.value.is_empty()).then_some(attr.value.as_str()));
            } else if let (Some("xmlns"), local) = split_qualified_name(&attr.name) {
                self.bind(local, Some(&attr.value));
            }
        }

        let mut declarations: Vec<(String, String)> = Vec::new();
        let element_prefix = element.prefix().unwrap_or_default();
        let wanted = element.namespace_uri.as_deref();
        let declared_name = if element_prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{element_prefix}")
        };
        let visible = self.visible(element_prefix).flatten();
        if visible != wanted && !element.attrs.contains(&declared_name) {
            match wanted {
                Some(uri) => declarations.push((declared_name, uri.to_string())),
                // Only the default namespace can be undeclared.
                None if element_prefix.is_empty() => declarations.push((declared_name, String::new())),
                None => {}
            }
            if wanted.is_some() || element_prefix.is_empty() {
                self.bind(element_prefix, wanted);
            }
        }

        let renamed: Vec<Option<String>> = element
            .attrs
            .iter()
            .map(|attr| self.declare_attribute_namespace(element, attr, &mut declarations))
            .collect();

        for (name, value) in &declarations {
            let _ = write!(self.out, " {name}=\"");
            self.write_escaped(value, true);
            self.out.push('"');
        }
        for (attr, name) in element.attrs.iter().zip(&renamed) {
            let _ = write!(self.out, " {}=\"", name.as_deref().unwrap_or(&attr.name));
            self.write_escaped(&attr.value, true);
            self.out.push('"');
        }
    }

    /// Make the namespace of a prefixed attribute visible on this tag.
    ///
    /// When the prefix is already bound to another namespace on this same
    /// tag, a fresh prefix is declared instead and the attribute's new
    /// qualified name is returned.
    fn declare_attribute_namespace(
        &mut self,
        element: &ElementData,
        attr: &Attribute,
        declarations: &mut Vec<(String, String)>,
    ) -> Option<String> {
        let (Some(prefix), local) = split_qualified_name(&attr.name) else {
            return None;
        };
        let uri = attr.namespace_uri.as_deref()?;
        if prefix == "xmlns" || prefix == "xml" || self.visible(prefix).flatten() == Some(uri) {
            return None;
        }
        if !self.bound_on_this_tag(prefix) {
            declarations.push((format!("xmlns:{prefix}"), uri.to_string()));
            self.bind(prefix, Some(uri));
            return None;
        }
        let fresh = self.generate_prefix(element);
        declarations.push((format!("xmlns:{fresh}"), uri.to_string()));
        self.bind(&fresh, Some(uri));
        Some(format!("{fresh}:{local}"))
    }

    fn bound_on_this_tag(&self, prefix: &str) -> bool {
        self.bindings
            .iter()
            .rev()
            .take_while(|b| b.depth == self.depth)
            .any(|b| b.prefix == prefix)
    }

    /// [DOM Parsing § 3.2.1.1 Generating a namespace prefix](https://w3c.github.io/DOM-Parsing/#dfn-generating-a-prefix)
    ///
    /// "Let the value of generated prefix be the concatenation of the string
    /// "ns" and the current numerical value of prefix index."
    fn generate_prefix(&mut self, element: &ElementData) -> String {
        loop {
            self.prefix_index += 1;
            let candidate = format!("ns{}", self.prefix_index);
            let taken = self.visible(&candidate).is_some()
                || element.prefix() == Some(candidate.as_str())
                || element
                    .attrs
                    .iter()
                    .any(|a| a.prefix() == Some(candidate.as_str()));
            if !taken {
                return candidate;
            }
        }
    }

    /// Escape character data. Attribute values additionally escape the
    /// quote and the whitespace that attribute normalization would eat.
    fn write_escaped(&mut self, text: &str, in_attribute: bool) {
        for ch in text.chars() {
            match ch {
                '&' => self.out.push_str("&amp;"),
                '<' => self.out.push_str("&lt;"),
                '>' => self.out.push_str("&gt;"),
                '"' if in_attribute => self.out.push_str("&quot;"),
                '\t' if in_attribute => self.out.push_str("&#9;"),
                '\n' if in_attribute => self.out.push_str("&#10;"),
                '\r' => self.out.push_str("&#13;"),
                '\t' | '\n' => self.out.push(ch),
                c if u32::from(c) < 0x20 => {
                    let _ = write!(self.out, "&#x{:X};", u32::from(c));
                }
                c if !c.is_ascii() => match self.table.name_for(c) {
                    Some(name) => {
                        let _ = write!(self.out, "&{name};");
                    }
                    None => self.out.push(c),
                },
                c => self.out.push(c),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use wombat_common::Flavor;

    use super::*;

    fn xml_doc() -> Document {
        Document::new(Flavor::Xml, "application/xml")
    }

    #[test]
    fn test_empty_element_self_closes() {
        let mut doc = xml_doc();
        let root = doc.create_element("root").unwrap();
        doc.append_child(NodeId::ROOT, root).unwrap();
        assert_eq!(serialize(&doc), "<root/>");
    }

    #[test]
    fn test_text_child_gets_end_tag() {
        let mut doc = xml_doc();
        let root = doc.create_element("root").unwrap();
        let text = doc.create_text_node("a < b & c > d");
        doc.append_child(NodeId::ROOT, root).unwrap();
        doc.append_child(root, text).unwrap();
        assert_eq!(serialize(&doc), "<root>a &lt; b &amp; c &gt; d</root>");
    }

    #[test]
    fn test_attribute_escaping() {
        let mut doc = xml_doc();
        let root = doc.create_element("root").unwrap();
        doc.append_child(NodeId::ROOT, root).unwrap();
        doc.set_attribute(root, "v", "\"q\"\t\n<&").unwrap();
        assert_eq!(
            serialize(&doc),
            "<root v=\"&quot;q&quot;&#9;&#10;&lt;&amp;\"/>"
        );
    }

    #[test]
    fn test_control_characters_as_references() {
        let mut doc = xml_doc();
        let root = doc.create_element("r").unwrap();
        let text = doc.create_text_node("a\rb\u{1}");
        doc.append_child(NodeId::ROOT, root).unwrap();
        doc.append_child(root, text).unwrap();
        assert_eq!(serialize(&doc), "<r>a&#13;b&#x1;</r>");
    }

    #[test]
    fn test_non_ascii_named_only_in_html() {
        let mut xml = xml_doc();
        let root = xml.create_element("p").unwrap();
        let text = xml.create_text_node("a\u{A0}b");
        xml.append_child(NodeId::ROOT, root).unwrap();
        xml.append_child(root, text).unwrap();
        assert_eq!(serialize(&xml), "<p>a\u{A0}b</p>");

        let mut html = Document::new(Flavor::Html, "text/html");
        let root = html.create_element("p").unwrap();
        let text = html.create_text_node("a\u{A0}b");
        html.append_child(NodeId::ROOT, root).unwrap();
        html.append_child(root, text).unwrap();
        assert_eq!(serialize(&html), "<p>a&nbsp;b</p>");
    }

    #[test]
    fn test_html_script_is_raw() {
        let mut doc = Document::new(Flavor::Html, "text/html");
        let script = doc.create_element("script").unwrap();
        let code = doc.create_text_node("if (a < b && c) {}");
        doc.append_child(NodeId::ROOT, script).unwrap();
        doc.append_child(script, code).unwrap();
        assert_eq!(serialize(&doc), "<script>if (a < b && c) {}</script>");
    }

    #[test]
    fn test_default_namespace_declared_once() {
        let mut doc = xml_doc();
        let root = doc.create_element_ns(Some("urn:a"), "root").unwrap();
        let child = doc.create_element_ns(Some("urn:a"), "child").unwrap();
        doc.append_child(NodeId::ROOT, root).unwrap();
        doc.append_child(root, child).unwrap();
        assert_eq!(serialize(&doc), "<root xmlns=\"urn:a\"><child/></root>");
    }

    #[test]
    fn test_null_namespace_child_undeclares_default() {
        let mut doc = xml_doc();
        let root = doc.create_element_ns(Some("urn:a"), "root").unwrap();
        let child = doc.create_element_ns(None, "plain").unwrap();
        doc.append_child(NodeId::ROOT, root).unwrap();
        doc.append_child(root, child).unwrap();
        assert_eq!(
            serialize(&doc),
            "<root xmlns=\"urn:a\"><plain xmlns=\"\"/></root>"
        );
    }

    #[test]
    fn test_prefixed_attribute_declares_prefix() {
        let mut doc = xml_doc();
        let root = doc.create_element("root").unwrap();
        doc.append_child(NodeId::ROOT, root).unwrap();
        doc.set_attribute_ns(root, Some("urn:x"), "x:id", "1").unwrap();
        assert_eq!(serialize(&doc), "<root xmlns:x=\"urn:x\" x:id=\"1\"/>");
    }

    #[test]
    fn test_attribute_prefix_clash_gets_fresh_prefix() {
        let mut doc = xml_doc();
        let root = doc.create_element_ns(Some("urn:one"), "p:e").unwrap();
        doc.append_child(NodeId::ROOT, root).unwrap();
        doc.set_attribute_ns(root, Some("urn:two"), "p:x", "1").unwrap();
        assert_eq!(
            serialize(&doc),
            "<p:e xmlns:p=\"urn:one\" xmlns:ns1=\"urn:two\" ns1:x=\"1\"/>"
        );
    }

    #[test]
    fn test_generated_prefix_skips_names_in_use() {
        let mut doc = xml_doc();
        let root = doc.create_element_ns(Some("urn:one"), "p:e").unwrap();
        doc.append_child(NodeId::ROOT, root).unwrap();
        doc.set_attribute_ns(root, Some("urn:three"), "ns1:y", "2").unwrap();
        doc.set_attribute_ns(root, Some("urn:two"), "p:x", "1").unwrap();
        assert_eq!(
            serialize(&doc),
            "<p:e xmlns:p=\"urn:one\" xmlns:ns1=\"urn:three\" xmlns:ns2=\"urn:two\" ns1:y=\"2\" ns2:x=\"1\"/>"
        );
    }

    #[test]
    fn test_existing_declaration_not_duplicated() {
        let mut doc = xml_doc();
        let root = doc.create_element_ns(Some("urn:a"), "root").unwrap();
        doc.append_child(NodeId::ROOT, root).unwrap();
        let element = doc.as_element_mut(root).unwrap();
        let _ = element.attrs.insert(Attribute {
            name: "xmlns".to_string(),
            value: "urn:a".to_string(),
            namespace_uri: Some(namespace::XMLNS.to_string()),
        });
        assert_eq!(serialize(&doc), "<root xmlns=\"urn:a\"/>");
    }

    #[test]
    fn test_markup_node_forms() {
        let mut doc = xml_doc();
        let doctype = doc.create_document_type(crate::DoctypeData {
            name: "note".to_string(),
            system_id: Some("note.dtd".to_string()),
            ..Default::default()
        });
        let pi = doc.create_processing_instruction("style", "href=\"a.css\"").unwrap();
        let root = doc.create_element("note").unwrap();
        let comment = doc.create_comment(" hi ");
        let cdata = doc.create_cdata_section("x<y").unwrap();
        doc.append_child(NodeId::ROOT, doctype).unwrap();
        doc.append_child(NodeId::ROOT, pi).unwrap();
        doc.append_child(NodeId::ROOT, root).unwrap();
        doc.append_child(root, comment).unwrap();
        doc.append_child(root, cdata).unwrap();
        assert_eq!(
            serialize(&doc),
            "<!DOCTYPE note SYSTEM \"note.dtd\"><?style href=\"a.css\"?><note><!-- hi --><![CDATA[x<y]]></note>"
        );
    }

    #[test]
    fn test_serialize_subtree() {
        let mut doc = xml_doc();
        let root = doc.create_element("a").unwrap();
        let child = doc.create_element("b").unwrap();
        doc.append_child(NodeId::ROOT, root).unwrap();
        doc.append_child(root, child).unwrap();
        assert_eq!(serialize_node(&doc, child), "<b/>");
    }
}

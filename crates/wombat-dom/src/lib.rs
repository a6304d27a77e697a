//! DOM tree implementation for the Wombat markup parser.
//!
//! This crate provides an arena-based DOM tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/), plus a serializer
//! that turns a tree back into markup text.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. The
//! arena owns every node; `parent` and sibling links are plain indices, so
//! back-references never form ownership cycles. A node belongs to the
//! [`Document`] whose arena allocated it.

/// Documents: flavor, content type, and node factories.
pub mod document;
/// Markup serialization of documents and nodes.
pub mod serializer;

pub use document::Document;
pub use serializer::{serialize, serialize_node};

use thiserror::Error;
use wombat_common::namespace;

/// Errors raised by structural mutations of a [`DomTree`].
///
/// [§ 4.2.3 Mutation algorithms](https://dom.spec.whatwg.org/#mutation-algorithms)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// "HierarchyRequestError: The operation would yield an incorrect node tree."
    #[error("hierarchy request error: {0}")]
    HierarchyRequest(&'static str),
    /// "NotFoundError: The object can not be found here."
    #[error("node {child:?} is not a child of {parent:?}")]
    NotFound {
        /// The node expected to hold `child`.
        parent: NodeId,
        /// The node that was looked for.
        child: NodeId,
    },
    /// The id does not belong to this tree.
    #[error("node {0:?} does not exist in this tree")]
    InvalidNode(NodeId),
    /// The operation needs an element.
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),
    /// "InvalidCharacterError: The string contains invalid characters."
    #[error("invalid name {0:?}")]
    InvalidCharacter(String),
}

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
///
/// `NodeId` provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
/// "Each node has an associated node document... and parent (null or an element)."
///
/// Structural links are private to the tree so that only [`DomTree`]
/// mutations can change them.
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    children: Vec<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    next_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    prev_sibling: Option<NodeId>,
}

impl Node {
    const fn detached(node_type: NodeType) -> Self {
        Self {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        }
    }

    /// The parent node, if attached.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The ordered children of this node.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether this node is an element.
    #[must_use]
    pub const fn is_element(&self) -> bool {
        matches!(self.node_type, NodeType::Element(_))
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.6 Interface `DocumentType`](https://dom.spec.whatwg.org/#interface-documenttype)
    DocumentType(DoctypeData),
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    /// "Element nodes are simply known as elements."
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    /// "Text nodes are known as text."
    Text(String),
    /// [§ 4.11 Interface `CDATASection`](https://dom.spec.whatwg.org/#interface-cdatasection)
    CDATASection(String),
    /// [§ 4.13 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    /// "Comment nodes are known as comments."
    Comment(String),
    /// [§ 4.12 Interface `ProcessingInstruction`](https://dom.spec.whatwg.org/#interface-processinginstruction)
    ProcessingInstruction(ProcessingInstructionData),
}

/// "Doctypes have an associated name, public ID, and system ID."
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctypeData {
    /// "name"
    pub name: String,
    /// "public ID"
    pub public_id: Option<String>,
    /// "system ID"
    pub system_id: Option<String>,
    /// The bracketed internal subset, kept verbatim.
    pub internal_subset: Option<String>,
}

/// "`ProcessingInstruction` nodes have an associated target."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingInstructionData {
    /// "target"
    pub target: String,
    /// "data"
    pub data: String,
}

/// [§ 4.9.2 Interface Attr](https://dom.spec.whatwg.org/#interface-attr)
///
/// "Attr nodes are simply known as attributes. ... Attributes have a
/// namespace (null or a non-empty string), namespace prefix, local name,
/// value."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name as written in the source (`prefix:local` or `local`).
    pub name: String,
    /// "value"
    pub value: String,
    /// "namespace"
    pub namespace_uri: Option<String>,
}

impl Attribute {
    /// Create a new attribute with no namespace.
    #[must_use]
    pub const fn new(name: String, value: String) -> Self {
        Self {
            name,
            value,
            namespace_uri: None,
        }
    }

    /// "namespace prefix"
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        split_qualified_name(&self.name).0
    }

    /// "local name"
    #[must_use]
    pub fn local_name(&self) -> &str {
        split_qualified_name(&self.name).1
    }

    /// Whether this attribute declares a namespace (`xmlns` or `xmlns:*`).
    #[must_use]
    pub fn is_namespace_declaration(&self) -> bool {
        self.name == "xmlns" || self.prefix() == Some("xmlns")
    }
}

/// Split `prefix:local` into its parts; names without a colon have no prefix.
#[must_use]
pub fn split_qualified_name(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => (Some(prefix), local),
        _ => (None, name),
    }
}

/// An element's attribute list.
///
/// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#concept-element-attribute)
///
/// "An element has an associated attribute list" - insertion order is kept
/// and qualified names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributesMap {
    entries: Vec<Attribute>,
}

impl AttributesMap {
    /// Create an empty attribute list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.entries.iter()
    }

    /// "get an attribute by name"
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entry(name).map(|attr| attr.value.as_str())
    }

    /// The full attribute stored under `name`.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&Attribute> {
        self.entries.iter().find(|attr| attr.name == name)
    }

    /// "get an attribute by namespace and local name"
    #[must_use]
    pub fn get_ns(&self, namespace_uri: Option<&str>, local_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|attr| {
                attr.namespace_uri.as_deref() == namespace_uri && attr.local_name() == local_name
            })
            .map(|attr| attr.value.as_str())
    }

    /// Whether an attribute named `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Insert or replace by qualified name.
    ///
    /// A replaced attribute keeps its position. Returns the previous value.
    pub fn insert(&mut self, attribute: Attribute) -> Option<String> {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|attr| attr.name == attribute.name)
        {
            existing.namespace_uri = attribute.namespace_uri;
            return Some(std::mem::replace(&mut existing.value, attribute.value));
        }
        self.entries.push(attribute);
        None
    }

    /// Remove by qualified name.
    pub fn remove(&mut self, name: &str) -> Option<Attribute> {
        let index = self.entries.iter().position(|attr| attr.name == name)?;
        Some(self.entries.remove(index))
    }
}

impl<'a> IntoIterator for &'a AttributesMap {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// - "Elements have an associated namespace, namespace prefix, local name, ..."
/// - "When an element is created, its local name is always given."
///
/// The qualified tag name is stored with its original case; prefix and
/// local name are derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Qualified name as written in the source.
    pub tag_name: String,
    /// "namespace"
    pub namespace_uri: Option<String>,
    /// "An element has an associated attribute list"
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Create element data with no attributes.
    #[must_use]
    pub const fn new(tag_name: String, namespace_uri: Option<String>) -> Self {
        Self {
            tag_name,
            namespace_uri,
            attrs: AttributesMap::new(),
        }
    }

    /// "namespace prefix"
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        split_qualified_name(&self.tag_name).0
    }

    /// "local name"
    #[must_use]
    pub fn local_name(&self) -> &str {
        split_qualified_name(&self.tag_name).1
    }
}

/// "A string is a valid attribute name if ... does not contain ASCII
/// whitespace, U+0000 NULL, U+0022 ("), U+0027 ('), U+003E (>),
/// U+002F (/), or U+003D (=)."
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_ascii_whitespace() || matches!(c, '\0' | '"' | '\'' | '>' | '/' | '=' | '<'))
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree. A tree is a finite hierarchical
/// tree structure."
///
/// This structure stores all nodes in a contiguous vector, using indices
/// for all relationships. This provides:
/// - O(1) access to any node by `NodeId`
/// - O(1) parent/sibling traversal
/// - No borrowing issues (indices instead of references)
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by `NodeId`.
    /// The Document node is always at index 0 (`NodeId::ROOT`).
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new DOM tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::detached(NodeType::Document)],
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    ///
    /// Only the node's data is reachable; structural links stay private.
    #[must_use]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of nodes in the tree (attached or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the Document).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::detached(node_type));
        id
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.get(id).ok_or(DomError::InvalidNode(id))
    }

    /// [§ 4.2.3 Ensure pre-insertion validity](https://dom.spec.whatwg.org/#concept-node-ensure-pre-insertion-validity)
    fn ensure_pre_insertion_validity(&self, parent: NodeId, node: NodeId) -> Result<(), DomError> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(node)?;

        // STEP 1: "If parent is not a Document, DocumentFragment, or Element
        //          node, then throw a HierarchyRequestError."
        if !matches!(parent_node.node_type, NodeType::Document | NodeType::Element(_)) {
            return Err(DomError::HierarchyRequest("parent cannot have children"));
        }

        // STEP 2: "If node is a host-including inclusive ancestor of parent,
        //          then throw a HierarchyRequestError."
        if node == parent || self.is_descendant_of(parent, node) {
            return Err(DomError::HierarchyRequest("node is an inclusive ancestor of parent"));
        }

        // STEP 4: "If node is not a DocumentFragment, DocumentType, Element,
        //          or CharacterData node, then throw a HierarchyRequestError."
        if matches!(child_node.node_type, NodeType::Document) {
            return Err(DomError::HierarchyRequest("a document cannot be inserted"));
        }

        // STEP 6: "If parent is a document, and any of the statements below
        //          ... are true, then throw a HierarchyRequestError."
        if matches!(parent_node.node_type, NodeType::Document) {
            let has_other = |pred: fn(&NodeType) -> bool| {
                parent_node.children.iter().any(|&id| {
                    id != node && self.get(id).is_some_and(|n| pred(&n.node_type))
                })
            };
            match child_node.node_type {
                NodeType::Text(_) | NodeType::CDATASection(_) => {
                    return Err(DomError::HierarchyRequest("text cannot be a document child"));
                }
                NodeType::Element(_) if has_other(|t| matches!(t, NodeType::Element(_))) => {
                    return Err(DomError::HierarchyRequest(
                        "document already has a document element",
                    ));
                }
                NodeType::DocumentType(_)
                    if has_other(|t| matches!(t, NodeType::DocumentType(_))) =>
                {
                    return Err(DomError::HierarchyRequest("document already has a doctype"));
                }
                _ => {}
            }
        } else if matches!(child_node.node_type, NodeType::DocumentType(_)) {
            return Err(DomError::HierarchyRequest("doctype must be a document child"));
        }

        Ok(())
    }

    /// Unlink `id` from its parent and siblings, if attached.
    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes[id.0].parent else {
            return;
        };
        let prev = self.nodes[id.0].prev_sibling.take();
        let next = self.nodes[id.0].next_sibling.take();
        if let Some(prev_id) = prev {
            self.nodes[prev_id.0].next_sibling = next;
        }
        if let Some(next_id) = next {
            self.nodes[next_id.0].prev_sibling = prev;
        }
        self.nodes[parent.0].children.retain(|&child| child != id);
        self.nodes[id.0].parent = None;
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// Appends `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::HierarchyRequest`] when the insertion would make a
    /// node its own ancestor or break document child rules, and
    /// [`DomError::InvalidNode`] for ids outside this tree.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.ensure_pre_insertion_validity(parent, child)?;
        self.detach(child);

        // Get the current last child of parent (if any) to set up sibling links
        let prev_last_child = self.nodes[parent.0].children.last().copied();

        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);

        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }
        Ok(())
    }

    /// [§ 4.2.3 Pre-insert](https://dom.spec.whatwg.org/#concept-node-pre-insert)
    ///
    /// Inserts `child` into `parent` immediately before `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotFound`] if `reference` is not a child of
    /// `parent`, plus every error [`DomTree::append_child`] can return.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        if self.parent(reference) != Some(parent) {
            return Err(DomError::NotFound {
                parent,
                child: reference,
            });
        }
        if child == reference {
            return Ok(());
        }
        self.ensure_pre_insertion_validity(parent, child)?;
        self.detach(child);

        let position = self.nodes[parent.0]
            .children
            .iter()
            .position(|&id| id == reference)
            .ok_or(DomError::NotFound {
                parent,
                child: reference,
            })?;
        let prev = self.nodes[reference.0].prev_sibling;

        self.nodes[parent.0].children.insert(position, child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[child.0].prev_sibling = prev;
        self.nodes[child.0].next_sibling = Some(reference);
        self.nodes[reference.0].prev_sibling = Some(child);
        if let Some(prev_id) = prev {
            self.nodes[prev_id.0].next_sibling = Some(child);
        }
        Ok(())
    }

    /// [§ 4.2.3 Pre-remove](https://dom.spec.whatwg.org/#concept-node-pre-remove)
    ///
    /// "If child's parent is not parent, then throw a `NotFoundError`."
    ///
    /// The removed node stays allocated and can be re-inserted.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotFound`] when `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotFound { parent, child });
        }
        self.detach(child);
        Ok(())
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// [§ 4.4 Node document](https://dom.spec.whatwg.org/#dom-node-ownerdocument)
    ///
    /// "The ownerDocument getter steps are to return null, if this is a
    /// document; otherwise this's node document."
    #[must_use]
    pub fn owner_document(&self, id: NodeId) -> Option<NodeId> {
        (id != NodeId::ROOT && self.get(id).is_some()).then_some(NodeId::ROOT)
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// "An object A is called a descendant of an object B, if either A is a
    /// child of B or A is a child of an object C that is a descendant of B."
    ///
    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over the descendants of a node in tree order (pre-order,
    /// depth-first), excluding the node itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            stack: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get mutable element data if this node is an element.
    #[must_use]
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.get(id).is_some_and(Node::is_element))
            .copied()
    }

    /// The document's doctype node, if any.
    #[must_use]
    pub fn doctype(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| {
                self.get(id)
                    .is_some_and(|n| matches!(n.node_type, NodeType::DocumentType(_)))
            })
            .copied()
    }

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// For elements and documents: "the descendant text content", the
    /// concatenation of the data of all Text (and CDATA) descendants in
    /// tree order. For character data nodes: their data.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        match self.get(id).map(|n| &n.node_type) {
            Some(
                NodeType::Text(data) | NodeType::CDATASection(data) | NodeType::Comment(data),
            ) => data.clone(),
            Some(NodeType::ProcessingInstruction(pi)) => pi.data.clone(),
            Some(NodeType::Element(_) | NodeType::Document) => self
                .descendants(id)
                .filter_map(|child| match self.get(child).map(|n| &n.node_type) {
                    Some(NodeType::Text(data) | NodeType::CDATASection(data)) => {
                        Some(data.as_str())
                    }
                    _ => None,
                })
                .collect(),
            _ => String::new(),
        }
    }

    /// [§ 4.4 list of elements with qualified name](https://dom.spec.whatwg.org/#concept-getelementsbytagname)
    ///
    /// "If qualifiedName is "*" ... return ... all descendant elements."
    /// Otherwise the descendant elements whose qualified name is
    /// `qualified_name`, in tree order.
    #[must_use]
    pub fn get_elements_by_tag_name(&self, root: NodeId, qualified_name: &str) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&id| {
                self.as_element(id)
                    .is_some_and(|e| qualified_name == "*" || e.tag_name == qualified_name)
            })
            .collect()
    }

    /// [§ 4.4 list of elements with namespace and local name](https://dom.spec.whatwg.org/#concept-getelementsbytagnamens)
    ///
    /// `"*"` matches any namespace or any local name.
    #[must_use]
    pub fn get_elements_by_tag_name_ns(
        &self,
        root: NodeId,
        namespace_uri: Option<&str>,
        local_name: &str,
    ) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&id| {
                self.as_element(id).is_some_and(|e| {
                    (namespace_uri == Some("*") || e.namespace_uri.as_deref() == namespace_uri)
                        && (local_name == "*" || e.local_name() == local_name)
                })
            })
            .collect()
    }

    /// "getAttribute(qualifiedName)"
    #[must_use]
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.as_element(id).and_then(|e| e.attrs.get(name))
    }

    /// "getAttributeNS(namespace, localName)"
    #[must_use]
    pub fn get_attribute_ns(
        &self,
        id: NodeId,
        namespace_uri: Option<&str>,
        local_name: &str,
    ) -> Option<&str> {
        self.as_element(id)
            .and_then(|e| e.attrs.get_ns(namespace_uri, local_name))
    }

    /// "hasAttribute(qualifiedName)"
    #[must_use]
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    /// [§ 4.9 setAttribute](https://dom.spec.whatwg.org/#dom-element-setattribute)
    ///
    /// "If attribute is null, create an attribute ... append this attribute
    /// to this. ... Change attribute to value."
    ///
    /// An existing attribute keeps its namespace and position.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidCharacter`] for an invalid name and
    /// [`DomError::NotAnElement`] when `id` is not an element.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        if !is_valid_name(name) {
            return Err(DomError::InvalidCharacter(name.to_string()));
        }
        let element = self.as_element_mut(id).ok_or(DomError::NotAnElement(id))?;
        let namespace_uri = element
            .attrs
            .entry(name)
            .and_then(|attr| attr.namespace_uri.clone());
        let _ = element.attrs.insert(Attribute {
            name: name.to_string(),
            value: value.to_string(),
            namespace_uri,
        });
        Ok(())
    }

    /// [§ 4.9 setAttributeNS](https://dom.spec.whatwg.org/#dom-element-setattributens)
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidCharacter`] for an invalid name and
    /// [`DomError::NotAnElement`] when `id` is not an element.
    pub fn set_attribute_ns(
        &mut self,
        id: NodeId,
        namespace_uri: Option<&str>,
        qualified_name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        if !is_valid_name(qualified_name) {
            return Err(DomError::InvalidCharacter(qualified_name.to_string()));
        }
        let element = self.as_element_mut(id).ok_or(DomError::NotAnElement(id))?;
        let _ = element.attrs.insert(Attribute {
            name: qualified_name.to_string(),
            value: value.to_string(),
            namespace_uri: namespace_uri.map(str::to_string),
        });
        Ok(())
    }

    /// "removeAttribute(qualifiedName)". Returns the removed attribute.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<Attribute> {
        self.as_element_mut(id).and_then(|e| e.attrs.remove(name))
    }

    /// [§ 4.4 Locate a namespace](https://dom.spec.whatwg.org/#locate-a-namespace)
    ///
    /// Walks the element and its ancestors looking for a binding of
    /// `prefix` (`None` = default namespace).
    #[must_use]
    pub fn lookup_namespace_uri(&self, id: NodeId, prefix: Option<&str>) -> Option<String> {
        match prefix {
            Some("xml") => return Some(namespace::XML.to_string()),
            Some("xmlns") => return Some(namespace::XMLNS.to_string()),
            _ => {}
        }

        let declaration = prefix.map_or_else(|| "xmlns".to_string(), |p| format!("xmlns:{p}"));
        for element_id in std::iter::once(id).chain(self.ancestors(id)) {
            let Some(element) = self.as_element(element_id) else {
                continue;
            };
            // STEP 1: "If its namespace is non-null and its namespace prefix
            //          is prefix, then return namespace."
            if element.namespace_uri.is_some() && element.prefix() == prefix {
                return element.namespace_uri.clone();
            }
            // STEP 2: "If it has an attribute whose namespace is the XMLNS
            //          namespace ... return its value if it is not the empty
            //          string, and null otherwise."
            if let Some(value) = element.attrs.get(&declaration) {
                return (!value.is_empty()).then(|| value.to_string());
            }
        }
        None
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over descendants of a node in tree order.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

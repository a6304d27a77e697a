//! Tests for read-only tree queries: descendant search, text content,
//! namespace lookup and traversal order.

use anyhow::Result;
use wombat_common::{Flavor, namespace};
use wombat_dom::{Document, NodeId};

/// Builds `<root><a>one</a><b><a>two</a></b>three</root>`.
fn sample() -> Result<(Document, NodeId)> {
    let mut doc = Document::new(Flavor::Xml, "application/xml");
    let root = doc.create_element("root")?;
    let a1 = doc.create_element("a")?;
    let b = doc.create_element("b")?;
    let a2 = doc.create_element("a")?;
    let one = doc.create_text_node("one");
    let two = doc.create_text_node("two");
    let three = doc.create_text_node("three");

    doc.append_child(NodeId::ROOT, root)?;
    doc.append_child(root, a1)?;
    doc.append_child(a1, one)?;
    doc.append_child(root, b)?;
    doc.append_child(b, a2)?;
    doc.append_child(a2, two)?;
    doc.append_child(root, three)?;
    Ok((doc, root))
}

#[test]
fn test_get_elements_by_tag_name_in_tree_order() -> Result<()> {
    let (doc, root) = sample()?;

    let found = doc.get_elements_by_tag_name(NodeId::ROOT, "a");
    assert_eq!(found.len(), 2);
    let texts: Vec<String> = found.iter().map(|&id| doc.text_content(id)).collect();
    assert_eq!(texts, ["one", "two"]);

    // "*" matches every element below the root, excluding the root itself.
    assert_eq!(doc.get_elements_by_tag_name(root, "*").len(), 3);
    assert_eq!(doc.get_elements_by_tag_name(NodeId::ROOT, "*").len(), 4);
    assert!(doc.get_elements_by_tag_name(NodeId::ROOT, "A").is_empty());
    Ok(())
}

#[test]
fn test_text_content_concatenates_descendants() -> Result<()> {
    let (doc, root) = sample()?;
    assert_eq!(doc.text_content(root), "onetwothree");
    assert_eq!(doc.text_content(NodeId::ROOT), "onetwothree");
    Ok(())
}

#[test]
fn test_reads_are_stable() -> Result<()> {
    let (doc, root) = sample()?;
    let first: Vec<NodeId> = doc.descendants(root).collect();
    let second: Vec<NodeId> = doc.descendants(root).collect();
    assert_eq!(first, second);
    assert_eq!(doc.text_content(root), doc.text_content(root));
    Ok(())
}

#[test]
fn test_ancestors_walk_to_document() -> Result<()> {
    let (doc, root) = sample()?;
    let deep = doc.get_elements_by_tag_name(root, "a")[1];
    let chain: Vec<NodeId> = doc.ancestors(deep).collect();
    assert_eq!(chain.len(), 3);
    assert_eq!(chain.last(), Some(&NodeId::ROOT));
    assert!(doc.is_descendant_of(deep, root));
    assert!(!doc.is_descendant_of(root, deep));
    assert_eq!(doc.owner_document(deep), Some(NodeId::ROOT));
    assert_eq!(doc.owner_document(NodeId::ROOT), None);
    Ok(())
}

#[test]
fn test_namespace_queries() -> Result<()> {
    let mut doc = Document::new(Flavor::Xml, "application/xml");
    let root = doc.create_element_ns(Some(namespace::SVG), "svg")?;
    let link = doc.create_element_ns(Some("urn:link"), "l:link")?;
    doc.append_child(NodeId::ROOT, root)?;
    doc.append_child(root, link)?;
    doc.set_attribute(root, "xmlns:l", "urn:link")?;

    assert_eq!(
        doc.get_elements_by_tag_name_ns(NodeId::ROOT, Some("urn:link"), "link"),
        vec![link]
    );
    assert_eq!(
        doc.get_elements_by_tag_name_ns(NodeId::ROOT, Some("*"), "*").len(),
        2
    );
    assert_eq!(
        doc.lookup_namespace_uri(link, Some("l")).as_deref(),
        Some("urn:link")
    );
    assert_eq!(
        doc.lookup_namespace_uri(link, None).as_deref(),
        Some(namespace::SVG)
    );
    assert_eq!(
        doc.lookup_namespace_uri(link, Some("xml")).as_deref(),
        Some(namespace::XML)
    );
    assert_eq!(doc.lookup_namespace_uri(link, Some("nope")), None);
    Ok(())
}

#[test]
fn test_display_serializes() -> Result<()> {
    let (doc, _) = sample()?;
    assert_eq!(
        doc.to_string(),
        "<root><a>one</a><b><a>two</a></b>three</root>"
    );
    Ok(())
}

#[test]
fn test_first_and_last_child() -> Result<()> {
    let (doc, root) = sample()?;
    let first = doc.first_child(root);
    let last = doc.last_child(root);

    assert_eq!(first.map(|id| doc.text_content(id)).as_deref(), Some("one"));
    assert_eq!(last.and_then(|id| doc.as_text(id)), Some("three"));
    assert_eq!(doc.document_element(), doc.first_child(NodeId::ROOT));
    assert_eq!(last.and_then(|id| doc.first_child(id)), None);
    Ok(())
}

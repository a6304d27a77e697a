//! Integration tests for the markup tokenizer.

use wombat_common::Flavor;
use wombat_parser::tokenizer::Attribute;
use wombat_parser::{Diagnostic, ErrorKind, MarkupTokenizer, Position, Severity, Token};

/// Helper to tokenize a string and return the tokens without positions
fn tokenize(input: &str, flavor: Flavor) -> Vec<Token> {
    MarkupTokenizer::new(input, flavor)
        .into_tokens()
        .into_iter()
        .map(|t| t.token)
        .collect()
}

/// Helper to tokenize a string and return the tokens with their positions
fn tokenize_with_positions(input: &str) -> Vec<(Token, Position)> {
    MarkupTokenizer::new(input, Flavor::Xml)
        .into_tokens()
        .into_iter()
        .map(|t| (t.token, t.position))
        .collect()
}

/// Helper to collect the diagnostics of a full run
fn diagnostics(input: &str, flavor: Flavor) -> Vec<Diagnostic> {
    let mut tokenizer = MarkupTokenizer::new(input, flavor);
    tokenizer.run();
    tokenizer.take_diagnostics()
}

fn start(name: &str, attributes: &[(&str, &str)], self_closing: bool) -> Token {
    Token::StartTag {
        name: name.to_string(),
        attributes: attributes
            .iter()
            .map(|(n, v)| Attribute::new((*n).to_string(), (*v).to_string()))
            .collect(),
        self_closing,
    }
}

fn end(name: &str) -> Token {
    Token::EndTag {
        name: name.to_string(),
    }
}

fn text(data: &str) -> Token {
    Token::Text {
        data: data.to_string(),
        escapable: true,
    }
}

#[test]
fn test_start_tag_with_attributes() {
    let tokens = tokenize("<a x=\"1\" y='2'>", Flavor::Xml);
    assert_eq!(
        tokens,
        vec![start("a", &[("x", "1"), ("y", "2")], false), Token::EndOfInput]
    );
}

#[test]
fn test_self_closing_and_end_tag() {
    let tokens = tokenize("<a><b/></a>", Flavor::Xml);
    assert_eq!(
        tokens,
        vec![
            start("a", &[], false),
            start("b", &[], true),
            end("a"),
            Token::EndOfInput
        ]
    );
}

#[test]
fn test_references_stay_undecoded() {
    let tokens = tokenize("<xml attr=\"&quot;\">&lt; &amp;</xml>", Flavor::Xml);
    assert_eq!(tokens[0], start("xml", &[("attr", "&quot;")], false));
    assert_eq!(tokens[1], text("&lt; &amp;"));
}

#[test]
fn test_comment_cdata_and_processing_instruction() {
    let tokens = tokenize(
        "<?xml-stylesheet href=\"a.css\"?><r><!-- c --><![CDATA[<x> & y]]></r>",
        Flavor::Xml,
    );
    assert_eq!(
        tokens[0],
        Token::ProcessingInstruction {
            target: "xml-stylesheet".to_string(),
            data: "href=\"a.css\"".to_string(),
        }
    );
    assert_eq!(
        tokens[2],
        Token::Comment {
            data: " c ".to_string()
        }
    );
    assert_eq!(
        tokens[3],
        Token::Cdata {
            data: "<x> & y".to_string()
        }
    );
}

#[test]
fn test_doctype_with_internal_subset() {
    let tokens = tokenize("<!DOCTYPE note [<!ENTITY a \"b>\">]><note/>", Flavor::Xml);
    assert_eq!(
        tokens[0],
        Token::Doctype {
            raw: "note [<!ENTITY a \"b>\">]".to_string()
        }
    );
    assert_eq!(tokens[1], start("note", &[], true));
}

#[test]
fn test_doctype_keyword_is_case_insensitive() {
    let tokens = tokenize("<!doctype html><html></html>", Flavor::Html);
    assert_eq!(
        tokens[0],
        Token::Doctype {
            raw: "html".to_string()
        }
    );
}

#[test]
fn test_positions_are_event_starts() {
    let tokens = tokenize_with_positions("<a>\n  <b/>\n</a>");
    let positions: Vec<(usize, usize)> = tokens
        .iter()
        .map(|(_, p)| (p.line, p.column))
        .collect();
    assert_eq!(positions, vec![(1, 1), (1, 4), (2, 3), (2, 7), (3, 1), (3, 5)]);
}

#[test]
fn test_single_element_starts_at_one_one() {
    let tokens = tokenize_with_positions("<xml/>");
    assert_eq!(tokens[0].1, Position::START);
}

#[test]
fn test_crlf_is_normalized() {
    let tokens = tokenize_with_positions("<a>\r\n<b/>\r</a>");
    assert_eq!(tokens[1].0, text("\n"));
    assert_eq!(tokens[2].1, Position::new(2, 1));
    assert_eq!(tokens[3].0, text("\n"));
    assert_eq!(tokens[4].1, Position::new(3, 1));
}

#[test]
fn test_tokenizer_is_lazy() {
    let mut tokenizer = MarkupTokenizer::new("<a>text</a>", Flavor::Xml);
    let first = tokenizer.next().map(|t| t.token);
    assert_eq!(first, Some(start("a", &[], false)));
    let rest: Vec<Token> = tokenizer.map(|t| t.token).collect();
    assert_eq!(rest, vec![text("text"), end("a"), Token::EndOfInput]);
}

#[test]
fn test_unterminated_comment_ends_input() {
    let mut tokenizer = MarkupTokenizer::new("<a><!-- oops", Flavor::Xml);
    tokenizer.run();
    let diagnostics = tokenizer.take_diagnostics();
    let tokens: Vec<Token> = tokenizer.into_tokens().into_iter().map(|t| t.token).collect();

    assert_eq!(tokens, vec![start("a", &[], false), Token::EndOfInput]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Fatal);
    assert_eq!(diagnostics[0].kind, ErrorKind::Tokenization);
    assert_eq!(diagnostics[0].position, Position::new(1, 4));
}

#[test]
fn test_invalid_character_resyncs_to_gt() {
    let tokens = tokenize("<a b\"c>text</a>", Flavor::Xml);
    assert_eq!(
        tokens,
        vec![start("a", &[], false), text("text"), end("a"), Token::EndOfInput]
    );
    let diagnostics = diagnostics("<a b\"c>text</a>", Flavor::Xml);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert_eq!(diagnostics[0].position, Position::new(1, 5));
}

#[test]
fn test_invalid_character_resyncs_to_lt() {
    let tokens = tokenize("<a<b/>", Flavor::Xml);
    assert_eq!(
        tokens,
        vec![start("a", &[], false), start("b", &[], true), Token::EndOfInput]
    );
}

#[test]
fn test_lone_less_than_is_text() {
    let tokens = tokenize("<a>1 < 2</a>", Flavor::Xml);
    assert_eq!(tokens[1], text("1 "));
    assert_eq!(tokens[2], text("< 2"));
    assert_eq!(diagnostics("<a>1 < 2</a>", Flavor::Xml).len(), 1);
    assert!(diagnostics("<p>1 < 2</p>", Flavor::Html).is_empty());
}

#[test]
fn test_duplicate_attribute_dropped() {
    let tokens = tokenize("<a x=\"1\" x=\"2\"/>", Flavor::Xml);
    assert_eq!(tokens[0], start("a", &[("x", "1")], true));
    let diagnostics = diagnostics("<a x=\"1\" x=\"2\"/>", Flavor::Xml);
    assert!(diagnostics[0].message.contains("duplicate"));
}

#[test]
fn test_html_accepts_loose_attributes_silently() {
    let input = "<input disabled value=yes>";
    let tokens = tokenize(input, Flavor::Html);
    assert_eq!(
        tokens[0],
        start("input", &[("disabled", ""), ("value", "yes")], false)
    );
    assert!(diagnostics(input, Flavor::Html).is_empty());
}

#[test]
fn test_xml_warns_on_loose_attributes() {
    let input = "<input disabled value=yes/>";
    let tokens = tokenize("<input disabled/>", Flavor::Xml);
    assert_eq!(tokens[0], start("input", &[("disabled", "disabled")], true));
    assert_eq!(diagnostics(input, Flavor::Xml).len(), 2);
}

#[test]
fn test_html_script_is_raw_text() {
    let tokens = tokenize(
        "<script>if (a < b) { x = \"</p>\"; }</script>",
        Flavor::Html,
    );
    assert_eq!(
        tokens,
        vec![
            start("script", &[], false),
            Token::Text {
                data: "if (a < b) { x = \"</p>\"; }".to_string(),
                escapable: false,
            },
            end("script"),
            Token::EndOfInput
        ]
    );
}

#[test]
fn test_html_raw_text_end_tag_is_case_insensitive() {
    let tokens = tokenize("<STYLE>p > a {}</style>", Flavor::Html);
    assert_eq!(tokens[2], end("style"));
}

#[test]
fn test_html_title_is_escapable_raw_text() {
    let tokens = tokenize("<title>a &amp; <b></title>", Flavor::Html);
    assert_eq!(tokens[1], text("a &amp; <b>"));
}

#[test]
fn test_xml_script_is_markup() {
    let tokens = tokenize("<script><b/></script>", Flavor::Xml);
    assert_eq!(tokens[1], start("b", &[], true));
}

#[test]
fn test_html_cdata_is_bogus_comment() {
    let tokens = tokenize("<![CDATA[x]]>", Flavor::Html);
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: "[CDATA[x]]".to_string()
        }
    );
}

//! Well-known namespace URIs, MIME types, and document flavors.
//!
//! [DOM Parsing § 4 The `DOMParser` interface](https://html.spec.whatwg.org/multipage/dynamic-markup-insertion.html#dom-parsing-and-serialization)
//!
//! "The `parseFromString(string, type)` method steps are: ... switch on type"

use std::str::FromStr;

use strum_macros::{AsRefStr, Display, EnumString};

/// [Namespaces in XML 1.0](https://www.w3.org/TR/xml-names/) and
/// [Infra § 8 Namespaces](https://infra.spec.whatwg.org/#namespaces)
pub mod namespace {
    /// "The HTML namespace is `http://www.w3.org/1999/xhtml`."
    pub const HTML: &str = "http://www.w3.org/1999/xhtml";
    /// "The SVG namespace is `http://www.w3.org/2000/svg`."
    pub const SVG: &str = "http://www.w3.org/2000/svg";
    /// "The `MathML` namespace is `http://www.w3.org/1998/Math/MathML`."
    pub const MATHML: &str = "http://www.w3.org/1998/Math/MathML";
    /// "The prefix `xml` is by definition bound to the namespace name
    /// `http://www.w3.org/XML/1998/namespace`."
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    /// "The prefix `xmlns` is used only to declare namespace bindings and is by
    /// definition bound to the namespace name `http://www.w3.org/2000/xmlns/`."
    pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
}

/// [HTML § 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#elements-2)
///
/// Element classes that change how HTML-flavored markup is tokenized and
/// serialized. Names compare ASCII-case-insensitively.
pub mod html_elements {
    /// "Void elements: area, base, br, col, embed, hr, img, input, link, meta,
    /// source, track, wbr" (plus the legacy `param`).
    pub const VOID: &[&str] = &[
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ];
    /// "The raw text elements: script, style"
    pub const RAW_TEXT: &[&str] = &["script", "style"];
    /// "Escapable raw text elements: textarea, title"
    pub const ESCAPABLE_RAW_TEXT: &[&str] = &["textarea", "title"];

    fn contains(set: &[&str], name: &str) -> bool {
        set.iter().any(|candidate| candidate.eq_ignore_ascii_case(name))
    }

    /// Whether `name` is a void element.
    #[must_use]
    pub fn is_void(name: &str) -> bool {
        contains(VOID, name)
    }

    /// Whether `name` holds raw text (no markup, no references).
    #[must_use]
    pub fn is_raw_text(name: &str) -> bool {
        contains(RAW_TEXT, name)
    }

    /// Whether `name` holds text with references but no markup.
    #[must_use]
    pub fn is_escapable_raw_text(name: &str) -> bool {
        contains(ESCAPABLE_RAW_TEXT, name)
    }
}

/// [DOM § 4.5 Interface Document](https://dom.spec.whatwg.org/#concept-document-type)
///
/// "Each document has an associated ... type ("xml" or "html")"
///
/// The flavor drives entity decoding/encoding and HTML-specific
/// tokenization rules (raw text and void elements).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Flavor {
    /// "A document whose type is "xml" is known as an XML document."
    Xml,
    /// "A document whose type is "html" is known as an HTML document."
    Html,
}

/// The MIME types a parse can be declared with.
///
/// Anything that is a well-formed `type/subtype` but not one of the known
/// values is kept as [`MimeType::Other`] and parsed as generic XML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, EnumString)]
pub enum MimeType {
    /// `application/xml`, the default when no type is declared.
    #[default]
    #[strum(serialize = "application/xml")]
    XmlApplication,
    /// `text/xml`
    #[strum(serialize = "text/xml")]
    XmlText,
    /// `application/xhtml+xml`
    #[strum(serialize = "application/xhtml+xml")]
    XhtmlApplication,
    /// `image/svg+xml`
    #[strum(serialize = "image/svg+xml")]
    SvgImage,
    /// `text/html`
    #[strum(serialize = "text/html")]
    Html,
    /// Any other `type/subtype` essence.
    #[strum(default)]
    Other(String),
}

impl MimeType {
    /// Parse a declared content type.
    ///
    /// Parameters after `;` are dropped and the essence is compared
    /// ASCII-case-insensitively. Returns `None` when the value has no
    /// `type/subtype` shape.
    #[must_use]
    pub fn parse(declared: &str) -> Option<Self> {
        let essence = declared
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        let (kind, subtype) = essence.split_once('/')?;
        if kind.is_empty() || subtype.is_empty() || subtype.contains('/') {
            return None;
        }

        Some(Self::from_str(&essence).unwrap_or_else(|_| Self::Other(essence)))
    }

    /// The lower-cased `type/subtype` essence of this MIME type.
    #[must_use]
    pub fn essence(&self) -> &str {
        match self {
            Self::XmlApplication => "application/xml",
            Self::XmlText => "text/xml",
            Self::XhtmlApplication => "application/xhtml+xml",
            Self::SvgImage => "image/svg+xml",
            Self::Html => "text/html",
            Self::Other(essence) => essence,
        }
    }

    /// "If type is "text/html" ... document's type is "html"; otherwise "xml"."
    #[must_use]
    pub const fn flavor(&self) -> Flavor {
        match self {
            Self::Html => Flavor::Html,
            _ => Flavor::Xml,
        }
    }

    /// The default namespace this type imposes, overriding any caller default.
    #[must_use]
    pub const fn default_namespace_override(&self) -> Option<&'static str> {
        match self {
            Self::Html | Self::XhtmlApplication => Some(namespace::HTML),
            Self::SvgImage => Some(namespace::SVG),
            _ => None,
        }
    }
}

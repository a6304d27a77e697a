use core::fmt;

use serde::{Deserialize, Serialize};

/// A 1-based line and column in the (line-ending normalized) input.
///
/// Lines advance on every LF; columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
}

impl Position {
    /// Line 1, column 1.
    pub const START: Self = Self { line: 1, column: 1 };

    /// Create a position.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// The position after `c`.
    #[must_use]
    pub const fn advance(self, c: char) -> Self {
        if c == '\n' {
            Self {
                line: self.line + 1,
                column: 1,
            }
        } else {
            Self {
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An attribute on a start tag token.
///
/// "a list of attributes, each of which has a name and a value". The value
/// is the raw source text: character references are decoded later by the
/// tree builder, once the entity table is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// "each of which has a name"
    pub name: String,
    /// "and a value"
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub const fn new(name: String, value: String) -> Self {
        Self { name, value }
    }
}

/// The structural events the tokenizer produces, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<name attr="v" ...>` or `<name/>`
    StartTag {
        /// Tag name with its source case.
        name: String,
        /// Attributes in source order, names unique.
        attributes: Vec<Attribute>,
        /// Whether the tag ended with `/>`.
        self_closing: bool,
    },

    /// `</name>`
    EndTag {
        /// Tag name with its source case.
        name: String,
    },

    /// A run of character data between markup.
    Text {
        /// Raw text, references undecoded.
        data: String,
        /// False for raw text element content, which is never decoded.
        escapable: bool,
    },

    /// `<!--data-->`
    Comment {
        /// Everything between the delimiters.
        data: String,
    },

    /// `<![CDATA[data]]>`
    Cdata {
        /// Everything between the delimiters.
        data: String,
    },

    /// `<?target data?>`
    ProcessingInstruction {
        /// The PI target.
        target: String,
        /// The rest, leading whitespace stripped.
        data: String,
    },

    /// `<!DOCTYPE raw>`
    Doctype {
        /// Everything between the keyword and the closing `>`, trimmed.
        raw: String,
    },

    /// End of input. Always the last token.
    EndOfInput,
}

impl Token {
    /// "When a start or end tag token is created, its self-closing flag must be
    /// unset (its other state is that it be set), and its attributes list must
    /// be empty."
    #[must_use]
    pub const fn new_start_tag() -> Self {
        Self::StartTag {
            name: String::new(),
            attributes: Vec::new(),
            self_closing: false,
        }
    }

    /// Create a new, empty end tag token.
    #[must_use]
    pub const fn new_end_tag() -> Self {
        Self::EndTag {
            name: String::new(),
        }
    }

    /// Append a character to a tag token's name.
    pub fn append_to_tag_name(&mut self, c: char) {
        if let Self::StartTag { name, .. } | Self::EndTag { name } = self {
            name.push(c);
        }
    }

    /// The tag name of a start or end tag token.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::StartTag { name, .. } | Self::EndTag { name } => Some(name),
            _ => None,
        }
    }

    /// Set the self-closing flag on a start tag token.
    pub const fn set_self_closing(&mut self) {
        if let Self::StartTag { self_closing, .. } = self {
            *self_closing = true;
        }
    }

    /// Whether a start tag token already has an attribute named `name`.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        matches!(self, Self::StartTag { attributes, .. } if attributes.iter().any(|a| a.name == name))
    }

    /// Add an attribute to a start tag token.
    pub fn push_attribute(&mut self, attribute: Attribute) {
        if let Self::StartTag { attributes, .. } = self {
            attributes.push(attribute);
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                write!(f, "StartTag(<{name}")?;
                for attr in attributes {
                    write!(f, " {}=\"{}\"", attr.name, attr.value)?;
                }
                if *self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">)")
            }
            Self::EndTag { name } => write!(f, "EndTag(</{name}>)"),
            Self::Text { data, .. } => write!(f, "Text({data:?})"),
            Self::Comment { data } => write!(f, "Comment(<!--{data}-->)"),
            Self::Cdata { data } => write!(f, "CDATA({data:?})"),
            Self::ProcessingInstruction { target, data } => write!(f, "PI(<?{target} {data}?>)"),
            Self::Doctype { raw } => write!(f, "DOCTYPE({raw})"),
            Self::EndOfInput => write!(f, "EndOfInput"),
        }
    }
}

/// A token together with the position where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceToken {
    /// The event.
    pub token: Token,
    /// 1-based start of the construct.
    pub position: Position,
}

use std::collections::VecDeque;

use strum_macros::Display;
use wombat_common::{Flavor, html_elements};

use super::token::{Attribute, Position, SourceToken, Token};
use crate::error::{Diagnostic, ErrorKind};

/// The tokenizer state machine. Each state handles one input character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// Character data between markup.
    Data,
    /// Content of `script`/`style` in HTML documents: no markup, no references.
    RawText,
    /// Content of `title`/`textarea` in HTML documents: references, no markup.
    EscapableRawText,
    /// After `<`.
    TagOpen,
    /// After `</`.
    EndTagOpen,
    /// Inside a start tag name.
    TagName,
    /// Inside an end tag name.
    EndTagName,
    /// After an end tag name, before `>`.
    AfterEndTagName,
    /// Between attributes.
    BeforeAttributeName,
    /// Inside an attribute name.
    AttributeName,
    /// After an attribute name, before `=` or the next attribute.
    AfterAttributeName,
    /// After `=`.
    BeforeAttributeValue,
    /// Inside `"..."`.
    AttributeValueDoubleQuoted,
    /// Inside `'...'`.
    AttributeValueSingleQuoted,
    /// Inside an unquoted value.
    AttributeValueUnquoted,
    /// After a closing quote.
    AfterAttributeValueQuoted,
    /// After `/` inside a start tag.
    SelfClosingStartTag,
    /// Inside `<!--...-->`.
    Comment,
    /// Inside `<![CDATA[...]]>`.
    CdataSection,
    /// Inside `<!DOCTYPE ...>`.
    Doctype,
    /// Inside `<?...?>`.
    ProcessingInstruction,
    /// Inside `<!...>` that is none of the above; read as a comment.
    BogusComment,
    /// Skipping the rest of a malformed tag up to `>` or `<`.
    ResyncTag,
}

/// A forward-only tokenizer for XML and HTML-flavored markup.
///
/// Produces [`SourceToken`]s lazily through [`Iterator`]; diagnostics found
/// along the way are queued and drained with
/// [`MarkupTokenizer::take_diagnostics`].
pub struct MarkupTokenizer {
    pub(super) state: TokenizerState,
    pub(super) flavor: Flavor,
    pub(super) input: String,
    pub(super) current_pos: usize,
    pub(super) current_input_character: Option<char>,
    // When true, the next iteration of the main loop will not consume a new character.
    // "Reconsume in the X state" sets this flag.
    pub(super) reconsume: bool,

    /// Position of the next unconsumed character.
    pub(super) next_position: Position,
    /// Position of `current_input_character`.
    pub(super) char_position: Position,
    /// Start of the markup construct being built (its `<`).
    pub(super) markup_start: Position,

    pub(super) current_token: Option<Token>,
    pub(super) current_attribute: Option<Attribute>,
    pub(super) text_buffer: String,
    pub(super) text_start: Position,
    /// Data buffer for comments, CDATA, doctypes and processing instructions.
    pub(super) temporary_buffer: String,
    /// Open `[` count inside a doctype.
    pub(super) doctype_depth: usize,
    /// Open quote inside a doctype.
    pub(super) doctype_quote: Option<char>,
    /// Lower-cased name of the raw text element being read.
    pub(super) raw_text_end: Option<String>,

    pub(super) token_stream: VecDeque<SourceToken>,
    pub(super) diagnostics: Vec<Diagnostic>,
    pub(super) at_eof: bool,
}

impl MarkupTokenizer {
    /// Create a new tokenizer for the given input.
    ///
    /// CR LF pairs and lone CRs are normalized to LF first, so positions
    /// only ever count LF line breaks. The initial state is the data state.
    #[must_use]
    pub fn new(input: &str, flavor: Flavor) -> Self {
        let input = if input.contains('\r') {
            input.replace("\r\n", "\n").replace('\r', "\n")
        } else {
            input.to_string()
        };
        Self {
            state: TokenizerState::Data,
            flavor,
            input,
            current_pos: 0,
            current_input_character: None,
            reconsume: false,
            next_position: Position::START,
            char_position: Position::START,
            markup_start: Position::START,
            current_token: None,
            current_attribute: None,
            text_buffer: String::new(),
            text_start: Position::START,
            temporary_buffer: String::new(),
            doctype_depth: 0,
            doctype_quote: None,
            raw_text_end: None,
            token_stream: VecDeque::new(),
            diagnostics: Vec::new(),
            at_eof: false,
        }
    }

    /// The flavor this tokenizer applies.
    #[must_use]
    pub const fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Diagnostics found since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Produce the next token, running the state machine as far as needed.
    /// Returns `None` once [`Token::EndOfInput`] has been handed out.
    pub fn next_token(&mut self) -> Option<SourceToken> {
        while self.token_stream.is_empty() && !self.at_eof {
            self.step();
        }
        self.token_stream.pop_front()
    }

    /// Run the whole input eagerly.
    pub fn run(&mut self) {
        while !self.at_eof {
            self.step();
        }
    }

    /// Consume the tokenizer and return every token not yet handed out.
    #[must_use]
    pub fn into_tokens(mut self) -> Vec<SourceToken> {
        self.run();
        self.token_stream.into()
    }

    /// One iteration of the main loop.
    fn step(&mut self) {
        // Each state begins by consuming the next input character,
        // unless we're reconsuming from a previous state transition.
        if self.reconsume {
            self.reconsume = false;
        } else {
            self.current_input_character = self.consume();
        }

        match self.state {
            TokenizerState::Data => self.handle_data_state(),
            TokenizerState::RawText => self.handle_raw_text_state(false),
            TokenizerState::EscapableRawText => self.handle_raw_text_state(true),
            TokenizerState::TagOpen => self.handle_tag_open_state(),
            TokenizerState::EndTagOpen => self.handle_end_tag_open_state(),
            TokenizerState::TagName => self.handle_tag_name_state(),
            TokenizerState::EndTagName => self.handle_end_tag_name_state(),
            TokenizerState::AfterEndTagName => self.handle_after_end_tag_name_state(),
            TokenizerState::BeforeAttributeName => self.handle_before_attribute_name_state(),
            TokenizerState::AttributeName => self.handle_attribute_name_state(),
            TokenizerState::AfterAttributeName => self.handle_after_attribute_name_state(),
            TokenizerState::BeforeAttributeValue => self.handle_before_attribute_value_state(),
            TokenizerState::AttributeValueDoubleQuoted => self.handle_quoted_value_state('"'),
            TokenizerState::AttributeValueSingleQuoted => self.handle_quoted_value_state('\''),
            TokenizerState::AttributeValueUnquoted => self.handle_unquoted_value_state(),
            TokenizerState::AfterAttributeValueQuoted => {
                self.handle_after_attribute_value_quoted_state();
            }
            TokenizerState::SelfClosingStartTag => self.handle_self_closing_start_tag_state(),
            TokenizerState::Comment => self.handle_comment_state(),
            TokenizerState::CdataSection => self.handle_cdata_section_state(),
            TokenizerState::Doctype => self.handle_doctype_state(),
            TokenizerState::ProcessingInstruction => self.handle_processing_instruction_state(),
            TokenizerState::BogusComment => self.handle_bogus_comment_state(),
            TokenizerState::ResyncTag => self.handle_resync_tag_state(),
        }
    }

    /// Character data. `&` is kept as-is; references are decoded by the
    /// tree builder.
    fn handle_data_state(&mut self) {
        match self.current_input_character {
            Some('<') => {
                self.flush_text(true);
                self.markup_start = self.char_position;
                self.switch_to(TokenizerState::TagOpen);
            }
            None => {
                self.flush_text(true);
                self.emit_end_of_input();
            }
            Some(c) => self.append_text(c),
        }
    }

    /// [HTML § 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
    /// and [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    ///
    /// Everything up to the appropriate end tag is text.
    fn handle_raw_text_state(&mut self, escapable: bool) {
        match self.current_input_character {
            Some('<') if self.appropriate_end_tag_follows() => {
                self.flush_text(escapable);
                self.raw_text_end = None;
                self.markup_start = self.char_position;
                self.switch_to(TokenizerState::TagOpen);
            }
            None => {
                self.flush_text(escapable);
                self.emit_end_of_input();
            }
            Some(c) => self.append_text(c),
        }
    }

    /// After `<`.
    fn handle_tag_open_state(&mut self) {
        match self.current_input_character {
            Some('!') => self.handle_markup_declaration_open(),
            Some('/') => self.switch_to(TokenizerState::EndTagOpen),
            Some('?') => {
                self.temporary_buffer.clear();
                self.switch_to(TokenizerState::ProcessingInstruction);
            }
            Some(c) if Self::is_name_start_char(c) => {
                self.current_token = Some(Token::new_start_tag());
                self.reconsume_in(TokenizerState::TagName);
            }
            None => self.unterminated("tag"),
            Some(c) => {
                // "invalid-first-character-of-tag-name": the `<` is text.
                if self.flavor == Flavor::Xml {
                    self.warn(
                        self.markup_start,
                        format!("invalid character {c:?} after '<'; treated as text"),
                    );
                }
                self.text_start = self.markup_start;
                self.text_buffer.push('<');
                self.reconsume_in(TokenizerState::Data);
            }
        }
    }

    /// [HTML § 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// Runs right after `<!` with lookahead on the remaining input.
    fn handle_markup_declaration_open(&mut self) {
        self.temporary_buffer.clear();
        // "If the next few characters are: Two U+002D HYPHEN-MINUS characters (-)"
        if self.next_few_characters_are("--") {
            self.consume_string("--");
            self.switch_to(TokenizerState::Comment);
        // "ASCII case-insensitive match for the word "DOCTYPE""
        } else if self.next_few_characters_are_case_insensitive("DOCTYPE") {
            self.consume_string("DOCTYPE");
            self.doctype_depth = 0;
            self.doctype_quote = None;
            self.switch_to(TokenizerState::Doctype);
        // "The string "[CDATA[" (the five uppercase letters "CDATA" with a
        // U+005B LEFT SQUARE BRACKET character before and after)"
        } else if self.flavor == Flavor::Xml && self.next_few_characters_are("[CDATA[") {
            self.consume_string("[CDATA[");
            self.switch_to(TokenizerState::CdataSection);
        } else {
            // "incorrectly-opened-comment parse error"
            self.warn(self.markup_start, "incorrectly opened comment");
            self.switch_to(TokenizerState::BogusComment);
        }
    }

    /// After `</`.
    fn handle_end_tag_open_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_name_start_char(c) => {
                self.current_token = Some(Token::new_end_tag());
                self.reconsume_in(TokenizerState::EndTagName);
            }
            // "missing-end-tag-name parse error. Switch to the data state."
            Some('>') => {
                self.warn(self.markup_start, "end tag without a name ignored");
                self.switch_to(TokenizerState::Data);
            }
            None => self.unterminated("end tag"),
            Some(c) => {
                self.warn(
                    self.char_position,
                    format!("invalid character {c:?} in end tag"),
                );
                self.switch_to(TokenizerState::ResyncTag);
            }
        }
    }

    /// Inside a start tag name.
    fn handle_tag_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_tag();
            }
            None => self.unterminated("start tag"),
            Some(c) if Self::is_name_char(c) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_tag_name(c);
                }
            }
            Some(c) => self.invalid_in_tag(c, "tag name"),
        }
    }

    /// Inside an end tag name.
    fn handle_end_tag_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::AfterEndTagName);
            }
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_tag();
            }
            None => self.unterminated("end tag"),
            Some(c) if Self::is_name_char(c) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_tag_name(c);
                }
            }
            Some(c) => self.invalid_in_tag(c, "end tag name"),
        }
    }

    /// After an end tag name: only whitespace may follow.
    fn handle_after_end_tag_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_tag();
            }
            None => self.unterminated("end tag"),
            // "end-tag-with-attributes parse error"
            Some(c) => self.invalid_in_tag(c, "end tag"),
        }
    }

    /// [HTML § 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    fn handle_before_attribute_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_tag();
            }
            None => self.unterminated("start tag"),
            Some(c) if Self::is_name_char(c) => {
                self.current_attribute = Some(Attribute::new(String::new(), String::new()));
                self.reconsume_in(TokenizerState::AttributeName);
            }
            Some(c) => self.invalid_in_tag(c, "attribute name"),
        }
    }

    /// [HTML § 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    fn handle_attribute_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::AfterAttributeName);
            }
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some('/') => {
                self.finish_valueless_attribute();
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            Some('>') => {
                self.finish_valueless_attribute();
                self.switch_to(TokenizerState::Data);
                self.emit_tag();
            }
            None => self.unterminated("start tag"),
            Some(c) if Self::is_name_char(c) => {
                if let Some(ref mut attr) = self.current_attribute {
                    attr.name.push(c);
                }
            }
            Some(c) => self.invalid_in_tag(c, "attribute name"),
        }
    }

    /// [HTML § 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    fn handle_after_attribute_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some('/') => {
                self.finish_valueless_attribute();
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            Some('>') => {
                self.finish_valueless_attribute();
                self.switch_to(TokenizerState::Data);
                self.emit_tag();
            }
            None => self.unterminated("start tag"),
            Some(_) => {
                self.finish_valueless_attribute();
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
    }

    /// [HTML § 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    fn handle_before_attribute_value_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('"') => self.switch_to(TokenizerState::AttributeValueDoubleQuoted),
            Some('\'') => self.switch_to(TokenizerState::AttributeValueSingleQuoted),
            // "missing-attribute-value parse error"
            Some('>') => {
                if self.flavor == Flavor::Xml {
                    self.warn(self.char_position, "attribute value missing after '='");
                }
                self.finish_attribute();
                self.switch_to(TokenizerState::Data);
                self.emit_tag();
            }
            None => self.unterminated("start tag"),
            Some(_) => {
                if self.flavor == Flavor::Xml {
                    self.warn(self.char_position, "attribute value is not quoted");
                }
                self.reconsume_in(TokenizerState::AttributeValueUnquoted);
            }
        }
    }

    /// Inside a quoted attribute value.
    fn handle_quoted_value_state(&mut self, quote: char) {
        match self.current_input_character {
            Some(c) if c == quote => {
                self.finish_attribute();
                self.switch_to(TokenizerState::AfterAttributeValueQuoted);
            }
            None => self.unterminated("attribute value"),
            Some(c) => {
                if let Some(ref mut attr) = self.current_attribute {
                    attr.value.push(c);
                }
            }
        }
    }

    /// [HTML § 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    fn handle_unquoted_value_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.finish_attribute();
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('>') => {
                self.finish_attribute();
                self.switch_to(TokenizerState::Data);
                self.emit_tag();
            }
            None => self.unterminated("start tag"),
            Some(c) => {
                if let Some(ref mut attr) = self.current_attribute {
                    attr.value.push(c);
                }
            }
        }
    }

    /// [HTML § 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    fn handle_after_attribute_value_quoted_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_tag();
            }
            None => self.unterminated("start tag"),
            // "missing-whitespace-between-attributes parse error"
            Some(_) => {
                if self.flavor == Flavor::Xml {
                    self.warn(self.char_position, "missing whitespace between attributes");
                }
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
    }

    /// [HTML § 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    fn handle_self_closing_start_tag_state(&mut self) {
        match self.current_input_character {
            // "Set the self-closing flag of the current tag token. Switch to
            // the data state. Emit the current tag token."
            Some('>') => {
                if let Some(ref mut token) = self.current_token {
                    token.set_self_closing();
                }
                self.switch_to(TokenizerState::Data);
                self.emit_tag();
            }
            None => self.unterminated("start tag"),
            // "unexpected-solidus-in-tag parse error"
            Some(_) => {
                self.warn(self.char_position, "unexpected '/' in tag");
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
    }

    /// Inside `<!--`; ends at the first `-->`.
    fn handle_comment_state(&mut self) {
        match self.current_input_character {
            Some('-') if self.next_few_characters_are("->") => {
                self.consume_string("->");
                let data = std::mem::take(&mut self.temporary_buffer);
                self.emit(Token::Comment { data }, self.markup_start);
                self.switch_to(TokenizerState::Data);
            }
            None => self.unterminated("comment"),
            Some(c) => self.temporary_buffer.push(c),
        }
    }

    /// Inside `<![CDATA[`; ends at the first `]]>`.
    fn handle_cdata_section_state(&mut self) {
        match self.current_input_character {
            Some(']') if self.next_few_characters_are("]>") => {
                self.consume_string("]>");
                let data = std::mem::take(&mut self.temporary_buffer);
                self.emit(Token::Cdata { data }, self.markup_start);
                self.switch_to(TokenizerState::Data);
            }
            None => self.unterminated("CDATA section"),
            Some(c) => self.temporary_buffer.push(c),
        }
    }

    /// Inside `<!DOCTYPE`. Quoted strings and a bracketed internal subset
    /// may contain `>`.
    fn handle_doctype_state(&mut self) {
        let Some(c) = self.current_input_character else {
            self.unterminated("DOCTYPE");
            return;
        };
        match (self.doctype_quote, c) {
            (Some(quote), c) if c == quote => self.doctype_quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => self.doctype_quote = Some(c),
            (None, '[') => self.doctype_depth += 1,
            (None, ']') => self.doctype_depth = self.doctype_depth.saturating_sub(1),
            (None, '>') if self.doctype_depth == 0 => {
                let raw = std::mem::take(&mut self.temporary_buffer)
                    .trim()
                    .to_string();
                self.emit(Token::Doctype { raw }, self.markup_start);
                self.switch_to(TokenizerState::Data);
                return;
            }
            (None, _) => {}
        }
        self.temporary_buffer.push(c);
    }

    /// Inside `<?`; ends at the first `?>`.
    fn handle_processing_instruction_state(&mut self) {
        match self.current_input_character {
            Some('?') if self.next_few_characters_are(">") => {
                self.consume_string(">");
                let body = std::mem::take(&mut self.temporary_buffer);
                let (target, data) = body
                    .split_once(Self::is_whitespace_char)
                    .map_or((body.as_str(), ""), |(t, d)| (t, d.trim_start()));
                if target.is_empty() {
                    self.warn(self.markup_start, "processing instruction without a target");
                }
                let token = Token::ProcessingInstruction {
                    target: target.to_string(),
                    data: data.to_string(),
                };
                self.emit(token, self.markup_start);
                self.switch_to(TokenizerState::Data);
            }
            None => self.unterminated("processing instruction"),
            Some(c) => self.temporary_buffer.push(c),
        }
    }

    /// [HTML § 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    fn handle_bogus_comment_state(&mut self) {
        match self.current_input_character {
            // "Switch to the data state. Emit the current comment token."
            Some('>') => {
                let data = std::mem::take(&mut self.temporary_buffer);
                self.emit(Token::Comment { data }, self.markup_start);
                self.switch_to(TokenizerState::Data);
            }
            None => self.unterminated("markup declaration"),
            Some(c) => self.temporary_buffer.push(c),
        }
    }

    /// Skip a malformed tag. `>` ends it and the tag is emitted with what it
    /// has; `<` ends it too and is reconsumed as the start of new markup.
    fn handle_resync_tag_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_tag();
            }
            Some('<') => {
                self.reconsume_in(TokenizerState::Data);
                self.emit_tag();
            }
            None => self.unterminated("tag"),
            Some(_) => {}
        }
    }

    /// Start tag emission also picks the state for the element's content.
    pub(super) fn emit_tag(&mut self) {
        self.current_attribute = None;
        let Some(token) = self.current_token.take() else {
            return;
        };
        match &token {
            Token::StartTag {
                name,
                self_closing: false,
                ..
            } if self.flavor == Flavor::Html => {
                if html_elements::is_raw_text(name) {
                    self.raw_text_end = Some(name.to_ascii_lowercase());
                    self.switch_to(TokenizerState::RawText);
                } else if html_elements::is_escapable_raw_text(name) {
                    self.raw_text_end = Some(name.to_ascii_lowercase());
                    self.switch_to(TokenizerState::EscapableRawText);
                }
            }
            _ => {}
        }
        self.emit(token, self.markup_start);
    }

    /// Report an unterminated construct and stop: nothing after it can be
    /// told apart from its content.
    fn unterminated(&mut self, what: &str) {
        self.diagnostics.push(Diagnostic::fatal(
            ErrorKind::Tokenization,
            self.markup_start,
            format!("unterminated {what} at end of input"),
        ));
        self.current_token = None;
        self.current_attribute = None;
        self.temporary_buffer.clear();
        self.emit_end_of_input();
    }

    /// Report a character that cannot appear here and skip the rest of the tag.
    fn invalid_in_tag(&mut self, c: char, context: &str) {
        self.warn(
            self.char_position,
            format!("invalid character {c:?} in {context}"),
        );
        self.current_attribute = None;
        self.reconsume_in(TokenizerState::ResyncTag);
    }
}

impl Iterator for MarkupTokenizer {
    type Item = SourceToken;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

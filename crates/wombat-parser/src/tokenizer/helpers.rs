//! Helper functions for the markup tokenizer.
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("Switch to", "Reconsume in")
//! - Input/character handling ("Consume the next input character")
//! - Token emission ("Emit the current token")
//! - Attribute helpers for duplicate detection
//! - Diagnostics

use wombat_common::Flavor;

use super::machine::{MarkupTokenizer, TokenizerState};
use super::token::{Position, SourceToken, Token};
use crate::error::{Diagnostic, ErrorKind};

// =============================================================================
// State Transition Helpers
// =============================================================================

impl MarkupTokenizer {
    /// "Switch to the X state"
    ///
    /// Transitions to a new state. The next character will be consumed on the
    /// next iteration of the main loop.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// "Reconsume in the X state"
    ///
    /// Transitions to a new state without consuming the current character.
    /// The same character will be processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl MarkupTokenizer {
    /// "Consume the next input character"
    ///
    /// Returns the character at the current position and advances the
    /// position and the line/column counters. Returns None at end of input.
    pub(super) fn consume(&mut self) -> Option<char> {
        let c = self.input[self.current_pos..].chars().next()?;
        self.current_pos += c.len_utf8();
        self.char_position = self.next_position;
        self.next_position = self.next_position.advance(c);
        Some(c)
    }

    /// "If the next few characters are..."
    ///
    /// Check if the next few characters match the target string exactly.
    #[must_use]
    pub fn next_few_characters_are(&self, target: &str) -> bool {
        self.input[self.current_pos..].starts_with(target)
    }

    /// "ASCII case-insensitive match for the word 'DOCTYPE'"
    ///
    /// Check if the next few characters match the target string using
    /// ASCII case-insensitive comparison.
    #[must_use]
    pub fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        self.input[self.current_pos..]
            .get(..target.len())
            .is_some_and(|ahead| ahead.eq_ignore_ascii_case(target))
    }

    /// Consume the given string from the input.
    /// Caller must have already verified the characters are present.
    pub(super) fn consume_string(&mut self, target: &str) {
        for _ in target.chars() {
            let _ = self.consume();
        }
    }

    /// "ASCII whitespace is U+0009 TAB, U+000A LF, U+000C FF, U+000D CR,
    /// or U+0020 SPACE." CR never reaches the state machine.
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C')
    }

    /// Characters that may appear in tag and attribute names.
    ///
    /// This is looser than the XML `Name` production: anything that is not
    /// whitespace, a control character, or a markup delimiter.
    pub(super) fn is_name_char(c: char) -> bool {
        !Self::is_whitespace_char(c)
            && !c.is_control()
            && !matches!(c, '<' | '>' | '/' | '=' | '"' | '\'' | '&' | '`')
    }

    /// Characters that may start a tag name.
    pub(super) fn is_name_start_char(c: char) -> bool {
        Self::is_name_char(c) && !c.is_ascii_digit() && !matches!(c, '-' | '.' | '!' | '?')
    }

    /// Whether `</name` for the open raw text element comes next, followed
    /// by whitespace, `/`, `>` or end of input.
    pub(super) fn appropriate_end_tag_follows(&self) -> bool {
        let Some(name) = self.raw_text_end.as_deref() else {
            return false;
        };
        let rest = &self.input[self.current_pos..];
        let Some(after_slash) = rest.strip_prefix('/') else {
            return false;
        };
        let matches_name = after_slash
            .get(..name.len())
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name));
        matches_name
            && after_slash[name.len()..]
                .chars()
                .next()
                .is_none_or(|c| Self::is_whitespace_char(c) || c == '/' || c == '>')
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl MarkupTokenizer {
    /// Adds a token starting at `position` to the output stream.
    pub(super) fn emit(&mut self, token: Token, position: Position) {
        self.token_stream.push_back(SourceToken { token, position });
    }

    /// Append a character to the pending text run.
    pub(super) fn append_text(&mut self, c: char) {
        if self.text_buffer.is_empty() {
            self.text_start = self.char_position;
        }
        self.text_buffer.push(c);
    }

    /// Emit the pending text run, if any.
    pub(super) fn flush_text(&mut self, escapable: bool) {
        if self.text_buffer.is_empty() {
            return;
        }
        let data = std::mem::take(&mut self.text_buffer);
        self.emit(Token::Text { data, escapable }, self.text_start);
    }

    /// "Emit an end-of-file token."
    pub(super) fn emit_end_of_input(&mut self) {
        self.emit(Token::EndOfInput, self.next_position);
        self.at_eof = true;
    }
}

// =============================================================================
// Attribute Helpers
// =============================================================================

impl MarkupTokenizer {
    /// "When the user agent leaves the attribute name state... if there is
    /// already an attribute on the token with the exact same name, then this
    /// is a duplicate-attribute parse error and the new attribute must be
    /// removed from the token."
    pub(super) fn finish_attribute(&mut self) {
        let Some(attribute) = self.current_attribute.take() else {
            return;
        };
        if attribute.name.is_empty() {
            return;
        }

        let is_duplicate = self
            .current_token
            .as_ref()
            .is_some_and(|token| token.has_attribute(&attribute.name));

        if is_duplicate {
            self.warn(
                self.markup_start,
                format!("duplicate attribute {:?} dropped", attribute.name),
            );
        } else if let Some(ref mut token) = self.current_token {
            token.push_attribute(attribute);
        }
    }

    /// An attribute written without `=`. HTML gives it the empty value; XML
    /// requires a value, so it is reported and takes its own name.
    pub(super) fn finish_valueless_attribute(&mut self) {
        let xml = self.flavor == Flavor::Xml;
        let name = match self.current_attribute {
            Some(ref mut attr) if xml => {
                attr.value.clone_from(&attr.name);
                attr.name.clone()
            }
            _ => {
                self.finish_attribute();
                return;
            }
        };
        self.warn(
            self.char_position,
            format!("attribute {name:?} has no value"),
        );
        self.finish_attribute();
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl MarkupTokenizer {
    /// Queue a recoverable tokenization diagnostic.
    pub(super) fn warn(&mut self, position: Position, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(
            ErrorKind::Tokenization,
            position,
            message,
        ));
    }
}

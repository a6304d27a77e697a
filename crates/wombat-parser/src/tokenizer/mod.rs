//! Markup tokenizer module.
//!
//! Turns markup text into a lazy stream of positioned structural events.
//! The state machine follows the shape of
//! [HTML § 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization),
//! reduced to what well-formed-ish XML and HTML need.

/// Helper methods for tokenizer state transitions.
pub mod helpers;
/// Tokenizer state machine implementation.
pub mod machine;
/// Token types produced by the tokenizer.
pub mod token;

pub use machine::{MarkupTokenizer, TokenizerState};
pub use token::{Attribute, Position, SourceToken, Token};

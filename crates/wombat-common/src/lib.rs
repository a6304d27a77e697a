//! Common utilities for the Wombat markup parser.
//!
//! This crate provides shared infrastructure used by all parser components:
//! - **Conventions** - namespace URIs, MIME types, and document flavors
//! - **Entity Tables** - named/numeric character reference decoding and encoding
//! - **Warning System** - colored terminal output for diagnostics

pub mod conventions;
pub mod entities;
pub mod warning;

pub use conventions::{Flavor, MimeType, html_elements, namespace};
pub use entities::{EntityIssue, EntityTable};

//! Namespace resolution.
//!
//! [Namespaces in XML 1.0 § 6.1 Namespace Scoping](https://www.w3.org/TR/xml-names/#scoping)
//!
//! "The scope of a namespace declaration declaring a prefix extends from the
//! beginning of the start-tag in which it appears to the end of the
//! corresponding end-tag, excluding the scope of any inner declarations with
//! the same `NSAttName` part."
//!
//! Bindings live on one stack tagged with the depth of the element that
//! declared them; closing an element drops its bindings.

use wombat_common::namespace;

/// A prefix binding; the empty prefix is the default namespace.
#[derive(Debug, Clone)]
struct Binding {
    prefix: String,
    /// `None` undeclares (`xmlns=""`).
    uri: Option<String>,
    depth: usize,
}

/// Stack-based namespace scope tracker.
#[derive(Debug, Clone)]
pub struct NamespaceScopes {
    bindings: Vec<Binding>,
    depth: usize,
}

impl NamespaceScopes {
    /// Create a resolver with `xml` and `xmlns` pre-bound.
    ///
    /// "The prefix xml is by definition bound to the namespace name
    /// `http://www.w3.org/XML/1998/namespace`." "The prefix xmlns is used only
    /// to declare namespace bindings and is by definition bound to the
    /// namespace name `http://www.w3.org/2000/xmlns/`."
    #[must_use]
    pub fn new() -> Self {
        Self {
            bindings: vec![
                Binding {
                    prefix: "xml".to_string(),
                    uri: Some(namespace::XML.to_string()),
                    depth: 0,
                },
                Binding {
                    prefix: "xmlns".to_string(),
                    uri: Some(namespace::XMLNS.to_string()),
                    depth: 0,
                },
            ],
            depth: 0,
        }
    }

    /// Enter a new element scope.
    pub const fn push_scope(&mut self) {
        self.depth += 1;
    }

    /// Leave an element scope, removing any bindings declared in it.
    pub fn pop_scope(&mut self) {
        while self
            .bindings
            .last()
            .is_some_and(|binding| binding.depth >= self.depth && binding.depth > 0)
        {
            let _ = self.bindings.pop();
        }
        self.depth = self.depth.saturating_sub(1);
    }

    /// Current element depth (0 = document level).
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Whether `prefix` is one of the reserved `xml`/`xmlns` prefixes.
    #[must_use]
    pub fn is_reserved(prefix: &str) -> bool {
        prefix == "xml" || prefix == "xmlns"
    }

    /// Declare a binding in the current scope.
    ///
    /// Returns false, declaring nothing, when the binding would rebind a
    /// reserved prefix to a different URI.
    pub fn declare(&mut self, prefix: &str, uri: Option<&str>) -> bool {
        if Self::is_reserved(prefix) {
            return self.resolve(prefix).flatten() == uri;
        }
        self.bindings.push(Binding {
            prefix: prefix.to_string(),
            uri: uri.map(str::to_string),
            depth: self.depth,
        });
        true
    }

    /// Resolve a prefix.
    ///
    /// `None` means the prefix is not bound at all; `Some(None)` means it
    /// was bound and then undeclared.
    #[must_use]
    pub fn resolve(&self, prefix: &str) -> Option<Option<&str>> {
        self.bindings
            .iter()
            .rev()
            .find(|binding| binding.prefix == prefix)
            .map(|binding| binding.uri.as_deref())
    }

    /// Resolve the default namespace. Unbound means no namespace.
    #[must_use]
    pub fn resolve_default(&self) -> Option<&str> {
        self.resolve("").flatten()
    }
}

impl Default for NamespaceScopes {
    fn default() -> Self {
        Self::new()
    }
}

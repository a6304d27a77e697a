//! Parser warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same diagnostic multiple
//! times. Used by the tokenizer and tree builder console reporter.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of messages we've already printed (to deduplicate)
static REPORTED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Records `key` and returns true the first time it is seen.
fn first_sighting(key: String) -> bool {
    REPORTED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key)
}

/// Warn about recoverable malformed input (prints once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("Tokenizer", "attribute \"checked\" has no value at 3:10");
/// ```
pub fn warn_once(component: &str, message: &str) {
    if first_sighting(format!("[{component}] {message}")) {
        eprintln!("{}", format!("[Wombat {component}] ⚠ {message}").yellow());
    }
}

/// Report a fatal construct error (prints once per unique message)
pub fn error_once(component: &str, message: &str) {
    if first_sighting(format!("[{component}] {message}")) {
        eprintln!("{}", format!("[Wombat {component}] ✖ {message}").red());
    }
}

/// Whether `message` from `component` has been printed since the last
/// [`clear_warnings`].
#[must_use]
pub fn has_reported(component: &str, message: &str) -> bool {
    REPORTED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.contains(&format!("[{component}] {message}")))
}

/// Clear all recorded messages (call before parsing an unrelated document)
pub fn clear_warnings() {
    let mut guard = REPORTED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test: the set is process-wide and `clear_warnings` would race.
    #[test]
    fn test_deduplication_and_keys() {
        let key = "[Test] dedup check".to_string();
        clear_warnings();
        assert!(first_sighting(key.clone()));
        assert!(!first_sighting(key));

        warn_once("Test", "seen once");
        assert!(has_reported("Test", "seen once"));
        assert!(!has_reported("Other", "seen once"));

        clear_warnings();
        assert!(!has_reported("Test", "seen once"));
    }
}

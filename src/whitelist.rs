//! Prefix-based URL admission policy.
//!
//! Decides which top-level browser windows are eligible for capture by
//! comparing their URL against an allow-list of literal prefixes.

/// URL allow-list used to admit or reject root documents.
///
/// An empty whitelist is the match-everything value. Matching is an exact
/// byte-for-byte prefix comparison: no case folding, no scheme or host
/// parsing, and a malformed URL is compared as opaque text. The list is
/// immutable for the duration of one capture.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    prefixes: Vec<String>,
}

impl Whitelist {
    pub fn new(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Whether `url` is admitted by this whitelist.
    pub fn matches(&self, url: &str) -> bool {
        self.prefixes.is_empty() || self.matched_rule(url).is_some()
    }

    /// The first entry that is a literal prefix of `url`, if any.
    ///
    /// Entry order never affects [`matches`](Self::matches); this exists for
    /// debug logging of which rule admitted a window.
    pub fn matched_rule(&self, url: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|p| url.as_bytes().starts_with(p.as_bytes()))
            .map(|p| p.as_str())
    }
}

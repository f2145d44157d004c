//! Ordered request header collections.
//!
//! [`HeaderSet`] keeps headers in insertion order and compares names
//! case-insensitively, matching HTTP semantics. Default headers are merged
//! into per-call headers with [`HeaderSet::merge`]; the per-call value always
//! wins.

/// A single request header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    /// The header name.
    pub name: String,
    /// The header value.
    pub value: String,
}

impl Header {
    /// Creates a header from a name and value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An ordered collection of request headers.
///
/// # Example
///
/// ```rust
/// use httpshopify::HeaderSet;
///
/// let defaults = HeaderSet::from_pairs([
///     ("X-Shopify-Access-Token", "shpat_123"),
///     ("Content-Type", "application/json"),
/// ]);
/// let overrides = HeaderSet::from_pairs([("content-type", "text/plain")]);
///
/// let merged = HeaderSet::merge(&defaults, &overrides);
/// assert_eq!(merged.get("Content-Type"), Some("text/plain"));
/// assert_eq!(merged.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderSet {
    headers: Vec<Header>,
}

impl HeaderSet {
    /// Creates an empty header set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            headers: Vec::new(),
        }
    }

    /// Builds a header set from `(name, value)` pairs, keeping their order.
    #[must_use]
    pub fn from_pairs<I, N, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            headers: pairs
                .into_iter()
                .map(|(name, value)| Header::new(name, value))
                .collect(),
        }
    }

    /// Appends a header without checking for an existing name.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push(Header::new(name, value));
    }

    /// Sets a header, replacing the value of an existing header with the same
    /// name (case-insensitive) in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|header| header.name.eq_ignore_ascii_case(&name))
        {
            Some(existing) => existing.value = value,
            None => self.headers.push(Header { name, value }),
        }
    }

    /// Returns `true` if a header with this name is present (case-insensitive).
    #[must_use]
    pub fn includes(&self, name: &str) -> bool {
        self.headers
            .iter()
            .any(|header| header.name.eq_ignore_ascii_case(name))
    }

    /// Returns the value of the first header with this name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.as_str())
    }

    /// Merges `defaults` into `overrides`.
    ///
    /// The result holds the override headers in their original order,
    /// followed by each default whose name is not already present, in default
    /// order. A name repeated within either set keeps only its first value,
    /// the one [`get`](Self::get) returns.
    #[must_use]
    pub fn merge(defaults: &Self, overrides: &Self) -> Self {
        let mut merged = Self::new();
        for header in overrides.headers.iter().chain(&defaults.headers) {
            if !merged.includes(&header.name) {
                merged.headers.push(header.clone());
            }
        }
        merged
    }

    /// Returns the number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns `true` if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Iterates over the headers in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Header> {
        self.headers.iter()
    }
}

impl<'a> IntoIterator for &'a HeaderSet {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.headers.iter()
    }
}

impl FromIterator<Header> for HeaderSet {
    fn from_iter<T: IntoIterator<Item = Header>>(iter: T) -> Self {
        Self {
            headers: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> HeaderSet {
        HeaderSet::from_pairs([
            ("X-Shopify-Access-Token", "token"),
            ("Content-Type", "application/json"),
            ("Accept", "application/json"),
        ])
    }

    fn names(set: &HeaderSet) -> Vec<&str> {
        set.iter().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn test_includes_is_case_insensitive() {
        let set = defaults();
        assert!(set.includes("content-type"));
        assert!(set.includes("CONTENT-TYPE"));
        assert!(set.includes("x-shopify-access-token"));
        assert!(!set.includes("Authorization"));
    }

    #[test]
    fn test_merge_into_empty_overrides_keeps_default_order() {
        let merged = HeaderSet::merge(&defaults(), &HeaderSet::new());
        assert_eq!(merged, defaults());
    }

    #[test]
    fn test_merge_overrides_first_then_missing_defaults() {
        let overrides = HeaderSet::from_pairs([("X-Request-Tag", "a"), ("accept", "text/csv")]);
        let merged = HeaderSet::merge(&defaults(), &overrides);

        assert_eq!(
            names(&merged),
            vec![
                "X-Request-Tag",
                "accept",
                "X-Shopify-Access-Token",
                "Content-Type"
            ]
        );
        assert_eq!(merged.get("Accept"), Some("text/csv"));
    }

    #[test]
    fn test_override_precedence_for_every_shared_name() {
        let overrides = HeaderSet::from_pairs([
            ("x-shopify-access-token", "other-token"),
            ("CONTENT-TYPE", "application/graphql"),
        ]);
        let merged = HeaderSet::merge(&defaults(), &overrides);

        for header in &overrides {
            assert_eq!(merged.get(&header.name), Some(header.value.as_str()));
        }
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_merge_twice_is_idempotent() {
        let overrides = HeaderSet::from_pairs([("Accept", "text/plain")]);
        let once = HeaderSet::merge(&defaults(), &overrides);
        let twice = HeaderSet::merge(&defaults(), &once);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_merged_set_has_no_duplicate_names() {
        let overrides = HeaderSet::from_pairs([("content-type", "a"), ("X-Extra", "b")]);
        let merged = HeaderSet::merge(&defaults(), &overrides);

        let mut lowered: Vec<String> = merged.iter().map(|h| h.name.to_lowercase()).collect();
        let total = lowered.len();
        lowered.sort();
        lowered.dedup();
        assert_eq!(lowered.len(), total);
    }

    #[test]
    fn test_merge_keeps_first_of_repeated_names() {
        let mut overrides = HeaderSet::new();
        overrides.push("X-Request-Tag", "first");
        overrides.push("x-request-tag", "second");
        let mut defaults = defaults();
        defaults.push("accept", "text/csv");

        let merged = HeaderSet::merge(&defaults, &overrides);

        assert_eq!(merged.len(), 4);
        assert_eq!(merged.get("X-Request-Tag"), Some("first"));
        assert_eq!(merged.get("Accept"), Some("application/json"));
        assert_eq!(merged.get("X-Request-Tag"), overrides.get("X-Request-Tag"));
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut set = defaults();
        set.set("content-type", "text/plain");
        assert_eq!(set.len(), 3);
        assert_eq!(names(&set)[1], "Content-Type");
        assert_eq!(set.get("Content-Type"), Some("text/plain"));

        set.set("X-New", "1");
        assert_eq!(set.len(), 4);
    }
}

//! Route parameters and query strings.
//!
//! - [`RouteParams`]: values captured from dynamic segments (`:id` in
//!   `/event/:id`) or from positional regex captures mapped onto names.
//! - [`QueryParams`]: the `?key=value&...` part of a location. Keeps
//!   insertion order so list requests such as `/events?page=2&limit=10`
//!   serialize deterministically.
//!
//! # Example
//!
//! ```
//! use spa_navigator::{QueryParams, RouteParams};
//!
//! let params = RouteParams::from_pairs([("id", "42")]);
//! assert_eq!(params.get_as::<u32>("id"), Some(42));
//!
//! let query = QueryParams::from_query_string("page=2&limit=10");
//! assert_eq!(query.get_as::<u32>("page"), Some(2));
//! assert_eq!(query.to_query_string(), "page=2&limit=10");
//! ```

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashMap;

/// Characters left untouched when encoding a query component
/// (the unreserved set of RFC 3986).
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Parameters captured while matching a path against a route pattern.
///
/// ```
/// use spa_navigator::RouteParams;
///
/// let mut params = RouteParams::new();
/// params.insert("id", "abc-123");
/// assert_eq!(params.get("id"), Some("abc-123"));
/// assert!(params.get_as::<u32>("id").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    params: HashMap<String, String>,
}

impl RouteParams {
    /// Create empty route parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build parameters from `(name, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a parameter value by name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Get a parameter and parse it.
    ///
    /// Returns `None` if the parameter is missing or does not parse.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.params.get(key)?.parse().ok()
    }

    /// Insert or overwrite a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Return `true` if the given name is present.
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Iterate over all `(name, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }
}

/// Query parameters parsed from a location's query string.
///
/// Multiple values per key are kept (`?tag=music&tag=art`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Create empty query parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string without the leading `?`.
    ///
    /// Keys without `=` get an empty value. `+` decodes to a space.
    pub fn from_query_string(query: &str) -> Self {
        let pairs = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(key), decode_component(value))
            })
            .collect();
        Self { pairs }
    }

    /// Get the first value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get every value for a key, in order of appearance.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Get the first value for a key, parsed as `T`.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.get(key)?.parse().ok()
    }

    /// Append a value for the given key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.pairs.push((key.into(), value.to_string()));
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Serialize back into a query string (no leading `?`).
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(key, QUERY_COMPONENT),
                    utf8_percent_encode(value, QUERY_COMPONENT)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of `key=value` pairs, counting repeated keys.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

fn decode_component(s: &str) -> String {
    let spaced = s.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_params_basic() {
        let mut params = RouteParams::new();
        params.insert("id", "123");

        assert_eq!(params.get("id"), Some("123"));
        assert!(params.contains("id"));
        assert!(!params.contains("missing"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_route_params_get_as() {
        let params = RouteParams::from_pairs([("id", "123"), ("active", "true")]);

        assert_eq!(params.get_as::<i32>("id"), Some(123));
        assert_eq!(params.get_as::<bool>("active"), Some(true));
        assert_eq!(params.get_as::<i32>("missing"), None);
    }

    #[test]
    fn test_route_params_overwrite() {
        let mut params = RouteParams::from_pairs([("tab", "tickets")]);
        params.insert("tab", "media");
        assert_eq!(params.get("tab"), Some("media"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_query_params_basic() {
        let query = QueryParams::from_query_string("page=1&limit=10&sort=date");

        assert_eq!(query.get("page"), Some("1"));
        assert_eq!(query.get_as::<usize>("limit"), Some(10));
        assert_eq!(query.get("sort"), Some("date"));
        assert_eq!(query.get("missing"), None);
    }

    #[test]
    fn test_query_params_multiple_values() {
        let query = QueryParams::from_query_string("tag=music&tag=art&tag=food");

        assert_eq!(query.get_all("tag"), vec!["music", "art", "food"]);
        assert_eq!(query.get("tag"), Some("music"));
        assert_eq!(query.len(), 3);
    }

    #[test]
    fn test_query_params_decoding() {
        let query = QueryParams::from_query_string("q=live%20music&city=New+York&flag");

        assert_eq!(query.get("q"), Some("live music"));
        assert_eq!(query.get("city"), Some("New York"));
        assert_eq!(query.get("flag"), Some(""));
    }

    #[test]
    fn test_query_string_keeps_insertion_order() {
        let query = QueryParams::new().with("page", 2).with("limit", 10);
        assert_eq!(query.to_query_string(), "page=2&limit=10");
    }

    #[test]
    fn test_query_string_encoding() {
        let query = QueryParams::new().with("q", "jazz & blues");
        assert_eq!(query.to_query_string(), "q=jazz%20%26%20blues");
    }

    #[test]
    fn test_empty_query_string() {
        assert!(QueryParams::from_query_string("").is_empty());
    }
}

//! Locations and path normalization.
//!
//! A [`Location`] is the router's view of a URL: a normalized path, its query
//! parameters and an optional fragment. Event pages keep the active tab in
//! the fragment (`/event/42#tickets`), so the fragment travels with every
//! location the router hands to a loader.
//!
//! # Normalization rules
//!
//! 1. Empty paths become `"/"`.
//! 2. A leading slash is ensured (`"events"` → `"/events"`).
//! 3. Trailing slashes are removed except for the root.
//! 4. Repeated slashes collapse (`"//event///42"` → `"/event/42"`).

use crate::params::QueryParams;
use std::borrow::Cow;
use std::fmt;

/// Normalize a path for matching and comparison.
///
/// Returns `Cow::Borrowed` when the path is already normalized.
///
/// ```
/// use spa_navigator::normalize_path;
///
/// assert_eq!(normalize_path("/events"), "/events");
/// assert_eq!(normalize_path("events/"), "/events");
/// assert_eq!(normalize_path("//event///42"), "/event/42");
/// assert_eq!(normalize_path(""), "/");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if path.is_empty() {
        return Cow::Borrowed("/");
    }
    if path == "/" {
        return Cow::Borrowed(path);
    }

    let already = path.starts_with('/') && !path.ends_with('/') && !path.contains("//");
    if already {
        return Cow::Borrowed(path);
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Owned(format!("/{}", segments.join("/")))
    }
}

/// Split a normalized path into its non-empty segments.
pub(crate) fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// A parsed navigation target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: QueryParams,
    fragment: Option<String>,
}

impl Location {
    /// Parse an href of the form `path[?query][#fragment]`.
    ///
    /// ```
    /// use spa_navigator::Location;
    ///
    /// let location = Location::parse("/event/42/?ref=feed#tickets");
    /// assert_eq!(location.path(), "/event/42");
    /// assert_eq!(location.query().get("ref"), Some("feed"));
    /// assert_eq!(location.fragment(), Some("tickets"));
    /// assert_eq!(location.to_string(), "/event/42?ref=feed#tickets");
    /// ```
    pub fn parse(href: &str) -> Self {
        let (rest, fragment) = match href.split_once('#') {
            Some((rest, frag)) if !frag.is_empty() => (rest, Some(frag.to_string())),
            Some((rest, _)) => (rest, None),
            None => (href, None),
        };
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

        Self {
            path: normalize_path(path).into_owned(),
            query: QueryParams::from_query_string(query),
            fragment,
        }
    }

    /// The normalized path.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Fragment without the leading `#`.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Same location with a different fragment.
    #[must_use]
    pub fn with_fragment(mut self, fragment: Option<impl Into<String>>) -> Self {
        self.fragment = fragment.map(Into::into).filter(|f: &String| !f.is_empty());
        self
    }

    /// Same location with the given query.
    #[must_use]
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Path plus query, without the fragment.
    ///
    /// Two locations with the same document address point at the same view;
    /// the router uses this to avoid pushing duplicate history entries.
    pub fn document_address(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query.to_query_string())
        }
    }

    /// Return `true` if both locations address the same document.
    pub fn same_document(&self, other: &Location) -> bool {
        self.path == other.path && self.query == other.query
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.document_address())?;
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

impl From<&str> for Location {
    fn from(href: &str) -> Self {
        Self::parse(href)
    }
}

impl From<String> for Location {
    fn from(href: String) -> Self {
        Self::parse(&href)
    }
}

//! Route patterns and segment matching.
//!
//! A route pattern is one of three shapes:
//!
//! - **Static**: an exact path such as `/events`. Looked up in a hash map.
//! - **Template**: `:name` placeholders such as `/event/:id`. Each
//!   placeholder captures one non-empty segment made of ASCII letters,
//!   digits, `_` or `-`.
//! - **Regex**: an anchored regular expression whose positional captures are
//!   mapped, in order, onto a list of parameter names. This is the escape hatch
//!   for shapes a template cannot express.
//!
//! Templates can be compared with each other ([`Template::overlap`]) so the
//! route table can reject unreachable routes and report order-sensitive
//! overlaps at startup.

use crate::error::RouteTableError;
use crate::location::{normalize_path, segments};
use crate::params::RouteParams;
use regex::Regex;
use std::fmt;

/// One segment of a [`Template`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the path segment exactly.
    Literal(String),
    /// Captures the path segment under this name.
    Param(String),
}

/// Relationship between two templates, from the earlier one's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// No path matches both.
    Disjoint,
    /// Some paths match both; the earlier registration wins for those.
    Partial,
    /// Every path the later template accepts is taken by the earlier one.
    Covers,
}

/// A parsed `:name` template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    fn parse(source: &str) -> Result<Self, RouteTableError> {
        let mut names: Vec<&str> = Vec::new();
        let mut parsed = Vec::new();

        for seg in segments(source) {
            if let Some(name) = seg.strip_prefix(':') {
                if name.is_empty() || !name.chars().all(is_param_char) {
                    return Err(RouteTableError::InvalidPattern {
                        pattern: source.to_string(),
                        message: format!("invalid parameter name '{seg}'"),
                    });
                }
                if names.contains(&name) {
                    return Err(RouteTableError::InvalidPattern {
                        pattern: source.to_string(),
                        message: format!("parameter '{name}' appears twice"),
                    });
                }
                names.push(name);
                parsed.push(Segment::Param(name.to_string()));
            } else {
                parsed.push(Segment::Literal(seg.to_string()));
            }
        }

        Ok(Self {
            source: source.to_string(),
            segments: parsed,
        })
    }

    /// The normalized template text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parameter names in declaration order.
    pub fn param_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Match a normalized path, returning the captured parameters.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let mut params = RouteParams::new();
        let mut path_segments = segments(path);

        for segment in &self.segments {
            let value = path_segments.next()?;
            match segment {
                Segment::Literal(lit) if lit == value => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    if !value.chars().all(is_param_char) {
                        return None;
                    }
                    params.insert(name.clone(), value);
                }
            }
        }

        if path_segments.next().is_some() {
            return None;
        }
        Some(params)
    }

    /// Compare this (earlier) template with a later one.
    ///
    /// ```
    /// use spa_navigator::{Overlap, RoutePattern};
    ///
    /// let template = |p: &str| match RoutePattern::parse(p) {
    ///     Ok(RoutePattern::Template(t)) => t,
    ///     _ => unreachable!(),
    /// };
    ///
    /// let user = template("/user/:name");
    /// assert_eq!(user.overlap(&template("/event/:id")), Overlap::Disjoint);
    /// assert_eq!(user.overlap(&template("/user/:id")), Overlap::Covers);
    /// assert_eq!(user.overlap(&template("/:section/settings")), Overlap::Partial);
    /// ```
    pub fn overlap(&self, later: &Template) -> Overlap {
        if self.segments.len() != later.segments.len() {
            return Overlap::Disjoint;
        }

        let mut covers = true;
        for (earlier, later) in self.segments.iter().zip(&later.segments) {
            match (earlier, later) {
                (Segment::Literal(a), Segment::Literal(b)) if a != b => return Overlap::Disjoint,
                (Segment::Literal(_), Segment::Param(_)) => covers = false,
                _ => {}
            }
        }

        if covers {
            Overlap::Covers
        } else {
            Overlap::Partial
        }
    }

    /// Substitute parameters back into the template.
    ///
    /// Returns `None` if a parameter is missing.
    pub fn fill(&self, params: &RouteParams) -> Option<String> {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            match segment {
                Segment::Literal(lit) => out.push_str(lit),
                Segment::Param(name) => out.push_str(params.get(name)?),
            }
        }
        if out.is_empty() {
            out.push('/');
        }
        Some(out)
    }
}

/// An anchored regex with named positional captures.
#[derive(Debug, Clone)]
pub struct RegexPattern {
    regex: Regex,
    names: Vec<String>,
}

impl RegexPattern {
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn param_names(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let captures = self.regex.captures(path)?;
        let mut params = RouteParams::new();
        for (i, name) in self.names.iter().enumerate() {
            if let Some(value) = captures.get(i + 1) {
                params.insert(name.clone(), value.as_str());
            }
        }
        Some(params)
    }
}

impl PartialEq for RegexPattern {
    fn eq(&self, other: &Self) -> bool {
        self.regex.as_str() == other.regex.as_str() && self.names == other.names
    }
}

/// The shape of a registered route.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutePattern {
    Static(String),
    Template(Template),
    Regex(RegexPattern),
}

impl RoutePattern {
    /// Parse a path pattern. Paths containing `:name` segments become
    /// templates, everything else is static.
    ///
    /// ```
    /// use spa_navigator::RoutePattern;
    ///
    /// assert!(matches!(RoutePattern::parse("/events"), Ok(RoutePattern::Static(_))));
    /// assert!(matches!(RoutePattern::parse("/event/:id"), Ok(RoutePattern::Template(_))));
    /// assert!(RoutePattern::parse("/event/:").is_err());
    /// ```
    pub fn parse(pattern: &str) -> Result<Self, RouteTableError> {
        let normalized = normalize_path(pattern);
        if segments(&normalized).any(|s| s.starts_with(':')) {
            Template::parse(&normalized).map(RoutePattern::Template)
        } else {
            Ok(RoutePattern::Static(normalized.into_owned()))
        }
    }

    /// Compile a regex pattern. Anchors are added when missing; the number of
    /// capture groups must equal the number of names.
    pub fn regex<S: Into<String>>(
        pattern: &str,
        names: impl IntoIterator<Item = S>,
    ) -> Result<Self, RouteTableError> {
        let anchored = match (pattern.starts_with('^'), pattern.ends_with('$')) {
            (true, true) => pattern.to_string(),
            _ => format!(
                "^(?:{})$",
                pattern.trim_start_matches('^').trim_end_matches('$')
            ),
        };
        let regex = Regex::new(&anchored).map_err(|e| RouteTableError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let groups = regex.captures_len() - 1;
        if groups != names.len() {
            return Err(RouteTableError::InvalidPattern {
                pattern: pattern.to_string(),
                message: format!(
                    "{groups} capture group(s) but {} parameter name(s)",
                    names.len()
                ),
            });
        }

        Ok(RoutePattern::Regex(RegexPattern { regex, names }))
    }

    pub fn is_static(&self) -> bool {
        matches!(self, RoutePattern::Static(_))
    }

    /// Match a normalized path.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        match self {
            RoutePattern::Static(p) => (p == path).then(RouteParams::new),
            RoutePattern::Template(t) => t.matches(path),
            RoutePattern::Regex(r) => r.matches(path),
        }
    }

    /// Parameter names in capture order.
    pub fn param_names(&self) -> Vec<&str> {
        match self {
            RoutePattern::Static(_) => Vec::new(),
            RoutePattern::Template(t) => t.param_names(),
            RoutePattern::Regex(r) => r.param_names(),
        }
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutePattern::Static(p) => f.write_str(p),
            RoutePattern::Template(t) => f.write_str(&t.source),
            RoutePattern::Regex(r) => f.write_str(r.as_str()),
        }
    }
}

fn is_param_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(pattern: &str) -> Template {
        match RoutePattern::parse(pattern) {
            Ok(RoutePattern::Template(t)) => t,
            other => panic!("expected template, got {other:?}"),
        }
    }

    #[test]
    fn test_static_match() {
        let pattern = RoutePattern::parse("/events/").unwrap();
        assert_eq!(pattern, RoutePattern::Static("/events".into()));
        assert!(pattern.matches("/events").is_some());
        assert!(pattern.matches("/event").is_none());
    }

    #[test]
    fn test_template_param_extraction() {
        let t = template("/event/:id");
        let params = t.matches("/event/abc-123").unwrap();
        assert_eq!(params.get("id"), Some("abc-123"));
    }

    #[test]
    fn test_template_multiple_params() {
        let t = template("/place/:placeId/review/:reviewId");
        let params = t.matches("/place/p1/review/r_9").unwrap();
        assert_eq!(params.get("placeId"), Some("p1"));
        assert_eq!(params.get("reviewId"), Some("r_9"));
        assert_eq!(t.param_names(), vec!["placeId", "reviewId"]);
    }

    #[test]
    fn test_template_rejects_wrong_shape() {
        let t = template("/event/:id");
        assert!(t.matches("/place/42").is_none());
        assert!(t.matches("/event").is_none());
        assert!(t.matches("/event/42/edit").is_none());
        assert!(t.matches("/events").is_none());
    }

    #[test]
    fn test_template_rejects_non_word_segment() {
        let t = template("/event/:id");
        assert!(t.matches("/event/a.b").is_none());
        assert!(t.matches("/event/%20").is_none());
    }

    #[test]
    fn test_invalid_templates() {
        assert!(RoutePattern::parse("/event/:").is_err());
        assert!(RoutePattern::parse("/a/:id/b/:id").is_err());
        assert!(RoutePattern::parse("/a/:i.d").is_err());
    }

    #[test]
    fn test_overlap() {
        let by_id = template("/user/:id");
        let by_name = template("/user/:name");
        let literal_then_param = template("/user/:id/posts");
        let fixed = template("/:section/settings");

        assert_eq!(by_id.overlap(&by_name), Overlap::Covers);
        assert_eq!(by_id.overlap(&literal_then_param), Overlap::Disjoint);
        assert_eq!(by_id.overlap(&fixed), Overlap::Partial);
        assert_eq!(template("/event/:id").overlap(&by_id), Overlap::Disjoint);
    }

    #[test]
    fn test_fill() {
        let t = template("/event/:id");
        let params = RouteParams::from_pairs([("id", "42")]);
        assert_eq!(t.fill(&params).as_deref(), Some("/event/42"));
        assert_eq!(t.fill(&RouteParams::new()), None);
    }

    #[test]
    fn test_regex_pattern() {
        let pattern = RoutePattern::regex(r"/user/([\w-]+)", ["username"]).unwrap();
        let params = pattern.matches("/user/jane-doe").unwrap();
        assert_eq!(params.get("username"), Some("jane-doe"));
        assert!(pattern.matches("/user/jane/extra").is_none());
    }

    #[test]
    fn test_regex_already_anchored() {
        let pattern = RoutePattern::regex(r"^/event/(\d+)$", ["id"]).unwrap();
        assert!(pattern.matches("/event/42").is_some());
        assert!(pattern.matches("/event/x").is_none());
    }

    #[test]
    fn test_regex_capture_count_mismatch() {
        let err = RoutePattern::regex(r"/a/(\d+)/(\d+)", ["x"]).unwrap_err();
        assert!(matches!(err, RouteTableError::InvalidPattern { .. }));
    }

    #[test]
    fn test_regex_invalid() {
        assert!(RoutePattern::regex(r"/a/(", Vec::<String>::new()).is_err());
    }
}

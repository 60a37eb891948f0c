use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::RouteError;

// Parameter names become struct fields and map keys, so keep them identifiers.
static PARAM_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("parameter name regex should be valid")
});

/// One `/`-delimited piece of a route template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Literal segment, matched exactly
    Static(String),
    /// `:name` segment, matches any single non-empty segment
    Param(Arc<str>),
}

impl Segment {
    /// Parameter name, if this is a `:name` segment
    #[must_use]
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Segment::Param(name) => Some(name),
            Segment::Static(_) => None,
        }
    }
}

/// A parsed route path template such as `/users/:id/age/:age`.
///
/// Parsing happens once, when the route is registered. Two templates parsed
/// from the same string compare equal, so the derived parameter set is
/// stable no matter how many times it is recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
    trailing_slash: bool,
}

impl PathTemplate {
    /// Parse a template, extracting its `:name` parameters.
    ///
    /// The scan works on "segment or final remainder": each step either
    /// splits off the next `/`-terminated segment or, when no delimiter is
    /// left, takes the rest as the last segment. A parameter in final
    /// position is therefore handled exactly like one followed by more path.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidTemplate`] when the template does not
    /// start with `/`, contains an empty segment, or has an empty or
    /// non-identifier parameter name, and [`RouteError::DuplicateParam`]
    /// when a name is declared twice.
    pub fn parse(template: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let Some(mut rest) = template.strip_prefix('/') else {
            return Err(invalid("must start with '/'"));
        };

        let mut segments = Vec::new();
        let mut seen = BTreeSet::new();
        let mut trailing_slash = false;

        while !rest.is_empty() {
            let (segment, remainder) = match rest.split_once('/') {
                Some((segment, remainder)) => (segment, Some(remainder)),
                None => (rest, None),
            };

            if segment.is_empty() {
                return Err(invalid("empty path segment"));
            }

            if let Some(name) = segment.strip_prefix(':') {
                if name.is_empty() {
                    return Err(invalid("parameter segment ':' has no name"));
                }
                if !PARAM_NAME_REGEX.is_match(name) {
                    return Err(invalid(&format!(
                        "parameter name '{name}' is not an identifier"
                    )));
                }
                if !seen.insert(name) {
                    return Err(RouteError::DuplicateParam {
                        template: template.to_string(),
                        name: name.to_string(),
                    });
                }
                segments.push(Segment::Param(Arc::from(name)));
            } else {
                segments.push(Segment::Static(segment.to_string()));
            }

            match remainder {
                Some("") => {
                    trailing_slash = true;
                    rest = "";
                }
                Some(remainder) => rest = remainder,
                None => rest = "",
            }
        }

        Ok(Self {
            raw: template.to_string(),
            segments,
            trailing_slash,
        })
    }

    /// The template exactly as declared
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the template was declared with a trailing `/` (root excluded)
    #[must_use]
    pub fn has_trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    /// Parameter names in declaration order
    #[must_use]
    pub fn param_names(&self) -> Vec<&str> {
        self.segments.iter().filter_map(Segment::param_name).collect()
    }

    /// Parameter names as an unordered set
    #[must_use]
    pub fn param_set(&self) -> BTreeSet<&str> {
        self.segments.iter().filter_map(Segment::param_name).collect()
    }

    /// Prefix this template with `prefix` (e.g. a plugin or instance prefix).
    ///
    /// An empty prefix or `/` leaves the template unchanged. Under a prefix,
    /// the root template `/` becomes the prefix itself.
    ///
    /// # Errors
    ///
    /// Fails when the combined template is invalid, for example when the
    /// prefix declares a parameter that the template repeats.
    pub fn join(&self, prefix: &str) -> Result<Self, RouteError> {
        let prefix = prefix.trim_end_matches('/');
        if prefix.is_empty() {
            return Ok(self.clone());
        }
        if self.raw == "/" {
            return Self::parse(prefix);
        }
        Self::parse(&format!("{prefix}{}", self.raw))
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for PathTemplate {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_template() {
        let t = PathTemplate::parse("/").unwrap();
        assert!(t.segments().is_empty());
        assert!(t.param_names().is_empty());
        assert!(!t.has_trailing_slash());
    }

    #[test]
    fn test_final_segment_param() {
        let t = PathTemplate::parse("/items/:id").unwrap();
        assert_eq!(t.param_names(), vec!["id"]);
    }

    #[test]
    fn test_consecutive_params() {
        let t = PathTemplate::parse("/:a/:b").unwrap();
        assert_eq!(t.param_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_trailing_slash_recorded() {
        let t = PathTemplate::parse("/users/:id/").unwrap();
        assert!(t.has_trailing_slash());
        assert_eq!(t.param_names(), vec!["id"]);
    }

    #[test]
    fn test_rejects_missing_leading_slash() {
        let err = PathTemplate::parse("users").unwrap_err();
        assert!(matches!(err, RouteError::InvalidTemplate { .. }));
    }

    #[test]
    fn test_rejects_empty_segment() {
        assert!(PathTemplate::parse("/a//b").is_err());
    }

    #[test]
    fn test_rejects_bad_names() {
        assert!(PathTemplate::parse("/a/:").is_err());
        assert!(PathTemplate::parse("/a/:1x").is_err());
        assert!(PathTemplate::parse("/a/:x-y").is_err());
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let err = PathTemplate::parse("/org/:id/user/:id").unwrap_err();
        assert_eq!(
            err,
            RouteError::DuplicateParam {
                template: "/org/:id/user/:id".to_string(),
                name: "id".to_string()
            }
        );
    }

    #[test]
    fn test_join_prefix() {
        let t = PathTemplate::parse("/users/:id").unwrap();
        assert_eq!(t.join("/api/").unwrap().as_str(), "/api/users/:id");
        assert_eq!(t.join("").unwrap(), t);
        let root = PathTemplate::parse("/").unwrap();
        assert_eq!(root.join("/api").unwrap().as_str(), "/api");
    }

    #[test]
    fn test_join_detects_prefix_collision() {
        let t = PathTemplate::parse("/users/:tenant").unwrap();
        assert!(t.join("/t/:tenant").is_err());
    }
}

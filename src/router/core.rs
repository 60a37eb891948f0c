use std::collections::HashSet;
use std::sync::Arc;

use http::Method;
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use super::radix::RadixTree;
use crate::config::InstanceOptions;
use crate::error::RouteError;
use crate::path::{PathTemplate, Segment};

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Parameter storage for a single match.
///
/// Names are `Arc<str>` shared with the route tree; values are per-request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Everything the host knows about one registered route.
#[derive(Debug, Clone)]
pub struct RouteMeta {
    pub method: Method,
    /// Full template, including any instance or plugin prefix
    pub template: PathTemplate,
    /// Dispatcher key for the route's handler
    pub handler_name: String,
    /// Status codes of a per-status response declaration; empty for a single schema
    pub response_codes: Vec<u16>,
    /// Request parts with an attached JSON Schema document
    pub validated_parts: Vec<&'static str>,
}

/// Result of matching a request path to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<RouteMeta>,
    /// Path parameters in template order
    pub path_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Route table: a radix tree for lookups plus the registration-ordered list.
#[derive(Clone)]
pub struct Router {
    tree: RadixTree,
    routes: Vec<Arc<RouteMeta>>,
    /// Method + normalised shape of every route, for duplicate detection
    shapes: HashSet<(Method, String)>,
    case_sensitive: bool,
    ignore_trailing_slash: bool,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Router {
    #[must_use]
    pub fn new(case_sensitive: bool, ignore_trailing_slash: bool) -> Self {
        Self {
            tree: RadixTree::new(case_sensitive),
            routes: Vec::new(),
            shapes: HashSet::new(),
            case_sensitive,
            ignore_trailing_slash,
        }
    }

    #[must_use]
    pub fn from_options(options: &InstanceOptions) -> Self {
        Self::new(options.case_sensitive, options.ignore_trailing_slash)
    }

    /// Normalised shape of a template: parameter names erased, case folded
    /// when matching is case-insensitive, trailing slash kept only when it
    /// is significant.
    fn shape_key(&self, template: &PathTemplate) -> String {
        let mut key = String::new();
        for segment in template.segments() {
            key.push('/');
            match segment {
                Segment::Param(_) => key.push(':'),
                Segment::Static(lit) if self.case_sensitive => key.push_str(lit),
                Segment::Static(lit) => key.push_str(&lit.to_ascii_lowercase()),
            }
        }
        if template.has_trailing_slash() && !self.ignore_trailing_slash {
            key.push('/');
        }
        key
    }

    /// Whether a route with this method and shape is already registered
    #[must_use]
    pub fn contains(&self, method: &Method, template: &PathTemplate) -> bool {
        self.shapes
            .contains(&(method.clone(), self.shape_key(template)))
    }

    /// Add a route to the table.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Duplicate`] when a route with the same method and
    /// shape exists. `/users/:id` and `/users/:name` have the same shape.
    pub fn insert(&mut self, route: RouteMeta) -> Result<Arc<RouteMeta>, RouteError> {
        let shape = (route.method.clone(), self.shape_key(&route.template));
        if self.shapes.contains(&shape) {
            warn!(
                method = %route.method,
                path = %route.template,
                "Rejected duplicate route"
            );
            return Err(RouteError::Duplicate {
                method: route.method,
                path: route.template.to_string(),
            });
        }

        let trailing = route.template.has_trailing_slash() && !self.ignore_trailing_slash;
        let route = Arc::new(route);
        self.tree.insert(Arc::clone(&route), trailing);
        self.shapes.insert(shape);
        self.routes.push(Arc::clone(&route));

        info!(
            method = %route.method,
            path = %route.template,
            handler_name = %route.handler_name,
            total_routes = self.routes.len(),
            "Route registered"
        );
        Ok(route)
    }

    /// Match a request path (no query string) to a route.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let trailing = !self.ignore_trailing_slash && path.len() > 1 && path.ends_with('/');
        let (route, path_params) = self.tree.search(method, path, trailing)?;
        debug!(
            method = %method,
            path = %path,
            handler_name = %route.handler_name,
            "Route matched"
        );
        Some(RouteMatch { route, path_params })
    }

    /// Registered routes in registration order
    #[must_use]
    pub fn routes(&self) -> &[Arc<RouteMeta>] {
        &self.routes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

//! Radix tree for route matching
//!
//! Paths are split into segments and stored in a tree where:
//! - Each node represents a path segment
//! - Static segments (e.g., `users`) match exactly
//! - Parameter segments (e.g., `:id`) match any single segment
//! - Routes are stored at terminal nodes, keyed by HTTP method
//!
//! Lookup cost is proportional to the path length, not the number of routes.

use http::Method;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use super::core::{ParamVec, RouteMeta};
use crate::path::Segment;

/// Node in the radix tree
#[derive(Clone, Default)]
struct RadixNode {
    /// The path segment this node represents (without leading /)
    segment: Cow<'static, str>,
    /// Routes terminating at this node, per HTTP method and trailing-slash flag
    routes: HashMap<(Method, bool), Arc<RouteMeta>>,
    /// Parameter name if this node is a `:name` segment
    param_name: Option<Arc<str>>,
    children: Vec<RadixNode>,
    /// Parameter children. Several are allowed so that
    /// `/users/:user_id/posts` and `/users/:id/comments` each keep their own name.
    param_children: Vec<RadixNode>,
}

impl RadixNode {
    fn new(segment: Cow<'static, str>) -> Self {
        Self {
            segment,
            ..Self::default()
        }
    }

    fn new_param(param_name: Arc<str>) -> Self {
        Self {
            param_name: Some(param_name),
            ..Self::default()
        }
    }

    fn insert(&mut self, segments: &[Segment], key: (Method, bool), route: Arc<RouteMeta>, case_sensitive: bool) {
        let Some((segment, remaining)) = segments.split_first() else {
            self.routes.insert(key, route);
            return;
        };

        match segment {
            Segment::Param(name) => {
                if let Some(child) = self
                    .param_children
                    .iter_mut()
                    .find(|c| c.param_name.as_deref() == Some(name.as_ref()))
                {
                    child.insert(remaining, key, route, case_sensitive);
                    return;
                }
                let mut child = RadixNode::new_param(Arc::clone(name));
                child.insert(remaining, key, route, case_sensitive);
                self.param_children.push(child);
            }
            Segment::Static(lit) => {
                let lit = if case_sensitive {
                    lit.clone()
                } else {
                    lit.to_ascii_lowercase()
                };
                if let Some(child) = self.children.iter_mut().find(|c| c.segment == lit.as_str()) {
                    child.insert(remaining, key, route, case_sensitive);
                    return;
                }
                let mut child = RadixNode::new(Cow::Owned(lit));
                child.insert(remaining, key, route, case_sensitive);
                self.children.push(child);
            }
        }
    }

    fn search(
        &self,
        segments: &[&str],
        key: &(Method, bool),
        case_sensitive: bool,
        params: &mut ParamVec,
    ) -> Option<Arc<RouteMeta>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.routes.get(key).cloned();
        };

        // Static children win over parameters
        for child in &self.children {
            let hit = if case_sensitive {
                child.segment == *segment
            } else {
                child.segment.eq_ignore_ascii_case(segment)
            };
            if hit {
                if let Some(route) = child.search(remaining, key, case_sensitive, params) {
                    return Some(route);
                }
            }
        }

        for param_child in &self.param_children {
            if let Some(name) = &param_child.param_name {
                let value = urlencoding::decode(segment)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| (*segment).to_string());
                params.push((Arc::clone(name), value));
                if let Some(route) = param_child.search(remaining, key, case_sensitive, params) {
                    return Some(route);
                }
                // Backtrack
                params.pop();
            }
        }

        None
    }
}

/// Radix tree keyed by path segments, holding routes per method.
#[derive(Clone)]
pub(crate) struct RadixTree {
    root: RadixNode,
    case_sensitive: bool,
}

impl RadixTree {
    pub(crate) fn new(case_sensitive: bool) -> Self {
        Self {
            root: RadixNode::new(Cow::Borrowed("")),
            case_sensitive,
        }
    }

    /// Insert a route. `trailing_slash` keeps `/a/` and `/a` apart when set.
    pub(crate) fn insert(&mut self, route: Arc<RouteMeta>, trailing_slash: bool) {
        let segments = route.template.segments().to_vec();
        let key = (route.method.clone(), trailing_slash);
        self.root.insert(&segments, key, route, self.case_sensitive);
    }

    pub(crate) fn search(
        &self,
        method: &Method,
        path: &str,
        trailing_slash: bool,
    ) -> Option<(Arc<RouteMeta>, ParamVec)> {
        let segments = split_path(path);
        let key = (method.clone(), trailing_slash);
        let mut params = ParamVec::new();
        let route = self
            .root
            .search(&segments, &key, self.case_sensitive, &mut params)?;
        Some((route, params))
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.trim_start_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}

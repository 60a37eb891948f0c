use std::fmt;

use http::Method;

/// Route registration error
///
/// Returned by every registration call on [`Instance`](crate::Instance) when
/// a route cannot be added. Request-time failures never surface here; they
/// are turned into HTTP error replies by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The path template is malformed
    ///
    /// Templates must start with `/`, and every `:name` segment must carry a
    /// non-empty identifier.
    InvalidTemplate {
        /// The offending template
        template: String,
        /// What is wrong with it
        reason: String,
    },
    /// The same parameter name appears twice in one template
    DuplicateParam {
        /// The offending template
        template: String,
        /// The repeated name
        name: String,
    },
    /// A route for this method and path already exists
    Duplicate {
        /// HTTP method of the conflicting route
        method: Method,
        /// Full path template of the conflicting route
        path: String,
    },
    /// A handler name given through route options is already taken
    DuplicateName {
        /// The repeated handler name
        name: String,
    },
    /// A declared params type expects different names than the template provides
    ParamsMismatch {
        /// The route template
        template: String,
        /// Names found in the template (declaration order)
        template_params: Vec<String>,
        /// Names the params type declares
        declared_params: Vec<String>,
    },
    /// A JSON Schema document attached to the route failed to compile
    InvalidSchema {
        /// Which request part the schema belongs to (`body`, `querystring`, ...)
        part: &'static str,
        /// Compiler message from `jsonschema`
        message: String,
    },
    /// A plugin reported failure through its completion result
    Plugin {
        /// Plugin error message, including its context chain
        message: String,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::InvalidTemplate { template, reason } => {
                write!(f, "invalid path template '{template}': {reason}")
            }
            RouteError::DuplicateParam { template, name } => {
                write!(
                    f,
                    "invalid path template '{template}': parameter ':{name}' declared more than once"
                )
            }
            RouteError::Duplicate { method, path } => {
                write!(f, "route {method}:{path} is already declared")
            }
            RouteError::DuplicateName { name } => {
                write!(f, "handler name '{name}' is already registered")
            }
            RouteError::ParamsMismatch {
                template,
                template_params,
                declared_params,
            } => {
                write!(
                    f,
                    "params type for '{template}' declares [{}] but the template provides [{}]",
                    declared_params.join(", "),
                    template_params.join(", ")
                )
            }
            RouteError::InvalidSchema { part, message } => {
                write!(f, "invalid {part} schema: {message}")
            }
            RouteError::Plugin { message } => write!(f, "plugin failed to load: {message}"),
        }
    }
}

impl std::error::Error for RouteError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_route_message() {
        let err = RouteError::Duplicate {
            method: Method::GET,
            path: "/users/:id".to_string(),
        };
        assert_eq!(err.to_string(), "route GET:/users/:id is already declared");
    }

    #[test]
    fn test_params_mismatch_lists_both_sides() {
        let err = RouteError::ParamsMismatch {
            template: "/a/:x".to_string(),
            template_params: vec!["x".to_string()],
            declared_params: vec!["y".to_string(), "z".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("[y, z]"));
        assert!(msg.contains("[x]"));
    }
}

//! # Router Module
//!
//! Path matching for registered routes. This is the host side of route
//! registration: the typed layer parses templates and hands finished
//! [`RouteMeta`] records to the [`Router`], which stores them in a radix
//! tree and resolves incoming paths to a route plus its captured parameters.
//!
//! ## Matching rules
//!
//! - Static segments win over `:param` segments at the same position.
//! - Routes with different parameter names at the same position keep their
//!   own names (`/users/:user_id/posts` and `/users/:id/comments`).
//! - Parameter values are percent-decoded.
//! - Unless `ignore_trailing_slash` is set, `/a/` and `/a` are distinct.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use routeshape::path::PathTemplate;
//! use routeshape::router::{RouteMeta, Router};
//!
//! let mut router = Router::default();
//! router
//!     .insert(RouteMeta {
//!         method: Method::GET,
//!         template: PathTemplate::parse("/pets/:id").unwrap(),
//!         handler_name: "get_pet".to_string(),
//!         response_codes: Vec::new(),
//!         validated_parts: Vec::new(),
//!     })
//!     .unwrap();
//!
//! let m = router.route(&Method::GET, "/pets/123").unwrap();
//! assert_eq!(m.get_path_param("id"), Some("123"));
//! ```

mod core;
mod radix;

pub use self::core::{ParamVec, RouteMatch, RouteMeta, Router, MAX_INLINE_PARAMS};

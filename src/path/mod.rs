//! # Path Module
//!
//! Route path templates and the parameters derived from them.
//!
//! A template such as `/users/:name/age/:id` is parsed once, at registration
//! time, into a [`PathTemplate`]. Literal segments contribute nothing;
//! every `:name` segment contributes exactly one parameter. The derived
//! parameter record is a [`PathParams`] map from name to string value.
//!
//! ```rust
//! use routeshape::path::PathTemplate;
//!
//! let template = PathTemplate::parse("/users/:name/age/:id").unwrap();
//! assert_eq!(template.param_names(), vec!["name", "id"]);
//!
//! let none = PathTemplate::parse("/add").unwrap();
//! assert!(none.param_names().is_empty());
//! ```
//!
//! For a compile-time guarantee, `#[route_params("...")]` (re-exported at the
//! crate root) generates a struct whose fields are exactly the template's
//! parameter names, and registration rejects a route whose template
//! disagrees with the struct.

mod params;
mod template;

pub(crate) use params::check_declared;
pub use params::{ParamsShape, PathParams};
pub use template::{PathTemplate, Segment};

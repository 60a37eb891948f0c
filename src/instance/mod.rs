//! # Instance Module
//!
//! The registration surface. An [`Instance`] accepts the same options as the
//! host router ([`InstanceOptions`](crate::config::InstanceOptions)) and
//! exposes one registration method per HTTP verb, a generic
//! [`Instance::route`], and plugin registration. Each verb comes in two
//! forms:
//!
//! - `get(path, handler)`: request and reply are unconstrained
//!   (`Request<Schema>`, `SingleReply<Value>`);
//! - `get_with(path, RouteOptions<S>, handler)`: request and reply types are
//!   derived from the schema `S`.
//!
//! Registration is the only place runtime checks happen: the path template
//! is parsed, a params type's declared names are compared with it, and JSON
//! Schema documents are compiled. Failures are [`RouteError`](crate::RouteError)s.
//!
//! ## Plugins
//!
//! A plugin is any `FnOnce(&mut Instance, T) -> anyhow::Result<()>`. It
//! registers routes on the same instance; with
//! [`PluginOptions::prefix`] those routes are mounted under a prefix.
//!
//! ```rust
//! use routeshape::{InjectRequest, Instance, PluginOptions};
//!
//! fn users(app: &mut Instance, greeting: &'static str) -> anyhow::Result<()> {
//!     app.get("/users/:name", move |req, reply| {
//!         let name = req.params.get("name").unwrap_or("stranger").to_string();
//!         reply.send(format!("{greeting}, {name}"))
//!     })?;
//!     Ok(())
//! }
//!
//! let mut app = Instance::default();
//! app.register_with(users, "hello", PluginOptions::prefix("/v1")).unwrap();
//!
//! let resp = app.inject(InjectRequest::get("/v1/users/ada"));
//! assert_eq!(resp.body, "hello, ada");
//! ```

mod core;
mod inject;
mod options;

pub use self::core::Instance;
pub use inject::InjectRequest;
pub use options::{PluginOptions, RouteDefinition, RouteOptions};

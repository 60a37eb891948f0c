use std::fmt;
use std::marker::PhantomData;

use http::Method;
use serde_json::Value;

use crate::schema::{RouteSchema, Schema, SchemaDocs};
use crate::typed::{Outcome, Reply, Request};

/// Per-route options: the schema type plus optional runtime extras.
///
/// The schema is chosen with [`RouteOptions::schema`]; it fixes the request
/// and reply types of the handler registered alongside these options.
pub struct RouteOptions<S = Schema> {
    pub(crate) name: Option<String>,
    pub(crate) docs: SchemaDocs,
    _schema: PhantomData<fn() -> S>,
}

impl RouteOptions {
    /// Options with the unconstrained schema
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            docs: SchemaDocs::default(),
            _schema: PhantomData,
        }
    }
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for RouteOptions<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteOptions")
            .field("schema", &std::any::type_name::<S>())
            .field("name", &self.name)
            .field("docs", &self.docs)
            .finish()
    }
}

impl<S> RouteOptions<S> {
    /// Attach a schema declaration
    #[must_use]
    pub fn schema<T: RouteSchema>(self, _schema: T) -> RouteOptions<T> {
        RouteOptions {
            name: self.name,
            docs: self.docs,
            _schema: PhantomData,
        }
    }

    /// Handler name used in logs and route listings (default: `METHOD path`)
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// JSON Schema document for the body
    #[must_use]
    pub fn body_schema(mut self, doc: Value) -> Self {
        self.docs.body = Some(doc);
        self
    }

    #[must_use]
    pub fn querystring_schema(mut self, doc: Value) -> Self {
        self.docs.querystring = Some(doc);
        self
    }

    #[must_use]
    pub fn headers_schema(mut self, doc: Value) -> Self {
        self.docs.headers = Some(doc);
        self
    }

    #[must_use]
    pub fn params_schema(mut self, doc: Value) -> Self {
        self.docs.params = Some(doc);
        self
    }
}

/// Options for registering a plugin
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginOptions {
    /// Prefix for every route the plugin registers, on top of enclosing prefixes
    pub prefix: Option<String>,
}

impl PluginOptions {
    #[must_use]
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

/// A full route declaration in one value: methods, url, options and handler.
///
/// Built with [`RouteDefinition::new`], which fixes the handler's request and
/// reply types from the options' schema.
pub struct RouteDefinition<S, F> {
    pub(crate) methods: Vec<Method>,
    pub(crate) url: String,
    pub(crate) options: RouteOptions<S>,
    pub(crate) handler: F,
}

impl<S, F> RouteDefinition<S, F>
where
    S: RouteSchema,
{
    pub fn new<O>(
        methods: impl IntoIterator<Item = Method>,
        url: impl Into<String>,
        options: RouteOptions<S>,
        handler: F,
    ) -> Self
    where
        F: Fn(Request<S>, Reply<S>) -> O + Send + Sync + 'static,
        O: Outcome,
    {
        Self {
            methods: methods.into_iter().collect(),
            url: url.into(),
            options,
            handler,
        }
    }
}

impl<S, F> fmt::Debug for RouteDefinition<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("methods", &self.methods)
            .field("url", &self.url)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

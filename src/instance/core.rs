use std::sync::Arc;

use http::Method;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::inject::{collect_headers, parse_body, parse_query, split_url, InjectRequest};
use super::options::{PluginOptions, RouteDefinition, RouteOptions};
use crate::config::InstanceOptions;
use crate::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
use crate::error::RouteError;
use crate::ids::RequestId;
use crate::middleware::Middleware;
use crate::path::{check_declared, PathTemplate};
use crate::reply::ReplyShape;
use crate::router::{RouteMeta, Router};
use crate::schema::{CompiledSchemas, RouteSchema, Schema};
use crate::typed::{erase, Outcome, Reply, Request};

/// Methods registered by [`Instance::all`]
const ALL_METHODS: [Method; 7] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
    Method::PATCH,
];

/// Join an enclosing prefix and a plugin prefix
fn join_prefix(outer: &str, inner: &str) -> String {
    let inner = inner.trim_matches('/');
    if inner.is_empty() {
        return outer.to_string();
    }
    format!("{}/{inner}", outer.trim_end_matches('/'))
}

/// Route registration surface with schema-derived handler types.
///
/// Every registration call takes either a plain handler, whose request and
/// reply are unconstrained, or [`RouteOptions`] carrying a schema, in which
/// case the handler's [`Request`] and [`Reply`] types are derived from it.
/// Routes go to the host router and dispatcher unchanged.
///
/// ```rust
/// use routeshape::reply::codes;
/// use routeshape::schema::Schema;
/// use routeshape::{responses, InjectRequest, Instance, RouteOptions};
///
/// let mut app = Instance::default();
/// app.get("/ping", |_req, reply| reply.send("pong"))
///     .unwrap()
///     .get_with(
///         "/users/:id",
///         RouteOptions::new().schema(
///             Schema::new().responses::<responses![200 => String, 404 => String]>(),
///         ),
///         |req, reply| match req.params.get("id") {
///             Some("1") => reply.status(codes::OK).send("ada"),
///             _ => reply.status(codes::NOT_FOUND).send("no such user"),
///         },
///     )
///     .unwrap();
///
/// let resp = app.inject(InjectRequest::get("/users/2"));
/// assert_eq!(resp.status, 404);
/// ```
pub struct Instance {
    options: InstanceOptions,
    router: Router,
    dispatcher: Dispatcher,
    /// Prefix applied to routes registered right now (instance + plugin prefixes)
    prefix: String,
}

impl Default for Instance {
    fn default() -> Self {
        Self::new(InstanceOptions::default())
    }
}

/// Generates the plain and schema-bearing registration methods of one verb
macro_rules! verb {
    ($method:expr, $name:literal, $plain:ident, $with:ident) => {
        #[doc = concat!("Register a `", $name, "` route with unconstrained request and reply types.")]
        ///
        /// # Errors
        ///
        /// See [`Instance::route`].
        pub fn $plain<F, O>(&mut self, path: &str, handler: F) -> Result<&mut Self, RouteError>
        where
            F: Fn(Request<Schema>, Reply<Schema>) -> O + Send + Sync + 'static,
            O: Outcome,
        {
            self.add_route(&[$method], path, RouteOptions::new(), handler)
        }

        #[doc = concat!("Register a `", $name, "` route typed by the options' schema.")]
        ///
        /// # Errors
        ///
        /// See [`Instance::route`].
        pub fn $with<S, F, O>(
            &mut self,
            path: &str,
            options: RouteOptions<S>,
            handler: F,
        ) -> Result<&mut Self, RouteError>
        where
            S: RouteSchema,
            F: Fn(Request<S>, Reply<S>) -> O + Send + Sync + 'static,
            O: Outcome,
        {
            self.add_route(&[$method], path, options, handler)
        }
    };
}

impl Instance {
    #[must_use]
    pub fn new(options: InstanceOptions) -> Self {
        info!(
            prefix = %options.prefix,
            case_sensitive = options.case_sensitive,
            ignore_trailing_slash = options.ignore_trailing_slash,
            body_limit = options.body_limit,
            "Instance created"
        );
        Self {
            router: Router::from_options(&options),
            dispatcher: Dispatcher::new(),
            prefix: join_prefix("", &options.prefix),
            options,
        }
    }

    /// Options this instance was created with
    #[must_use]
    pub fn config(&self) -> &InstanceOptions {
        &self.options
    }

    verb!(Method::GET, "GET", get, get_with);
    verb!(Method::HEAD, "HEAD", head, head_with);
    verb!(Method::POST, "POST", post, post_with);
    verb!(Method::PUT, "PUT", put, put_with);
    verb!(Method::DELETE, "DELETE", delete, delete_with);
    verb!(Method::OPTIONS, "OPTIONS", options, options_with);
    verb!(Method::PATCH, "PATCH", patch, patch_with);

    /// Register one handler for every supported method.
    ///
    /// # Errors
    ///
    /// See [`Instance::route`].
    pub fn all<F, O>(&mut self, path: &str, handler: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(Request<Schema>, Reply<Schema>) -> O + Send + Sync + 'static,
        O: Outcome,
    {
        self.add_route(&ALL_METHODS, path, RouteOptions::new(), handler)
    }

    /// Schema-bearing form of [`Instance::all`].
    ///
    /// # Errors
    ///
    /// See [`Instance::route`].
    pub fn all_with<S, F, O>(
        &mut self,
        path: &str,
        options: RouteOptions<S>,
        handler: F,
    ) -> Result<&mut Self, RouteError>
    where
        S: RouteSchema,
        F: Fn(Request<S>, Reply<S>) -> O + Send + Sync + 'static,
        O: Outcome,
    {
        self.add_route(&ALL_METHODS, path, options, handler)
    }

    /// Register a route from a full definition.
    ///
    /// # Errors
    ///
    /// - [`RouteError::InvalidTemplate`] / [`RouteError::DuplicateParam`] for
    ///   a malformed path template (including the effective prefix)
    /// - [`RouteError::ParamsMismatch`] when the schema's params type declares
    ///   names the template does not provide
    /// - [`RouteError::InvalidSchema`] when an attached JSON Schema document
    ///   does not compile
    /// - [`RouteError::Duplicate`] / [`RouteError::DuplicateName`] when the
    ///   route or its handler name is already taken
    ///
    /// A failed registration leaves the instance unchanged.
    pub fn route<S, F, O>(
        &mut self,
        definition: RouteDefinition<S, F>,
    ) -> Result<&mut Self, RouteError>
    where
        S: RouteSchema,
        F: Fn(Request<S>, Reply<S>) -> O + Send + Sync + 'static,
        O: Outcome,
    {
        let RouteDefinition {
            methods,
            url,
            options,
            handler,
        } = definition;
        self.add_route(&methods, &url, options, handler)
    }

    fn add_route<S, F, O>(
        &mut self,
        methods: &[Method],
        path: &str,
        options: RouteOptions<S>,
        handler: F,
    ) -> Result<&mut Self, RouteError>
    where
        S: RouteSchema,
        F: Fn(Request<S>, Reply<S>) -> O + Send + Sync + 'static,
        O: Outcome,
    {
        let mut unique: Vec<Method> = Vec::with_capacity(methods.len());
        for m in methods {
            if !unique.contains(m) {
                unique.push(m.clone());
            }
        }

        // Declared params are checked against the template as written at the
        // call site; the prefix may contribute further params
        let own = PathTemplate::parse(path)?;
        check_declared::<S::Params>(&own)?;
        let template = own.join(&self.prefix)?;
        let schemas = CompiledSchemas::compile(&options.docs)?;

        let names: Vec<String> = unique
            .iter()
            .map(|m| match &options.name {
                Some(name) if unique.len() == 1 => name.clone(),
                Some(name) => format!("{name}:{m}"),
                None => format!("{m} {template}"),
            })
            .collect();

        for (method, name) in unique.iter().zip(&names) {
            if self.router.contains(method, &template) {
                warn!(method = %method, path = %template, "Rejected duplicate route");
                return Err(RouteError::Duplicate {
                    method: method.clone(),
                    path: template.to_string(),
                });
            }
            if self.dispatcher.has_handler(name) {
                return Err(RouteError::DuplicateName { name: name.clone() });
            }
        }

        let validated_parts = schemas.parts();
        let response_codes = <S::Response as ReplyShape>::declared_codes();
        let handler = erase::<S, F, O>(handler, schemas, self.options.validate_requests);

        for (method, name) in unique.into_iter().zip(names) {
            self.router.insert(RouteMeta {
                method,
                template: template.clone(),
                handler_name: name.clone(),
                response_codes: response_codes.clone(),
                validated_parts: validated_parts.clone(),
            })?;
            self.dispatcher.register_handler(&name, Arc::clone(&handler));
        }
        Ok(self)
    }

    /// Register a plugin.
    ///
    /// The plugin receives this instance and its options, and reports
    /// completion through its return value.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Plugin`] when the plugin fails. Routes it
    /// registered before failing stay registered.
    pub fn register<P, T>(&mut self, plugin: P, opts: T) -> Result<&mut Self, RouteError>
    where
        P: FnOnce(&mut Instance, T) -> anyhow::Result<()>,
    {
        self.register_with(plugin, opts, PluginOptions::default())
    }

    /// Register a plugin under a route prefix.
    ///
    /// Routes the plugin registers (including through nested plugins) are
    /// prefixed; the enclosing prefix is restored afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Plugin`] when the plugin fails.
    pub fn register_with<P, T>(
        &mut self,
        plugin: P,
        opts: T,
        plugin_options: PluginOptions,
    ) -> Result<&mut Self, RouteError>
    where
        P: FnOnce(&mut Instance, T) -> anyhow::Result<()>,
    {
        let outer = self.prefix.clone();
        if let Some(prefix) = &plugin_options.prefix {
            self.prefix = join_prefix(&outer, prefix);
        }
        debug!(prefix = %self.prefix, "Registering plugin");
        let result = plugin(self, opts);
        self.prefix = outer;

        match result {
            Ok(()) => Ok(self),
            Err(err) => {
                let message = format!("{err:#}");
                warn!(error = %message, "Plugin failed");
                Err(RouteError::Plugin { message })
            }
        }
    }

    /// Add middleware around every handler
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) -> &mut Self {
        self.dispatcher.add_middleware(mw);
        self
    }

    /// Registered routes in registration order
    #[must_use]
    pub fn routes(&self) -> &[Arc<RouteMeta>] {
        self.router.routes()
    }

    /// Whether a request for `method` and `path` would reach a route
    #[must_use]
    pub fn has_route(&self, method: &Method, path: &str) -> bool {
        self.router.route(method, split_url(path).0).is_some()
    }

    /// Route table, one route per line:
    /// `METHOD path (handler) [codes] {validated parts}`.
    #[must_use]
    pub fn print_routes(&self) -> String {
        let mut out = String::new();
        for route in self.router.routes() {
            out.push_str(&format!(
                "{:<7} {} ({})",
                route.method.as_str(),
                route.template,
                route.handler_name
            ));
            if !route.response_codes.is_empty() {
                let codes: Vec<String> = route.response_codes.iter().map(u16::to_string).collect();
                out.push_str(&format!(" [{}]", codes.join(", ")));
            }
            if !route.validated_parts.is_empty() {
                out.push_str(&format!(" {{{}}}", route.validated_parts.join(", ")));
            }
            out.push('\n');
        }
        out
    }

    /// Run a request in process through the router and dispatcher.
    ///
    /// Never fails: routing, parsing and handler failures come back as error
    /// responses (`404`, `400`, `413`, `415`, `500`).
    #[must_use]
    pub fn inject(&self, req: InjectRequest) -> HandlerResponse {
        let (path, query) = split_url(&req.url);

        let mut head_fallback = false;
        let route_match = match self.router.route(&req.method, path) {
            Some(m) => Some(m),
            None if req.method == Method::HEAD && self.options.expose_head_routes => {
                head_fallback = true;
                self.router.route(&Method::GET, path)
            }
            None => None,
        };
        let Some(route_match) = route_match else {
            debug!(method = %req.method, url = %req.url, "No route matched");
            return HandlerResponse::error(
                404,
                &format!("Route {}:{} not found", req.method, req.url),
            );
        };

        let body = match parse_body(
            req.payload.as_deref(),
            req.content_type(),
            self.options.body_limit,
        ) {
            Ok(body) => body,
            Err(resp) => return resp,
        };

        let headers = collect_headers(&req.headers);
        let request_id = RequestId::from_header_or_new(
            headers
                .iter()
                .find(|(k, _)| k.as_ref() == "x-request-id")
                .map(|(_, v)| v.as_str()),
        );

        let handler_request = HandlerRequest {
            request_id,
            method: req.method.clone(),
            path: path.to_string(),
            handler_name: route_match.route.handler_name.clone(),
            path_params: route_match.path_params,
            query_params: parse_query(query),
            headers,
            body,
        };

        let Some(mut resp) = self.dispatcher.dispatch(handler_request) else {
            return HandlerResponse::error(
                500,
                &format!("No handler registered for {}", route_match.route.handler_name),
            );
        };
        if head_fallback {
            resp.body = Value::Null;
        }
        resp
    }
}

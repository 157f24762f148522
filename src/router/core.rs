use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

use crate::dispatcher::{FaultHandler, FaultPayload, Handler, HandlerRequest, HandlerResponse};
use crate::middleware::{compose, Middleware};

use super::segment::{build_match_pattern, compile, Segment};

/// Maximum number of path parameters before heap allocation. Most routes
/// carry well under eight.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the dispatch hot path.
///
/// Parameter names use `Arc<str>` because they come from the static route
/// table; values remain `String` as per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Methods accepted at registration time. Anything else is a configuration
/// mistake and fails fast.
const SUPPORTED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
];

/// Bucket key for routes whose full path has no non-empty segment.
const ROOT_BUCKET: &str = "";

/// One registered (method, path template, handler) binding.
///
/// Created once at registration and immutable thereafter; shared by the
/// exact-path index, the narrowing buckets, and the name index.
pub struct Route {
    method: Method,
    path: String,
    /// Compiled segment sequence; `None` when the template violates segment
    /// grammar. Reverse generation recompiles in that case to surface the
    /// grammar error.
    segments: Option<Vec<Segment>>,
    /// Anchored whole-path matcher; `None` when the template grammar or its
    /// explicit pattern fails to compile. Such a route never matches.
    matcher: Option<Regex>,
    /// Parameter names in template order, aligned with capture groups.
    param_names: Vec<Arc<str>>,
    handler: Handler,
    /// Middleware captured at registration time; never changes even if the
    /// owning router's list grows later.
    middleware: Vec<Middleware>,
    name: Option<String>,
}

impl Route {
    /// Raw full path template as typed at registration, prefix included.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// HTTP method this route is registered under.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Route name used by reverse generation, if one was given.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Terminal handler.
    #[must_use]
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Middleware snapshot captured at registration.
    #[must_use]
    pub fn middleware(&self) -> &[Middleware] {
        &self.middleware
    }

    pub(crate) fn segments(&self) -> Option<&[Segment]> {
        self.segments.as_deref()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("name", &self.name)
            .field("params", &self.param_names)
            .finish_non_exhaustive()
    }
}

/// Result of successfully matching a request path to a route.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route (`Arc`-shared with the routing table).
    pub route: Arc<Route>,
    /// Extracted parameters in template order; absent when the route exposed
    /// none (always absent on the exact-path fast path).
    pub params: Option<ParamVec>,
}

/// Per-method routing table.
#[derive(Default)]
pub(crate) struct MethodTable {
    /// Raw registered path → route, for the exact-path fast pass.
    exact: HashMap<String, Arc<Route>>,
    /// Narrowing key (first non-empty segment as typed) → routes in
    /// registration order.
    buckets: HashMap<String, Vec<Arc<Route>>>,
    /// Name → route for reverse generation. Last writer wins on duplicate
    /// names.
    names: HashMap<String, Arc<Route>>,
}

impl MethodTable {
    pub(crate) fn named(&self, name: &str) -> Option<&Arc<Route>> {
        self.names.get(name)
    }
}

pub(crate) struct RouterInner {
    pub(crate) tables: HashMap<Method, MethodTable>,
    middleware: Vec<Middleware>,
    not_found: Option<Handler>,
    fault: Option<FaultHandler>,
}

/// Top-level routing entry point.
///
/// Registration is a single-threaded setup phase; once serving starts the
/// tables are read-only and safely shared by unlimited concurrent dispatches.
/// A group created with [`Router::group`] shares the same tables and
/// middleware list through the same handle and only extends the path prefix,
/// so routes registered via a group are visible to the parent and siblings.
#[derive(Clone)]
pub struct Router {
    prefix: String,
    inner: Arc<RwLock<RouterInner>>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create a router with no routes, no prefix, and an empty middleware
    /// list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefix: String::new(),
            inner: Arc::new(RwLock::new(RouterInner {
                tables: HashMap::new(),
                middleware: Vec::new(),
                not_found: None,
                fault: None,
            })),
        }
    }

    /// Create a view of this router with an extended path prefix.
    ///
    /// The group shares the parent's tables and middleware list; it is a
    /// view, not a copy. Nested groups extend the prefix further.
    #[must_use]
    pub fn group(&self, prefix: &str) -> Router {
        Router {
            prefix: join_paths(&self.prefix, prefix),
            inner: Arc::clone(&self.inner),
        }
    }

    /// Append middleware to the shared list.
    ///
    /// Only routes registered afterward capture it; existing routes keep
    /// their snapshot.
    pub fn use_middleware<M>(&self, middleware: M)
    where
        M: Fn(Handler) -> Handler + Send + Sync + 'static,
    {
        self.write_inner().middleware.push(Arc::new(middleware));
    }

    /// Register a handler invoked whenever no route matches a request.
    ///
    /// The not-found handler runs through the router's current middleware
    /// list at dispatch time.
    pub fn not_found<H>(&self, handler: H)
    where
        H: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync + 'static,
    {
        self.write_inner().not_found = Some(Arc::new(handler));
    }

    /// Install a fault handler intercepting uncaught panics raised by a
    /// matched handler or its middleware during dispatch.
    ///
    /// Without one, the fault propagates to the transport's own isolation
    /// boundary.
    pub fn fault_handler<F>(&self, handler: F)
    where
        F: Fn(&HandlerRequest, &mut HandlerResponse, FaultPayload) + Send + Sync + 'static,
    {
        self.write_inner().fault = Some(Arc::new(handler));
    }

    /// Register a handler for `method` at `path`.
    ///
    /// The router's prefix, when non-empty, is joined in front of `path`
    /// with a `/`.
    ///
    /// # Panics
    ///
    /// Panics when `method` is not one of GET, POST, PUT, DELETE or PATCH.
    /// An unsupported method is a configuration mistake, not a runtime
    /// condition.
    pub fn handle<H>(&self, method: Method, path: &str, handler: H)
    where
        H: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync + 'static,
    {
        self.register(method, path, Arc::new(handler), None);
    }

    /// Register a named handler for `method` at `path`.
    ///
    /// The name feeds the reverse-routing index for this method. Registering
    /// the same name twice overwrites the index entry: last writer wins.
    ///
    /// # Panics
    ///
    /// Panics when `method` is not one of GET, POST, PUT, DELETE or PATCH.
    pub fn handle_named<H>(&self, method: Method, path: &str, handler: H, name: &str)
    where
        H: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync + 'static,
    {
        self.register(method, path, Arc::new(handler), Some(name));
    }

    /// Shorthand for [`Router::handle`] with `GET`.
    pub fn get<H>(&self, path: &str, handler: H)
    where
        H: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync + 'static,
    {
        self.handle(Method::GET, path, handler);
    }

    /// Shorthand for [`Router::handle`] with `POST`.
    pub fn post<H>(&self, path: &str, handler: H)
    where
        H: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync + 'static,
    {
        self.handle(Method::POST, path, handler);
    }

    /// Shorthand for [`Router::handle`] with `PUT`.
    pub fn put<H>(&self, path: &str, handler: H)
    where
        H: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync + 'static,
    {
        self.handle(Method::PUT, path, handler);
    }

    /// Shorthand for [`Router::handle`] with `DELETE`.
    pub fn delete<H>(&self, path: &str, handler: H)
    where
        H: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync + 'static,
    {
        self.handle(Method::DELETE, path, handler);
    }

    /// Shorthand for [`Router::handle`] with `PATCH`.
    pub fn patch<H>(&self, path: &str, handler: H)
    where
        H: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync + 'static,
    {
        self.handle(Method::PATCH, path, handler);
    }

    /// Shorthand for [`Router::handle_named`] with `GET`.
    pub fn get_named<H>(&self, path: &str, handler: H, name: &str)
    where
        H: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync + 'static,
    {
        self.handle_named(Method::GET, path, handler, name);
    }

    /// Shorthand for [`Router::handle_named`] with `POST`.
    pub fn post_named<H>(&self, path: &str, handler: H, name: &str)
    where
        H: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync + 'static,
    {
        self.handle_named(Method::POST, path, handler, name);
    }

    /// Shorthand for [`Router::handle_named`] with `PUT`.
    pub fn put_named<H>(&self, path: &str, handler: H, name: &str)
    where
        H: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync + 'static,
    {
        self.handle_named(Method::PUT, path, handler, name);
    }

    /// Shorthand for [`Router::handle_named`] with `DELETE`.
    pub fn delete_named<H>(&self, path: &str, handler: H, name: &str)
    where
        H: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync + 'static,
    {
        self.handle_named(Method::DELETE, path, handler, name);
    }

    /// Shorthand for [`Router::handle_named`] with `PATCH`.
    pub fn patch_named<H>(&self, path: &str, handler: H, name: &str)
    where
        H: Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync + 'static,
    {
        self.handle_named(Method::PATCH, path, handler, name);
    }

    #[allow(clippy::panic)]
    fn register(&self, method: Method, path: &str, handler: Handler, name: Option<&str>) {
        if !SUPPORTED_METHODS.contains(&method) {
            panic!("unsupported HTTP method {method}; routes may use GET, POST, PUT, DELETE or PATCH");
        }

        let full_path = join_paths(&self.prefix, path);
        let (segments, matcher, param_names) = compile_route(&full_path);

        let mut inner = self.write_inner();
        let route = Arc::new(Route {
            method: method.clone(),
            path: full_path.clone(),
            segments,
            matcher,
            param_names,
            handler,
            middleware: inner.middleware.clone(),
            name: name.map(str::to_string),
        });

        debug!(
            method = %method,
            path = %full_path,
            name = name.unwrap_or(""),
            "route registered"
        );

        let table = inner.tables.entry(method).or_default();
        table.exact.insert(full_path.clone(), Arc::clone(&route));
        table
            .buckets
            .entry(narrowing_key(&full_path).to_string())
            .or_default()
            .push(Arc::clone(&route));
        if let Some(name) = name {
            table.names.insert(name.to_string(), route);
        }
    }

    /// Match a request against the routing table for its method.
    ///
    /// The exact-path pass runs first: a route whose raw registered path
    /// equals the request path (or the request path with its leading slash
    /// stripped) wins immediately with no parameters, regardless of
    /// registration order. Otherwise the bucket keyed by the first non-empty
    /// request segment is scanned in registration order and the first route
    /// whose anchored pattern spans the entire path wins; one trailing slash
    /// on the request is accommodated. Registration order is the sole
    /// tie-break among pattern candidates.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        debug!(method = %method, path = %path, "route match attempt");
        let inner = self.read_inner();
        let matched = Self::match_in(&inner, method, path);
        if matched.is_none() {
            warn!(method = %method, path = %path, "no route matched");
        }
        matched
    }

    fn match_in(inner: &RouterInner, method: &Method, path: &str) -> Option<RouteMatch> {
        let table = inner.tables.get(method)?;

        // Exact-path pass. Also accepts the path with its leading slash
        // stripped, for paths that reached this layer without one.
        let stripped = path.strip_prefix('/').unwrap_or(path);
        if let Some(route) = table.exact.get(path).or_else(|| table.exact.get(stripped)) {
            return Some(RouteMatch {
                route: Arc::clone(route),
                params: None,
            });
        }

        // Prefix-narrowed pattern pass.
        let candidates = table.buckets.get(narrowing_key(path))?;
        let probe = path.strip_suffix('/').unwrap_or(path);
        for route in candidates {
            if route.path == path {
                continue; // already tried by the exact pass
            }
            let Some(matcher) = &route.matcher else {
                continue; // malformed template: fails closed
            };
            if let Some(captures) = matcher.captures(probe) {
                let mut params = ParamVec::new();
                for (idx, name) in route.param_names.iter().enumerate() {
                    if let Some(value) = captures.get(idx + 1) {
                        params.push((Arc::clone(name), value.as_str().to_string()));
                    }
                }
                return Some(RouteMatch {
                    route: Arc::clone(route),
                    params: if params.is_empty() { None } else { Some(params) },
                });
            }
        }
        None
    }

    /// Dispatch one request: match, attach parameters, compose the route's
    /// middleware snapshot around its handler, and invoke it.
    ///
    /// On no match the registered not-found handler runs through the
    /// router's current middleware list; without one a generic 404 is
    /// written as the transport-equivalent backstop. A panic raised by the
    /// matched handler or its middleware is delivered to the installed fault
    /// handler, or resumed when none is installed.
    pub fn dispatch(&self, req: &mut HandlerRequest, res: &mut HandlerResponse) {
        let matched = self.match_route(&req.method, &req.path);
        match matched {
            Some(found) => {
                req.set_params(found.params);
                let chain = compose(Arc::clone(found.route.handler()), found.route.middleware());
                self.invoke(chain, req, res);
            }
            None => {
                let (not_found, middleware) = {
                    let inner = self.read_inner();
                    (inner.not_found.clone(), inner.middleware.clone())
                };
                match not_found {
                    Some(handler) => {
                        let chain = compose(handler, &middleware);
                        self.invoke(chain, req, res);
                    }
                    None => *res = HandlerResponse::error(404, "404 page not found"),
                }
            }
        }
    }

    fn invoke(&self, chain: Handler, req: &mut HandlerRequest, res: &mut HandlerResponse) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| chain(req, res)));
        if let Err(payload) = outcome {
            let fault = self.read_inner().fault.clone();
            match fault {
                Some(fault) => fault(req, res, payload),
                None => panic::resume_unwind(payload),
            }
        }
    }

    pub(crate) fn read_inner(&self) -> RwLockReadGuard<'_, RouterInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_inner(&self) -> RwLockWriteGuard<'_, RouterInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Join two path fragments as typed, inserting a single `/` between them
/// when the left side is non-empty. No normalization beyond that: doubled
/// slashes are harmless because segment compilation discards empty
/// components.
fn join_paths(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        path.to_string()
    } else {
        format!("{prefix}/{path}")
    }
}

/// First non-empty `/`-separated component, used to narrow candidate search.
fn narrowing_key(path: &str) -> &str {
    path.split('/').find(|s| !s.is_empty()).unwrap_or(ROOT_BUCKET)
}

/// Compile a full path template into segments, an anchored matcher, and the
/// ordered parameter names. A grammar error leaves all three empty so the
/// route fails closed at match time and surfaces the error at reverse
/// generation.
fn compile_route(path: &str) -> (Option<Vec<Segment>>, Option<Regex>, Vec<Arc<str>>) {
    match compile(path) {
        Ok(segments) => {
            let param_names = segments
                .iter()
                .filter_map(Segment::param_name)
                .map(Arc::from)
                .collect();
            let matcher = Regex::new(&build_match_pattern(&segments)).ok();
            (Some(segments), matcher, param_names)
        }
        Err(_) => (None, None, Vec::new()),
    }
}

//! # switchyard
//!
//! A regex-backed HTTP request router: given a method and a URL path, it
//! selects a registered handler, extracts path-embedded parameters, and runs
//! the route's middleware chain before invoking the handler. The transport
//! (listening sockets, header parsing, response writing) is an external
//! collaborator: the core receives a method and a path plus a
//! request/response pair, and leaves the result in the response value.
//!
//! ## Architecture
//!
//! - **[`router`]** - routing tables, the path-matching algorithm, and
//!   reverse routing (name + parameters → concrete path)
//! - **[`dispatcher`]** - request/response values crossing the transport
//!   boundary, parameter retrieval, fault isolation types
//! - **[`middleware`]** - wrapping middleware and chain composition
//!
//! Path templates mix three segment forms: literals (`/users`), named
//! parameters (`/:id`, digits-only when the name is `id`), and named regex
//! parameters (`/{owner:[a-z]+}`). Matching runs an exact-path fast pass
//! first, then scans pattern candidates sharing the request's first segment
//! in registration order; registration order is the sole tie-break.
//!
//! ## Quick Start
//!
//! ```
//! use switchyard::{HandlerRequest, HandlerResponse, Router};
//! use http::Method;
//!
//! let router = Router::new();
//! router.get("/hi", |_req: &HandlerRequest, res: &mut HandlerResponse| {
//!     *res = HandlerResponse::json(200, serde_json::json!({ "greeting": "hi" }));
//! });
//! router.get("/users/:user", |req: &HandlerRequest, res: &mut HandlerResponse| {
//!     let user = req.param("user").unwrap_or("").to_string();
//!     *res = HandlerResponse::json(200, serde_json::json!({ "user": user }));
//! });
//!
//! let mut req = HandlerRequest::new(Method::GET, "/users/alice");
//! let mut res = HandlerResponse::default();
//! router.dispatch(&mut req, &mut res);
//! assert_eq!(res.status, 200);
//! assert_eq!(res.body["user"], "alice");
//! ```
//!
//! ## Middleware
//!
//! Middleware are wrapping functions (`Fn(Handler) -> Handler`). A route
//! captures the router's middleware list at registration time; composing
//! happens at dispatch from that snapshot, so middleware added later never
//! retroactively affects existing routes. The first-registered middleware is
//! the outermost: first to observe the request, last to observe the response.
//!
//! ## Concurrency
//!
//! Registration is a single-threaded setup phase. Once serving starts, the
//! tables are read-only and shared by unlimited concurrent dispatches;
//! per-request state (the parameter vector, the composed chain) is allocated
//! fresh per dispatch and owned by that request's execution.

pub mod dispatcher;
pub mod middleware;
pub mod router;

pub use dispatcher::{
    FaultHandler, FaultPayload, Handler, HandlerRequest, HandlerResponse, HeaderVec,
};
pub use middleware::{compose, Middleware};
pub use router::{
    compile, match_template, ParamVec, Route, RouteMatch, Router, RouterError, Segment,
};

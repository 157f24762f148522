use std::sync::Arc;

use crate::dispatcher::Handler;

/// A wrapping middleware function: receives the next handler in the chain and
/// returns the handler that should run in its place.
pub type Middleware = Arc<dyn Fn(Handler) -> Handler + Send + Sync>;

/// Compose a middleware list around a terminal handler.
///
/// The first entry in the list ends up outermost: first to observe the
/// request, last to observe the response. Composition happens at dispatch
/// time from the route's captured snapshot, so appending middleware to a
/// router never changes the chain of an already-registered route.
#[must_use]
pub fn compose(handler: Handler, middleware: &[Middleware]) -> Handler {
    middleware.iter().rev().fold(handler, |next, mw| mw(next))
}

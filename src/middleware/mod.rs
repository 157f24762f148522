//! Middleware chain composition.
//!
//! Middleware here are wrapping functions rather than before/after hooks:
//! each receives the next handler and returns its replacement. A route
//! captures the router's middleware list at registration time and that
//! snapshot is what gets composed at dispatch, so `use_middleware` calls only
//! affect routes registered afterward.

mod chain;

pub use chain::{compose, Middleware};

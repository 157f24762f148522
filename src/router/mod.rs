//! # Router Module
//!
//! Routing tables, path matching, and reverse routing.
//!
//! ## Overview
//!
//! Routes are registered per HTTP method during a single-threaded setup
//! phase and are immutable afterward. Each method's table indexes its routes
//! three ways:
//!
//! 1. by raw registered path, for the exact-path fast pass,
//! 2. by narrowing key (the first non-empty path segment as typed), holding
//!    candidate lists in registration order for the pattern pass,
//! 3. by route name, feeding reverse generation.
//!
//! ## Matching
//!
//! Path templates are compiled once at registration into segment sequences
//! ([`Segment`]) and an anchored regex. At request time the exact-path pass
//! wins outright for parameter-free requests; otherwise candidates sharing
//! the request's first segment are tried in registration order, and the
//! first whose pattern spans the entire path wins. There is no specificity
//! scoring: registration order is the sole tie-break.
//!
//! ## Reverse routing
//!
//! [`Router::generate`] walks a named route's compiled segments, validating
//! each supplied parameter against its segment's pattern and joining the
//! resulting components back into a concrete path.

mod core;
mod error;
mod reverse;
mod segment;

pub use core::{Route, RouteMatch, Router, ParamVec, MAX_INLINE_PARAMS};
pub use error::RouterError;
pub use segment::{compile, match_template, Segment};

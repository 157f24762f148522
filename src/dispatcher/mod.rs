//! Request-scoped values crossing the transport boundary.
//!
//! The external transport parses the wire protocol and hands the core a
//! [`HandlerRequest`] / [`HandlerResponse`] pair; dispatch attaches extracted
//! path parameters to the request, runs the matched route's middleware chain
//! and handler, and leaves the result in the response value. Faults raised by
//! handler code are delivered to the router's [`FaultHandler`] when one is
//! installed.

mod core;

pub use core::{
    FaultHandler, FaultPayload, Handler, HandlerRequest, HandlerResponse, HeaderVec,
    MAX_INLINE_HEADERS,
};

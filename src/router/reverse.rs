//! Reverse routing: route name + parameter map → concrete path.

use http::Method;
use regex::Regex;
use std::collections::HashMap;

use super::core::Router;
use super::error::RouterError;
use super::segment::{compile, Segment, DEFAULT_RE};

impl Router {
    /// Reconstruct the literal path for a named route, validating each
    /// supplied parameter against its segment's pattern.
    ///
    /// Validation is find-anywhere, not whole-string: a value passes when at
    /// least one match of the segment's pattern occurs inside it, and the
    /// value is emitted verbatim. `:name` segments validate against the
    /// default identifier pattern regardless of the name (the digits-only
    /// `id` rule applies to matching only). A missing parameter reads as the
    /// empty string and therefore fails validation.
    ///
    /// # Errors
    ///
    /// - [`RouterError::NotFoundMethod`] — no routing table for `method`
    /// - [`RouterError::NotFoundRoute`] — `name` is not indexed for `method`
    /// - [`RouterError::GenerateParameters`] — a parameter is absent or does
    ///   not satisfy its segment's pattern
    /// - [`RouterError::PatternGrammar`] — the route's template is malformed,
    ///   or an explicit pattern does not compile
    pub fn generate(
        &self,
        method: &Method,
        name: &str,
        params: &HashMap<String, String>,
    ) -> Result<String, RouterError> {
        let inner = self.read_inner();
        let table = inner
            .tables
            .get(method)
            .ok_or(RouterError::NotFoundMethod)?;
        let route = table.named(name).ok_or(RouterError::NotFoundRoute)?;

        // Compiled at registration unless the template was malformed;
        // recompiling here surfaces the deferred grammar error.
        let segments: Vec<Segment> = match route.segments() {
            Some(segments) => segments.to_vec(),
            None => compile(route.path())?,
        };

        let mut out = String::new();
        for segment in &segments {
            out.push('/');
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Param { name } => {
                    let value = params.get(name).map(String::as_str).unwrap_or("");
                    if !DEFAULT_RE.is_match(value) {
                        return Err(RouterError::GenerateParameters);
                    }
                    out.push_str(value);
                }
                Segment::RegexParam { name, pattern } => {
                    let matcher =
                        Regex::new(pattern).map_err(|_| RouterError::PatternGrammar)?;
                    let value = params.get(name).map(String::as_str).unwrap_or("");
                    if !matcher.is_match(value) {
                        return Err(RouterError::GenerateParameters);
                    }
                    out.push_str(value);
                }
            }
        }
        if out.is_empty() {
            out.push('/');
        }
        Ok(out)
    }
}

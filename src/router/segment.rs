//! Path template compilation.
//!
//! A template is split on `/` into segments; empty components (leading slash,
//! doubled slashes) are discarded. Three segment forms are recognized:
//!
//! - `users` — literal, matched verbatim
//! - `:name` — one path component against the default identifier pattern,
//!   or digits only when the name is `id`
//! - `{name:pattern}` — one path component against an explicit pattern
//!
//! The compiled sequence drives both the matcher's per-route regex and
//! reverse generation.

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use super::core::ParamVec;
use super::error::RouterError;

/// Default identifier pattern for `:name` parameters.
pub(crate) const DEFAULT_PATTERN: &str = r"[\w]+";

/// Digits-only pattern applied when a named parameter is called `id`.
pub(crate) const ID_PATTERN: &str = r"[\d]+";

/// Parameter name that selects [`ID_PATTERN`] over [`DEFAULT_PATTERN`].
pub(crate) const ID_KEY: &str = "id";

#[allow(clippy::expect_used)]
pub(crate) static DEFAULT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(DEFAULT_PATTERN).expect("default identifier pattern must compile")
});

/// One `/`-delimited unit of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Exact string match.
    Literal(String),
    /// `:name` — matches one path component using the default identifier
    /// pattern, or the digits-only pattern when the name is `id`.
    Param { name: String },
    /// `{name:pattern}` — matches one path component against an explicit
    /// regular expression.
    RegexParam { name: String, pattern: String },
}

impl Segment {
    /// Parameter name for the two parameterized variants, `None` for literals.
    #[must_use]
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Param { name } | Segment::RegexParam { name, .. } => Some(name),
        }
    }
}

/// Compile a path template into its ordered segment sequence.
///
/// Empty components are discarded, so `/users`, `users` and `//users/` all
/// compile to the same single-segment sequence.
///
/// # Errors
///
/// Returns [`RouterError::PatternGrammar`] when a component opens with `{`
/// without closing with `}` (or the converse), or when the interior of a
/// braced component does not split into exactly one non-empty name and one
/// non-empty pattern.
pub fn compile(template: &str) -> Result<Vec<Segment>, RouterError> {
    let mut segments = Vec::new();
    for component in template.split('/').filter(|c| !c.is_empty()) {
        if let Some(name) = component.strip_prefix(':') {
            segments.push(Segment::Param {
                name: name.to_string(),
            });
        } else if let Some(rest) = component.strip_prefix('{') {
            let interior = rest.strip_suffix('}').ok_or(RouterError::PatternGrammar)?;
            let mut parts = interior.split(':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(name), Some(pattern), None) if !name.is_empty() && !pattern.is_empty() => {
                    segments.push(Segment::RegexParam {
                        name: name.to_string(),
                        pattern: pattern.to_string(),
                    });
                }
                _ => return Err(RouterError::PatternGrammar),
            }
        } else if component.ends_with('}') {
            return Err(RouterError::PatternGrammar);
        } else {
            segments.push(Segment::Literal(component.to_string()));
        }
    }
    Ok(segments)
}

/// Build the anchored regex source matching an entire request path against
/// the compiled segments. Each parameterized segment becomes one capturing
/// group; literal text is carried unchanged.
pub(crate) fn build_match_pattern(segments: &[Segment]) -> String {
    let mut pattern = String::with_capacity(segments.len() * 8 + 2);
    pattern.push('^');
    for segment in segments {
        pattern.push('/');
        match segment {
            Segment::Literal(text) => pattern.push_str(text),
            Segment::Param { name } => {
                pattern.push('(');
                pattern.push_str(if name == ID_KEY {
                    ID_PATTERN
                } else {
                    DEFAULT_PATTERN
                });
                pattern.push(')');
            }
            Segment::RegexParam { pattern: explicit, .. } => {
                pattern.push('(');
                pattern.push_str(explicit);
                pattern.push(')');
            }
        }
    }
    pattern.push('$');
    pattern
}

/// Test a single path template against a request path without registering it.
///
/// Returns the extracted parameters on a whole-path match (empty for a fully
/// literal template), `None` when the path does not match or the template is
/// malformed. One trailing slash on the request path is accommodated.
#[must_use]
pub fn match_template(template: &str, path: &str) -> Option<ParamVec> {
    let segments = compile(template).ok()?;
    let matcher = Regex::new(&build_match_pattern(&segments)).ok()?;
    let probe = path.strip_suffix('/').unwrap_or(path);
    let captures = matcher.captures(probe)?;
    let mut params = ParamVec::new();
    for (idx, name) in segments.iter().filter_map(Segment::param_name).enumerate() {
        if let Some(value) = captures.get(idx + 1) {
            params.push((Arc::from(name), value.as_str().to_string()));
        }
    }
    Some(params)
}

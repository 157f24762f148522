use std::fmt;

/// Routing error
///
/// Returned by reverse generation and the segment compiler. Matching itself
/// never returns an error: a route whose template is malformed simply never
/// matches any request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterError {
    /// No routing table exists for the requested HTTP method.
    NotFoundMethod,
    /// The route name is not indexed for the requested method.
    NotFoundRoute,
    /// A supplied parameter is missing or does not satisfy its segment's
    /// pattern during reverse generation.
    GenerateParameters,
    /// A `{name:pattern}` segment is malformed: unbalanced braces, or the
    /// interior does not split into exactly one non-empty name and one
    /// non-empty pattern.
    PatternGrammar,
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::NotFoundMethod => {
                write!(f, "no routing table exists for the requested method")
            }
            RouterError::NotFoundRoute => {
                write!(f, "no route is registered under the requested name")
            }
            RouterError::GenerateParameters => {
                write!(
                    f,
                    "a parameter is missing or does not satisfy its segment's pattern"
                )
            }
            RouterError::PatternGrammar => {
                write!(f, "malformed {{name:pattern}} segment in path template")
            }
        }
    }
}

impl std::error::Error for RouterError {}

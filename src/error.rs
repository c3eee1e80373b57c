use displaydoc::Display;
use thiserror::Error;

/// syntax error at {line}, {column}: unexpected input near '{snippet}'
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub struct SyntaxError {
    /// 1-based line of the first offending character, counted from the first
    /// non-blank line of the input.
    pub line: usize,
    /// 1-based column of the first offending character within its line.
    pub column: usize,
    /// The offending slice of the source line, bounded to a fixed width.
    pub snippet: String,
}

/// Query engine errors.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum QueryError {
    /// {0}
    Syntax(SyntaxError),
    /// cannot query field '{0}' on type '{1}'
    FieldNotDefined(String, String),
    /// fragment '{0}' is not defined in the query document
    FragmentNotDefined(String),
    /// node type '{0}' is not registered
    TypeNotFound(String),
    /// root call '{0}' is not registered
    RootCallNotFound(String),
    /// resolver error: {0}
    Resolver(String),
    /// schema registration error: {0}
    Registration(String),
    /// context error: {0}
    Context(String),
}

impl From<SyntaxError> for QueryError {
    fn from(error: SyntaxError) -> Self {
        QueryError::Syntax(error)
    }
}

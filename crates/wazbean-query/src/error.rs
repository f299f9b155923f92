//! BQL error types.

use thiserror::Error;

/// Error returned when parsing a BQL query fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at position {position}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Byte offset in the input where the error occurred.
    pub position: usize,
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A `'` with no closing quote.
    #[error("unterminated string literal")]
    UnterminatedString,
    /// Unexpected end of input.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// Syntax error with details.
    #[error("{0}")]
    SyntaxError(String),
}

impl ParseError {
    /// Create a new parse error.
    pub const fn new(kind: ParseErrorKind, position: usize) -> Self {
        Self { kind, position }
    }
}

/// Error returned when executing a query fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    /// A function call in SELECT without a GROUP BY clause.
    #[error("aggregate used without GROUP BY: {0}")]
    AggregateWithoutGroupBy(String),
    /// A function that is not COUNT or SUM.
    #[error("unknown aggregate function: {0}")]
    UnknownAggregateFunction(String),
    /// An aggregate called with the wrong number of arguments.
    #[error("{function} expects {expected} argument(s), got {found}")]
    InvalidAggregateArity {
        /// Function name as written.
        function: String,
        /// Required argument count.
        expected: usize,
        /// Argument count in the query.
        found: usize,
    },
    /// A function call passed as the argument of an aggregate.
    #[error("aggregate not allowed inside an aggregate: {0}")]
    NestedAggregate(String),
    /// A function call used as a GROUP BY key.
    #[error("aggregate not allowed in GROUP BY: {0}")]
    AggregateInGroupBy(String),
}

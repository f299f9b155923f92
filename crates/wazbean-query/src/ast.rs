//! BQL Abstract Syntax Tree types.
//!
//! The serialized form of [`Query`] is a stable JSON shape:
//!
//! ```text
//! {
//!   "select":      [Expression, ...],
//!   "from":        "prefix",            // omitted when empty
//!   "where":       Expression,          // always present
//!   "where_field": "field",             // omitted when empty
//!   "group_by":    [Expression, ...],   // omitted when empty
//!   "order_by":    [OrderBy, ...]       // omitted when empty
//! }
//! ```
//!
//! An [`Expression`] serializes as `{"literal": "..."}` or
//! `{"func_name": "...", "func_args": [...]}`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A complete BQL query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Target expressions, in output column order.
    pub select: Vec<Expression>,
    /// Account prefix for transaction-level filtering. Empty means no filter.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub from: String,
    /// Posting-level equality predicate.
    #[serde(flatten)]
    pub predicate: Predicate,
    /// GROUP BY expressions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<Expression>,
    /// ORDER BY keys, most significant first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
}

/// An expression in BQL: a bare identifier or a function call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ExpressionRepr", try_from = "ExpressionRepr")]
pub enum Expression {
    /// Field name, `*`, or a string value. The empty literal is the zero value.
    Literal(String),
    /// Function call such as `SUM(amount)`.
    Call(FunctionCall),
}

/// A function call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    /// Function name as written.
    pub name: String,
    /// Arguments.
    pub args: Vec<Expression>,
}

/// ORDER BY specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Expression to order by.
    pub expression: Expression,
    /// Sort direction; ascending unless `DESC` was given.
    pub ascending: bool,
}

/// The `WHERE field = 'value'` predicate.
///
/// Both parts empty means no filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    /// Value to compare against.
    #[serde(rename = "where", default)]
    pub value: Expression,
    /// Field name to compare.
    #[serde(rename = "where_field", default, skip_serializing_if = "String::is_empty")]
    pub field: String,
}

/// Wire form of [`Expression`].
#[derive(Serialize, Deserialize, Default)]
struct ExpressionRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    literal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    func_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    func_args: Vec<Expression>,
}

impl From<Expression> for ExpressionRepr {
    fn from(expr: Expression) -> Self {
        match expr {
            Expression::Literal(s) => Self {
                literal: Some(s),
                ..Self::default()
            },
            Expression::Call(call) => Self {
                literal: None,
                func_name: Some(call.name),
                func_args: call.args,
            },
        }
    }
}

impl TryFrom<ExpressionRepr> for Expression {
    type Error = String;

    fn try_from(repr: ExpressionRepr) -> Result<Self, Self::Error> {
        match (repr.literal, repr.func_name) {
            (Some(_), Some(_)) => {
                Err("expression cannot have both a literal and a function name".to_string())
            }
            (Some(literal), None) => Ok(Self::Literal(literal)),
            (None, Some(name)) => Ok(Self::Call(FunctionCall {
                name,
                args: repr.func_args,
            })),
            (None, None) => Ok(Self::empty()),
        }
    }
}

impl Query {
    /// Create a query selecting the given expressions, with every clause empty.
    pub fn new(select: Vec<Expression>) -> Self {
        Self {
            select,
            from: String::new(),
            predicate: Predicate::empty(),
            group_by: Vec::new(),
            order_by: Vec::new(),
        }
    }

    /// Set the FROM account prefix.
    pub fn from(mut self, prefix: impl Into<String>) -> Self {
        self.from = prefix.into();
        self
    }

    /// Set the WHERE predicate.
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.predicate = Predicate::new(field, value);
        self
    }

    /// Set the GROUP BY clause.
    pub fn group_by(mut self, exprs: Vec<Expression>) -> Self {
        self.group_by = exprs;
        self
    }

    /// Set the ORDER BY clause.
    pub fn order_by(mut self, keys: Vec<OrderBy>) -> Self {
        self.order_by = keys;
        self
    }
}

impl Expression {
    /// The empty expression used for omitted clauses.
    pub const fn empty() -> Self {
        Self::Literal(String::new())
    }

    /// Create a literal expression.
    pub fn literal(s: impl Into<String>) -> Self {
        Self::Literal(s.into())
    }

    /// Create a function call.
    pub fn call(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Call(FunctionCall {
            name: name.into(),
            args,
        })
    }

    /// The literal text, if this is a literal.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(s) => Some(s),
            Self::Call(_) => None,
        }
    }

    /// Returns true for function calls.
    pub const fn is_call(&self) -> bool {
        matches!(self, Self::Call(_))
    }

    /// Returns true for the empty literal.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Literal(s) if s.is_empty())
    }

    /// Output column header: the identifier itself, or
    /// `lower(name)(arg1, arg2, ...)` for a call.
    pub fn column_name(&self) -> String {
        match self {
            Self::Literal(s) => s.clone(),
            Self::Call(call) => {
                let args: Vec<String> = call.args.iter().map(Self::column_name).collect();
                format!("{}({})", call.name.to_lowercase(), args.join(", "))
            }
        }
    }
}

impl Default for Expression {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(s) => write!(f, "{s}"),
            Self::Call(call) => {
                write!(f, "{}(", call.name)?;
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl OrderBy {
    /// Create an ascending order key.
    pub const fn asc(expression: Expression) -> Self {
        Self {
            expression,
            ascending: true,
        }
    }

    /// Create a descending order key.
    pub const fn desc(expression: Expression) -> Self {
        Self {
            expression,
            ascending: false,
        }
    }
}

impl Predicate {
    /// The vacuous predicate: empty field, empty literal.
    pub const fn empty() -> Self {
        Self {
            value: Expression::empty(),
            field: String::new(),
        }
    }

    /// Create a `field = 'value'` predicate.
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            value: Expression::Literal(value.into()),
            field: field.into(),
        }
    }

    /// Returns true if this predicate filters nothing.
    pub fn is_vacuous(&self) -> bool {
        self.field.is_empty() && self.value.is_empty()
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Self::empty()
    }
}

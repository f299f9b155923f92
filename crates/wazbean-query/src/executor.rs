//! BQL Query Executor.
//!
//! Executes parsed BQL queries against an in-memory [`Ledger`]. The pipeline
//! is strictly ordered:
//!
//! 1. one row per posting, in ledger order
//! 2. `FROM` keeps whole transactions with any posting under the prefix
//! 3. `WHERE` keeps rows whose field equals the literal exactly
//! 4. projection, or grouping with `COUNT`/`SUM` when `GROUP BY` is present
//! 5. stable `ORDER BY` over the output columns

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use wazbean_core::{Ledger, Posting, Transaction};

use crate::ast::{Expression, FunctionCall, OrderBy, Predicate, Query};
use crate::error::ExecError;

/// A value in a query result cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Numeric value.
    Number(f64),
    /// String value.
    Text(String),
    /// Absent value, e.g. the amount of an auto-balanced posting.
    Null,
}

impl Value {
    /// The value as a number, if it is one or its text parses as one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.parse().ok(),
            Self::Null => None,
        }
    }

    /// Returns true for [`Value::Null`].
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Null => Ok(()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// A row of query results.
pub type Row = Vec<Value>;

/// Query result containing column names and rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names, in SELECT order.
    pub columns: Vec<String>,
    /// Result rows, each as wide as `columns`.
    pub rows: Vec<Row>,
}

impl QueryResult {
    /// Create a new empty result.
    pub const fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Add a row to the result.
    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the result is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column with the given name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Context for a single posting being evaluated.
#[derive(Debug, Clone, Copy)]
pub struct PostingContext<'a> {
    /// The transaction this posting belongs to.
    pub transaction: &'a Transaction,
    /// The posting itself.
    pub posting: &'a Posting,
}

/// Fields a query can read from a posting row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Account,
    Currency,
    Date,
    Payee,
    Narration,
    Flag,
    Amount,
    Position,
}

impl Field {
    /// Case-insensitive field lookup.
    fn lookup(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "account" => Some(Self::Account),
            "currency" => Some(Self::Currency),
            "date" => Some(Self::Date),
            "payee" => Some(Self::Payee),
            "narration" => Some(Self::Narration),
            "flag" => Some(Self::Flag),
            "amount" => Some(Self::Amount),
            "position" => Some(Self::Position),
            _ => None,
        }
    }
}

impl PostingContext<'_> {
    /// String form of a field, as compared by `WHERE`.
    ///
    /// Only the string fields take part; anything else resolves to "".
    fn text_field(&self, name: &str) -> String {
        match Field::lookup(name) {
            Some(Field::Account) => self.posting.account.clone(),
            Some(Field::Currency) => self.currency().to_string(),
            Some(Field::Date) => self.transaction.date.to_string(),
            Some(Field::Payee) => self.transaction.payee_or_empty().to_string(),
            Some(Field::Narration) => self.transaction.narration.clone(),
            Some(Field::Flag) => self.transaction.flag.to_string(),
            Some(Field::Amount | Field::Position) | None => String::new(),
        }
    }

    /// Typed field value, as used by projection, grouping and ordering.
    ///
    /// Unrecognized names come back as literal text.
    fn value(&self, name: &str) -> Value {
        match Field::lookup(name) {
            Some(Field::Amount) => self
                .posting
                .amount()
                .map_or(Value::Null, |units| Value::Number(units.to_f64())),
            Some(Field::Position) => Value::Text(
                self.posting
                    .amount()
                    .map(wazbean_core::Amount::to_fixed_string)
                    .unwrap_or_default(),
            ),
            Some(_) => Value::Text(self.text_field(name)),
            None => Value::Text(name.to_string()),
        }
    }

    fn currency(&self) -> &str {
        self.posting
            .amount()
            .map_or("", |units| units.currency.as_str())
    }
}

/// Query executor.
pub struct Executor<'a> {
    /// The ledger to query over.
    ledger: &'a Ledger,
}

impl<'a> Executor<'a> {
    /// Create a new executor over the given ledger.
    pub const fn new(ledger: &'a Ledger) -> Self {
        Self { ledger }
    }

    /// Execute a query and return the results.
    ///
    /// # Errors
    ///
    /// Returns `ExecError` for an aggregate without `GROUP BY`, an aggregate
    /// nested in another, an unknown aggregate function, or an aggregate with
    /// the wrong number of arguments.
    pub fn execute(&self, query: &Query) -> Result<QueryResult, ExecError> {
        let columns = query.select.iter().map(Expression::column_name).collect();
        let mut result = QueryResult::new(columns);

        if query.group_by.is_empty() {
            if let Some(call) = query.select.iter().find(|e| e.is_call()) {
                return Err(ExecError::AggregateWithoutGroupBy(call.to_string()));
            }
        }
        if let Some(call) = query.group_by.iter().find(|e| e.is_call()) {
            return Err(ExecError::AggregateInGroupBy(call.to_string()));
        }
        let nested = query.select.iter().find_map(|e| match e {
            Expression::Call(func) => func.args.iter().find(|arg| arg.is_call()),
            Expression::Literal(_) => None,
        });
        if let Some(inner) = nested {
            return Err(ExecError::NestedAggregate(inner.to_string()));
        }

        let postings = self.collect_postings(&query.from, &query.predicate);

        if query.group_by.is_empty() {
            for ctx in &postings {
                result.add_row(Self::evaluate_row(&query.select, ctx));
            }
        } else {
            let grouped = Self::group_postings(&postings, &query.group_by);
            debug!(groups = grouped.len(), "grouped postings");
            for group in grouped {
                let row = Self::evaluate_aggregate_row(&query.select, &group)?;
                result.add_row(row);
            }
        }

        Self::sort_results(&mut result, &query.order_by);

        debug!(
            columns = result.columns.len(),
            rows = result.len(),
            "executed query"
        );
        Ok(result)
    }

    /// Build posting rows and apply the FROM and WHERE filters.
    fn collect_postings(&self, from: &str, predicate: &Predicate) -> Vec<PostingContext<'a>> {
        let mut postings = Vec::new();
        for transaction in &self.ledger.transactions {
            if !from.is_empty() && !transaction.touches_account_prefix(from) {
                continue;
            }
            for posting in &transaction.postings {
                postings.push(PostingContext {
                    transaction,
                    posting,
                });
            }
        }
        debug!(rows = postings.len(), from, "collected postings");

        if !predicate.is_vacuous() {
            let expected = predicate.value.as_literal().unwrap_or_default();
            postings.retain(|ctx| ctx.text_field(&predicate.field) == expected);
            debug!(
                rows = postings.len(),
                field = %predicate.field,
                "applied WHERE filter"
            );
        }
        postings
    }

    /// Evaluate a non-aggregate expression against one row.
    fn evaluate_expr(expr: &Expression, ctx: &PostingContext<'_>) -> Result<Value, ExecError> {
        match expr {
            Expression::Literal(name) => Ok(ctx.value(name)),
            Expression::Call(_) => Err(ExecError::AggregateWithoutGroupBy(expr.to_string())),
        }
    }

    /// Project one row. Calls are rejected before projection starts.
    fn evaluate_row(select: &[Expression], ctx: &PostingContext<'_>) -> Row {
        select
            .iter()
            .map(|expr| match expr {
                Expression::Literal(name) => ctx.value(name),
                Expression::Call(_) => Value::Null,
            })
            .collect()
    }

    /// Partition rows by their GROUP BY values, keeping first-seen order.
    fn group_postings<'b>(
        postings: &'b [PostingContext<'a>],
        group_by: &[Expression],
    ) -> Vec<Vec<&'b PostingContext<'a>>> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<Vec<&PostingContext<'a>>> = Vec::new();

        for ctx in postings {
            let key: Vec<Value> = group_by
                .iter()
                .map(|expr| match expr {
                    Expression::Literal(name) => ctx.value(name),
                    Expression::Call(_) => Value::Null,
                })
                .collect();
            let key = format!("{key:?}");
            match index.get(&key) {
                Some(&i) => groups[i].push(ctx),
                None => {
                    index.insert(key, groups.len());
                    groups.push(vec![ctx]);
                }
            }
        }

        groups
    }

    /// Evaluate a row of aggregate results.
    fn evaluate_aggregate_row(
        select: &[Expression],
        group: &[&PostingContext<'_>],
    ) -> Result<Row, ExecError> {
        select
            .iter()
            .map(|expr| Self::evaluate_aggregate_expr(expr, group))
            .collect()
    }

    /// Evaluate an expression over a whole group.
    ///
    /// Non-aggregate expressions read the group's first row.
    fn evaluate_aggregate_expr(
        expr: &Expression,
        group: &[&PostingContext<'_>],
    ) -> Result<Value, ExecError> {
        match expr {
            Expression::Literal(name) => Ok(group.first().map_or(Value::Null, |ctx| ctx.value(name))),
            Expression::Call(func) => Self::evaluate_aggregate(func, group),
        }
    }

    fn evaluate_aggregate(
        func: &FunctionCall,
        group: &[&PostingContext<'_>],
    ) -> Result<Value, ExecError> {
        match func.name.to_uppercase().as_str() {
            "COUNT" => Ok(Value::Number(group.len() as f64)),
            "SUM" => {
                if func.args.len() != 1 {
                    return Err(ExecError::InvalidAggregateArity {
                        function: func.name.clone(),
                        expected: 1,
                        found: func.args.len(),
                    });
                }
                let mut total = 0.0;
                for ctx in group {
                    // Absent and textual values contribute nothing
                    if let Value::Number(n) = Self::evaluate_expr(&func.args[0], ctx)? {
                        total += n;
                    }
                }
                Ok(Value::Number(total))
            }
            _ => Err(ExecError::UnknownAggregateFunction(func.name.clone())),
        }
    }

    /// Sort results by ORDER BY keys.
    ///
    /// Keys that name no output column are skipped.
    fn sort_results(result: &mut QueryResult, order_by: &[OrderBy]) {
        let sort_specs: Vec<(usize, bool)> = order_by
            .iter()
            .filter_map(|spec| {
                let name = spec.expression.column_name();
                let idx = result.column_index(&name);
                if idx.is_none() {
                    debug!(column = %name, "ORDER BY key not in SELECT, ignored");
                }
                idx.map(|idx| (idx, spec.ascending))
            })
            .collect();

        if sort_specs.is_empty() {
            return;
        }

        // sort_by is stable: rows that tie on every key keep their order
        result.rows.sort_by(|a, b| {
            for &(idx, ascending) in &sort_specs {
                let ord = compare_values_for_sort(&a[idx], &b[idx]);
                if ord != Ordering::Equal {
                    return if ascending { ord } else { ord.reverse() };
                }
            }
            Ordering::Equal
        });
    }
}

/// Execute a query against a ledger.
///
/// # Errors
///
/// See [`Executor::execute`].
pub fn execute(query: &Query, ledger: &Ledger) -> Result<QueryResult, ExecError> {
    Executor::new(ledger).execute(query)
}

/// Numeric comparison when both sides are numbers, otherwise compare the
/// rendered strings. Nulls rank after every other value.
fn compare_values_for_sort(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        _ => match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => left.to_string().cmp(&right.to_string()),
        },
    }
}

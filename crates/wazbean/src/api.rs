//! JSON entry points.
//!
//! Every function here takes plain text and returns a JSON document. Failures
//! never escape as panics or `Err`; they come back as `{"error": "..."}`,
//! and a document never carries both an error and a result.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use wazbean_loader::LoadError;
use wazbean_query::{ExecError, ParseError, QueryResult};

/// Errors from the parse, load, and execute pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The query text did not parse.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    /// The ledger text could not be read.
    #[error("ledger error: {0}")]
    Ledger(#[from] LoadError),
    /// The query was rejected by the executor.
    #[error("execution error: {0}")]
    Execution(#[from] ExecError),
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: &'a str,
}

fn error_json(message: &str) -> String {
    serde_json::to_string(&ErrorEnvelope { error: message })
        .unwrap_or_else(|_| String::from(r#"{"error":"serialization error"}"#))
}

fn to_json<T: Serialize>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => error_json(&format!("serialization error: {e}")),
    }
}

/// Parse the query, load the ledger, and execute, in that order.
///
/// The first failing stage wins.
pub fn run_query(query_text: &str, ledger_text: &str) -> Result<QueryResult, Error> {
    let query = wazbean_query::parse(query_text)?;
    let ledger = wazbean_loader::load(ledger_text)?;
    let result = wazbean_query::execute(&query, &ledger)?;
    debug!(
        transactions = ledger.len(),
        rows = result.len(),
        "query executed"
    );
    Ok(result)
}

/// Run a query against ledger text and serialize the outcome.
///
/// Success is `{"columns":[...],"rows":[[...]]}`; failure is
/// `{"error":"<stage> error: <message>"}`.
pub fn execute_query_text(query_text: &str, ledger_text: &str) -> String {
    match run_query(query_text, ledger_text) {
        Ok(result) => to_json(&result),
        Err(e) => error_json(&e.to_string()),
    }
}

/// Parse a query and serialize its AST.
pub fn parse_query_to_json(query_text: &str) -> String {
    match wazbean_query::parse(query_text) {
        Ok(query) => to_json(&query),
        Err(e) => error_json(&e.to_string()),
    }
}

/// Run the syntax checker and serialize its report as
/// `{"valid":bool,"errors":[{"line":n,"message":"..."}]}`.
pub fn check_syntax_to_json(ledger_text: &str) -> String {
    to_json(&wazbean_loader::check_syntax(ledger_text))
}

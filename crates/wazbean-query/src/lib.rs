//! BQL query engine for wazbean.
//!
//! This crate provides a small SQL-like query language for selecting,
//! filtering, grouping and ordering the postings of a [`Ledger`](wazbean_core::Ledger).
//!
//! # Overview
//!
//! Query text goes through three stages:
//!
//! - [`lexer`] turns text into keyword, identifier, string and punctuation tokens
//! - [`parser`] builds a [`Query`] from the tokens
//! - [`executor`] runs the query against a ledger and returns a [`QueryResult`]
//!
//! Both [`parse`] and [`execute`] are pure: they never touch the filesystem and
//! keep no state between calls.
//!
//! # Example
//!
//! ```
//! use wazbean_core::{Amount, Ledger, NaiveDate, Posting, Transaction};
//! use wazbean_query::{execute, parse, Value};
//! use rust_decimal_macros::dec;
//!
//! let ledger: Ledger = std::iter::once(
//!     Transaction::new(NaiveDate::from_ymd_opt(2024, 2, 25).unwrap(), "February rent")
//!         .with_posting(Posting::new("Expenses:Rent", Amount::new(dec!(1500.00), "USD")))
//!         .with_posting(Posting::auto("Assets:BofA:Checking")),
//! )
//! .collect();
//!
//! let query = parse("SELECT account, amount WHERE account = 'Expenses:Rent'").unwrap();
//! let result = execute(&query, &ledger).unwrap();
//! assert_eq!(result.columns, vec!["account", "amount"]);
//! assert_eq!(result.rows, vec![vec![Value::from("Expenses:Rent"), Value::Number(1500.0)]]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ast;
pub mod error;
pub mod executor;
pub mod lexer;
pub mod parser;

pub use ast::*;
pub use error::{ExecError, ParseError, ParseErrorKind};
pub use executor::{execute, Executor, QueryResult, Row, Value};
pub use parser::parse;

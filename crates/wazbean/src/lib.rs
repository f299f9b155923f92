//! wazbean: BQL queries over plain-text ledgers.
//!
//! The library exposes string-in, JSON-out entry points suitable for
//! embedding, plus the implementations behind the `wazbean-query` and
//! `wazbean-check` binaries.
//!
//! # Example
//!
//! ```
//! let ledger = "2024-02-25 * \"Landlord\" \"February rent\"\n  Expenses:Rent  1500.00 USD\n  Assets:Checking\n";
//! let json = wazbean::execute_query_text(
//!     "SELECT account, amount WHERE account = 'Expenses:Rent'",
//!     ledger,
//! );
//! assert_eq!(json, r#"{"columns":["account","amount"],"rows":[["Expenses:Rent",1500.0]]}"#);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod cmd;
pub mod report;

pub use api::{
    check_syntax_to_json, execute_query_text, parse_query_to_json, run_query, Error,
};

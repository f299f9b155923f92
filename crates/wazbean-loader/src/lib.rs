//! Ledger loader for wazbean.
//!
//! This crate turns ledger source text into a [`Ledger`] for the query
//! engine, and provides an independent line-by-line syntax checker.
//!
//! The reader is deliberately line-oriented:
//!
//! - Transaction headers look like `DATE FLAG "payee"? "narration"`
//! - Indented lines following a header are postings
//! - Every other directive line (`open`, `balance`, `option`, ...) is skipped
//! - Inline `;` comments outside of double quotes are ignored; a line that is
//!   only a comment ends the current transaction, like a blank line
//! - Amounts are exact decimals, so magnitudes beyond `Decimal::MAX`
//!   (about 7.9e28) are reported as [`LoadError::InvalidAmount`]
//!
//! # Example
//!
//! ```
//! use wazbean_loader::load;
//!
//! let ledger = load(
//!     "2024-02-25 * \"Landlord\" \"February rent\"\n  Expenses:Rent  1500.00 USD\n  Assets:Checking\n",
//! )
//! .unwrap();
//! assert_eq!(ledger.len(), 1);
//! assert_eq!(ledger.transactions[0].postings.len(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod lines;
pub mod syntax;

pub use syntax::{check_syntax, SyntaxIssue, SyntaxReport};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;
use wazbean_core::{Amount, Ledger, Posting, Transaction};

use crate::lines::{header_pattern, is_indented, posting_pattern, quoted_strings, strip_comment};

/// Errors that can occur during loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error reading a file.
    #[error("failed to read file {path}: {source}")]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A posting amount that is not a valid number, or too large for a
    /// 96-bit decimal.
    #[error("line {line}: invalid amount {amount:?}: {source}")]
    InvalidAmount {
        /// 1-based line number.
        line: usize,
        /// The offending amount text.
        amount: String,
        /// The underlying decimal parse error.
        #[source]
        source: rust_decimal::Error,
    },

    /// A transaction header with an impossible calendar date.
    #[error("line {line}: invalid date {date:?}")]
    InvalidDate {
        /// 1-based line number.
        line: usize,
        /// The offending date text.
        date: String,
    },
}

/// Load a ledger from source text.
///
/// # Errors
///
/// Returns [`LoadError::InvalidAmount`] for a posting whose amount is not a
/// number and [`LoadError::InvalidDate`] for an impossible header date.
pub fn load(source: &str) -> Result<Ledger, LoadError> {
    let mut ledger = Ledger::new();
    let mut current: Option<Transaction> = None;

    for (index, raw_line) in source.lines().enumerate() {
        let line_no = index + 1;

        // a comment-only line strips to nothing and ends the transaction
        let line = strip_comment(raw_line);
        if line.trim().is_empty() {
            ledger.transactions.extend(current.take());
            continue;
        }

        if let Some(caps) = header_pattern().captures(line) {
            ledger.transactions.extend(current.take());
            current = Some(parse_header(
                line_no,
                &caps[1],
                &caps[2],
                caps.get(3).map_or("", |m| m.as_str()),
            )?);
            continue;
        }

        if is_indented(line) {
            if let Some(txn) = current.as_mut() {
                if let Some(posting) = parse_posting(line_no, line)? {
                    txn.postings.push(posting);
                }
                continue;
            }
        }

        ledger.transactions.extend(current.take());
    }
    ledger.transactions.extend(current);

    debug!(
        transactions = ledger.len(),
        postings = ledger.postings().count(),
        "loaded ledger"
    );
    Ok(ledger)
}

/// Load a ledger from a file on disk.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read, or any error
/// [`load`] reports for its contents.
pub fn load_file(path: &Path) -> Result<Ledger, LoadError> {
    let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = source.len(), "read ledger file");
    load(&source)
}

fn parse_header(
    line_no: usize,
    date: &str,
    flag: &str,
    rest: &str,
) -> Result<Transaction, LoadError> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| LoadError::InvalidDate {
        line: line_no,
        date: date.to_string(),
    })?;

    let quoted = quoted_strings(rest);
    let (payee, narration) = match quoted.as_slice() {
        [narration] => (None, *narration),
        [payee, narration] => (Some(*payee), *narration),
        _ => (None, ""),
    };

    let mut txn =
        Transaction::new(date, narration).with_flag(flag.chars().next().unwrap_or('*'));
    if let Some(payee) = payee {
        txn = txn.with_payee(payee);
    }
    Ok(txn)
}

/// Parse an indented line as a posting.
///
/// Lines that do not look like postings (metadata, for instance) yield `None`.
fn parse_posting(line_no: usize, line: &str) -> Result<Option<Posting>, LoadError> {
    let Some(caps) = posting_pattern().captures(line) else {
        return Ok(None);
    };
    let account = &caps[1];

    match (caps.get(2), caps.get(3)) {
        (Some(number), Some(currency)) => {
            let number =
                Decimal::from_str(number.as_str()).map_err(|source| LoadError::InvalidAmount {
                    line: line_no,
                    amount: number.as_str().to_string(),
                    source,
                })?;
            Ok(Some(Posting::new(
                account,
                Amount::new(number, currency.as_str()),
            )))
        }
        _ => Ok(Some(Posting::auto(account))),
    }
}

//! Core types for wazbean
//!
//! This crate provides the ledger model queried by the BQL engine:
//!
//! - [`Amount`] - A decimal number with a currency
//! - [`Posting`] - One account movement within a transaction
//! - [`Transaction`] - A dated, flagged group of postings
//! - [`Ledger`] - An ordered list of transactions
//!
//! # Example
//!
//! ```
//! use wazbean_core::{Amount, Ledger, NaiveDate, Posting, Transaction};
//! use rust_decimal_macros::dec;
//!
//! let txn = Transaction::new(NaiveDate::from_ymd_opt(2024, 2, 25).unwrap(), "February rent")
//!     .with_payee("Landlord Properties LLC")
//!     .with_posting(Posting::new("Expenses:Rent", Amount::new(dec!(1500.00), "USD")))
//!     .with_posting(Posting::auto("Assets:BofA:Checking"));
//!
//! let ledger: Ledger = std::iter::once(txn).collect();
//! assert_eq!(ledger.postings().count(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod amount;
pub mod ledger;

pub use amount::Amount;
pub use ledger::{Ledger, Posting, Transaction};

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;

//! Transactions, postings and the ledger that holds them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Amount;

/// A posting within a transaction.
///
/// Postings represent the individual legs of a transaction. When `units` is
/// `None` the amount was omitted in the source (an auto-balancing leg); this
/// is distinct from an explicit zero amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// The account for this posting, e.g. `Expenses:Food:Groceries`
    pub account: String,
    /// The stated amount, if any
    pub units: Option<Amount>,
}

impl Posting {
    /// Create a new posting with the given account and amount.
    #[must_use]
    pub fn new(account: impl Into<String>, units: Amount) -> Self {
        Self {
            account: account.into(),
            units: Some(units),
        }
    }

    /// Create a posting without any amount.
    #[must_use]
    pub fn auto(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            units: None,
        }
    }

    /// Get the amount if one was stated.
    #[must_use]
    pub const fn amount(&self) -> Option<&Amount> {
        self.units.as_ref()
    }

    /// Whether an amount was stated for this posting.
    #[must_use]
    pub const fn has_amount(&self) -> bool {
        self.units.is_some()
    }
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {}", self.account)?;
        if let Some(units) = &self.units {
            write!(f, "  {units}")?;
        }
        Ok(())
    }
}

/// A transaction directive.
///
/// Transactions own their postings; a posting has no identity outside of the
/// transaction it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction date
    pub date: NaiveDate,
    /// Transaction flag (* or !)
    pub flag: char,
    /// Payee (optional)
    pub payee: Option<String>,
    /// Narration (description)
    pub narration: String,
    /// Postings (account entries)
    pub postings: Vec<Posting>,
}

impl Transaction {
    /// Create a new transaction.
    #[must_use]
    pub fn new(date: NaiveDate, narration: impl Into<String>) -> Self {
        Self {
            date,
            flag: '*',
            payee: None,
            narration: narration.into(),
            postings: Vec::new(),
        }
    }

    /// Set the flag.
    #[must_use]
    pub const fn with_flag(mut self, flag: char) -> Self {
        self.flag = flag;
        self
    }

    /// Set the payee.
    #[must_use]
    pub fn with_payee(mut self, payee: impl Into<String>) -> Self {
        self.payee = Some(payee.into());
        self
    }

    /// Add a posting.
    #[must_use]
    pub fn with_posting(mut self, posting: Posting) -> Self {
        self.postings.push(posting);
        self
    }

    /// The payee, or an empty string when none was given.
    #[must_use]
    pub fn payee_or_empty(&self) -> &str {
        self.payee.as_deref().unwrap_or_default()
    }

    /// Whether any posting's account starts with `prefix`.
    #[must_use]
    pub fn touches_account_prefix(&self, prefix: &str) -> bool {
        self.postings.iter().any(|p| p.account.starts_with(prefix))
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.date, self.flag)?;
        if let Some(payee) = &self.payee {
            write!(f, "\"{payee}\" ")?;
        }
        write!(f, "\"{}\"", self.narration)?;
        for posting in &self.postings {
            write!(f, "\n{posting}")?;
        }
        Ok(())
    }
}

/// An ordered list of transactions.
///
/// A ledger is immutable once built; queries only ever borrow it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    /// Transactions in source order
    pub transactions: Vec<Transaction>,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            transactions: Vec::new(),
        }
    }

    /// Append a transaction.
    pub fn push(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    /// Number of transactions.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the ledger holds no transactions.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Iterate over every posting paired with its transaction, in ledger order.
    pub fn postings(&self) -> impl Iterator<Item = (&Transaction, &Posting)> {
        self.transactions
            .iter()
            .flat_map(|txn| txn.postings.iter().map(move |p| (txn, p)))
    }
}

impl FromIterator<Transaction> for Ledger {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        Self {
            transactions: iter.into_iter().collect(),
        }
    }
}

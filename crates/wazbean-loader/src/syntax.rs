//! Line-by-line syntax checker.
//!
//! The checker is a standalone diagnostic: it reports every problem it can
//! find with a line number and never builds a [`Ledger`](wazbean_core::Ledger).

use serde::Serialize;
use tracing::debug;

use crate::lines::{directive_pattern, is_indented, posting_pattern, quoted_strings, strip_comment};

/// Dated directives other than transactions.
const KNOWN_DIRECTIVES: &[&str] = &[
    "open", "close", "balance", "pad", "event", "note", "document", "custom", "commodity",
    "price", "query", "plugin",
];

/// Directives that must name an account.
const ACCOUNT_DIRECTIVES: &[&str] = &["open", "close", "balance", "pad"];

/// Undated lines that end the current transaction.
const UNDATED_PREFIXES: &[&str] = &["option ", "include ", "plugin ", "poptag", "pushtag"];

/// A single syntax problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxIssue {
    /// 1-based line number.
    pub line: usize,
    /// Human-readable description.
    pub message: String,
}

/// Result of checking a ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyntaxReport {
    /// Whether no problems were found.
    pub valid: bool,
    /// Problems in the order they were found.
    pub errors: Vec<SyntaxIssue>,
}

impl SyntaxReport {
    fn push(&mut self, line: usize, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(SyntaxIssue {
            line,
            message: message.into(),
        });
    }
}

/// Tracks the transaction currently being read.
#[derive(Default)]
struct OpenTransaction {
    header_line: usize,
    postings: usize,
}

/// Check ledger text line by line.
pub fn check_syntax(source: &str) -> SyntaxReport {
    let mut report = SyntaxReport {
        valid: true,
        errors: Vec::new(),
    };
    let mut current: Option<OpenTransaction> = None;

    let close = |current: &mut Option<OpenTransaction>, report: &mut SyntaxReport| {
        if let Some(txn) = current.take() {
            if txn.postings == 0 {
                report.push(txn.header_line, "transaction has no postings");
            }
        }
    };

    for (index, line) in source.lines().enumerate() {
        let line_no = index + 1;
        let stripped = strip_comment(line);
        let trimmed = stripped.trim();

        if trimmed.is_empty()
            || trimmed.starts_with(';')
            || UNDATED_PREFIXES.iter().any(|p| trimmed.starts_with(p))
        {
            close(&mut current, &mut report);
            continue;
        }

        if is_indented(line) {
            match current.as_mut() {
                None => report.push(
                    line_no,
                    "unexpected indented line outside of a transaction",
                ),
                Some(txn) if posting_pattern().is_match(stripped) => txn.postings += 1,
                Some(_) => report.push(line_no, format!("invalid posting syntax: {trimmed}")),
            }
            continue;
        }

        close(&mut current, &mut report);

        let Some(caps) = directive_pattern().captures(stripped) else {
            report.push(line_no, format!("unrecognized line: {trimmed}"));
            continue;
        };
        let rest = caps.get(2).map_or("", |m| m.as_str()).trim();

        if rest.is_empty() {
            report.push(line_no, "missing directive after date");
            continue;
        }

        if let Some(after) = rest.strip_prefix(['*', '!']) {
            current = Some(OpenTransaction {
                header_line: line_no,
                postings: 0,
            });
            let after = after.trim();
            if after.is_empty() {
                report.push(line_no, "transaction missing narration");
            } else if quoted_strings(after).is_empty() {
                report.push(line_no, "transaction narration must be quoted");
            }
            continue;
        }

        let fields: Vec<&str> = rest.split_whitespace().collect();
        let directive = fields[0];
        if !KNOWN_DIRECTIVES.contains(&directive) {
            if directive.starts_with(['"', '\'']) {
                report.push(line_no, "transaction must have a flag (* or !)");
            } else {
                report.push(line_no, format!("unknown directive: {directive}"));
            }
            continue;
        }

        if ACCOUNT_DIRECTIVES.contains(&directive) && fields.len() < 2 {
            report.push(
                line_no,
                format!("{directive} directive requires an account"),
            );
        }
    }

    close(&mut current, &mut report);

    debug!(
        valid = report.valid,
        errors = report.errors.len(),
        "checked ledger syntax"
    );
    report
}

//! Error reporting with source context.
//!
//! Uses ariadne to point at the offending byte of a query or the offending
//! line of a ledger.

use std::io::Write;
use std::ops::Range;

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use wazbean_loader::SyntaxIssue;
use wazbean_query::{ParseError, ParseErrorKind};

fn config() -> Config {
    Config::default()
        .with_compact(false)
        .with_index_type(IndexType::Byte)
}

/// Short label placed under the error position.
fn parse_label(kind: &ParseErrorKind) -> &'static str {
    match kind {
        ParseErrorKind::UnterminatedString => "string starts here",
        ParseErrorKind::UnexpectedEof => "query ends here",
        ParseErrorKind::SyntaxError(_) => "unexpected token",
    }
}

/// Report a query parse error to the given writer.
pub fn report_query_error<W: Write>(
    error: &ParseError,
    name: &str,
    query: &str,
    writer: &mut W,
) -> std::io::Result<()> {
    let start = error.position.min(query.len());
    let end = (start + 1).min(query.len());

    Report::build(ReportKind::Error, (name, start..end))
        .with_message(&error.kind)
        .with_label(
            Label::new((name, start..end))
                .with_message(parse_label(&error.kind))
                .with_color(Color::Red),
        )
        .with_config(config())
        .finish()
        .write((name, Source::from(query)), &mut *writer)
}

/// Byte range of the 1-based `line` in `source`, without its line break.
fn line_span(source: &str, line: usize) -> Range<usize> {
    let mut offset = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let trimmed = text.trim_end_matches(['\n', '\r']);
            return offset..offset + trimmed.len();
        }
        offset += text.len();
    }
    source.len()..source.len()
}

/// Report syntax checker issues to the given writer.
///
/// Returns the number of issues written.
pub fn report_syntax_issues<W: Write>(
    issues: &[SyntaxIssue],
    path: &str,
    source: &str,
    writer: &mut W,
) -> std::io::Result<usize> {
    for issue in issues {
        let span = line_span(source, issue.line);
        Report::build(ReportKind::Error, (path, span.clone()))
            .with_message(&issue.message)
            .with_label(
                Label::new((path, span))
                    .with_message(format!("line {}", issue.line))
                    .with_color(Color::Red),
            )
            .with_config(config())
            .finish()
            .write((path, Source::from(source)), &mut *writer)?;
    }

    Ok(issues.len())
}

/// Print a one-line summary of the error count.
pub fn print_summary<W: Write>(errors: usize, writer: &mut W) -> std::io::Result<()> {
    if errors == 0 {
        writeln!(writer, "\x1b[32m\u{2713}\x1b[0m No errors found")
    } else {
        let error_text = if errors == 1 { "error" } else { "errors" };
        writeln!(writer, "\x1b[31m\u{2717}\x1b[0m {errors} {error_text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_span() {
        let source = "first\r\nsecond\nthird";
        assert_eq!(&source[line_span(source, 1)], "first");
        assert_eq!(&source[line_span(source, 2)], "second");
        assert_eq!(&source[line_span(source, 3)], "third");
        assert_eq!(line_span(source, 9), source.len()..source.len());
    }

    #[test]
    fn test_query_error_mentions_kind() {
        let query = "SELECT account FROM 'Expenses";
        let error = wazbean_query::parse(query).unwrap_err();

        let mut out = Vec::new();
        report_query_error(&error, "query", query, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("unterminated string literal"));
    }

    #[test]
    fn test_syntax_issues_count() {
        let source = "2024-01-01 open\n";
        let report = wazbean_loader::check_syntax(source);

        let mut out = Vec::new();
        let count = report_syntax_issues(&report.errors, "main.beancount", source, &mut out).unwrap();
        assert_eq!(count, 1);
        assert!(String::from_utf8(out)
            .unwrap()
            .contains("open directive requires an account"));
    }

    #[test]
    fn test_summary() {
        let mut out = Vec::new();
        print_summary(0, &mut out).unwrap();
        assert!(String::from_utf8_lossy(&out).contains("No errors found"));

        let mut out = Vec::new();
        print_summary(2, &mut out).unwrap();
        assert!(String::from_utf8_lossy(&out).contains("2 errors"));
    }
}

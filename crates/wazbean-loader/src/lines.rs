//! Line-level patterns shared by the loader and the syntax checker.

use regex::Regex;
use std::sync::OnceLock;

/// `DATE FLAG rest` transaction header.
pub fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4}-\d{2}-\d{2})\s+([*!])\s+(.*)$").expect("header pattern is valid")
    })
}

/// `DATE rest` for any dated directive.
pub fn directive_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4}-\d{2}-\d{2})\s+(.*)$").expect("directive pattern is valid")
    })
}

/// Indented `Account [NUMBER CURRENCY]` posting line.
pub fn posting_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^[ \t]+([A-Za-z][A-Za-z0-9:\-]*)(?:\s+(-?[0-9]+(?:\.[0-9]*)?)\s+([A-Z]+))?\s*$",
        )
        .expect("posting pattern is valid")
    })
}

fn quoted_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#""([^"]*)""#).expect("quoted pattern is valid"))
}

/// All double-quoted strings in `text`, without their quotes.
pub fn quoted_strings(text: &str) -> Vec<&str> {
    quoted_pattern()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Cut the line at the first `;` that is not inside double quotes.
pub fn strip_comment(line: &str) -> &str {
    let mut in_quote = false;
    for (i, ch) in line.char_indices() {
        match ch {
            '"' => in_quote = !in_quote,
            ';' if !in_quote => return &line[..i],
            _ => {}
        }
    }
    line
}

pub fn is_indented(line: &str) -> bool {
    line.starts_with([' ', '\t'])
}

//! BQL tokenizer built on Logos.
//!
//! Keywords are not separate Logos patterns: every bare word is scanned as an
//! identifier, then upper-cased and looked up in [`KEYWORDS`]. A keyword can
//! therefore never be used as a column name.

use logos::Logos;
use std::fmt;
use tracing::trace;

use crate::error::{ParseError, ParseErrorKind};

/// Token types produced by the BQL lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token<'src> {
    // ===== Literals =====
    /// A bare word: letters, `_` and `-`, plus digits after the first character.
    #[regex(r"[A-Za-z_-][A-Za-z0-9_-]*")]
    Ident(&'src str),

    /// A single-quoted string. The slice excludes the quotes.
    #[regex(r"'[^']*'", string_contents)]
    String(&'src str),

    /// A string literal that reaches end of input without its closing quote.
    #[regex(r"'[^']*")]
    UnterminatedString,

    /// A numeric literal. Never valid in a query; kept so the parser can name it.
    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number(&'src str),

    // ===== Punctuation =====
    /// `=`
    #[token("=")]
    Eq,
    /// `,`
    #[token(",")]
    Comma,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `*`
    #[token("*")]
    Star,

    // ===== Keywords (resolved from identifiers) =====
    /// `SELECT`
    Select,
    /// `FROM`
    From,
    /// `WHERE`
    Where,
    /// `GROUP`
    Group,
    /// `ORDER`
    Order,
    /// `BY`
    By,
    /// `ASC`
    Asc,
    /// `DESC`
    Desc,

    // ===== Special =====
    /// A character no pattern accepts. The parser rejects it.
    Unknown(&'src str),
    /// End of input.
    Eof,
}

fn string_contents<'src>(lex: &mut logos::Lexer<'src, Token<'src>>) -> &'src str {
    let quoted = lex.slice();
    &quoted[1..quoted.len() - 1]
}

/// Keyword table, keyed by upper-case spelling.
const KEYWORDS: &[(&str, Token<'static>)] = &[
    ("SELECT", Token::Select),
    ("FROM", Token::From),
    ("WHERE", Token::Where),
    ("GROUP", Token::Group),
    ("ORDER", Token::Order),
    ("BY", Token::By),
    ("ASC", Token::Asc),
    ("DESC", Token::Desc),
];

fn keyword(word: &str) -> Option<Token<'static>> {
    let upper = word.to_ascii_uppercase();
    KEYWORDS
        .iter()
        .find(|(spelling, _)| *spelling == upper)
        .map(|(_, token)| *token)
}

impl Token<'_> {
    /// Returns true if this is a keyword token.
    pub const fn is_keyword(&self) -> bool {
        matches!(
            self,
            Self::Select
                | Self::From
                | Self::Where
                | Self::Group
                | Self::Order
                | Self::By
                | Self::Asc
                | Self::Desc
        )
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(s) => write!(f, "identifier '{s}'"),
            Self::String(s) => write!(f, "string '{s}'"),
            Self::UnterminatedString => write!(f, "unterminated string"),
            Self::Number(s) => write!(f, "number {s}"),
            Self::Eq => write!(f, "'='"),
            Self::Comma => write!(f, "','"),
            Self::LParen => write!(f, "'('"),
            Self::RParen => write!(f, "')'"),
            Self::Star => write!(f, "'*'"),
            Self::Select => write!(f, "SELECT"),
            Self::From => write!(f, "FROM"),
            Self::Where => write!(f, "WHERE"),
            Self::Group => write!(f, "GROUP"),
            Self::Order => write!(f, "ORDER"),
            Self::By => write!(f, "BY"),
            Self::Asc => write!(f, "ASC"),
            Self::Desc => write!(f, "DESC"),
            Self::Unknown(s) => write!(f, "character '{s}'"),
            Self::Eof => write!(f, "end of input"),
        }
    }
}

/// A token paired with its byte offset span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpannedToken<'src> {
    /// The token.
    pub token: Token<'src>,
    /// Byte offset span (start, end).
    pub span: (usize, usize),
}

impl<'src> SpannedToken<'src> {
    /// Create a new spanned token.
    pub const fn new(token: Token<'src>, start: usize, end: usize) -> Self {
        Self {
            token,
            span: (start, end),
        }
    }
}

/// Tokenize query text.
///
/// The returned vector always ends with a [`Token::Eof`] positioned at the
/// end of the input.
///
/// # Errors
///
/// Fails with [`ParseErrorKind::UnterminatedString`] when a `'` has no
/// matching closing quote.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken<'_>>, ParseError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let token = match result {
            Ok(Token::Ident(word)) => keyword(word).unwrap_or(Token::Ident(word)),
            Ok(Token::UnterminatedString) => {
                return Err(ParseError::new(
                    ParseErrorKind::UnterminatedString,
                    span.start,
                ));
            }
            Ok(token) => token,
            Err(()) => Token::Unknown(lexer.slice()),
        };
        trace!(?token, start = span.start, "token");
        tokens.push(SpannedToken::new(token, span.start, span.end));
    }

    tokens.push(SpannedToken::new(Token::Eof, source.len(), source.len()));
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token<'_>> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            kinds("select From wHeRe group ORDER by asc DESC"),
            vec![
                Token::Select,
                Token::From,
                Token::Where,
                Token::Group,
                Token::Order,
                Token::By,
                Token::Asc,
                Token::Desc,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            kinds("account my_field cost-basis x2 selection"),
            vec![
                Token::Ident("account"),
                Token::Ident("my_field"),
                Token::Ident("cost-basis"),
                Token::Ident("x2"),
                Token::Ident("selection"),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_punctuation_and_strings() {
        assert_eq!(
            kinds("COUNT(*), a = 'Expenses:Food Stuff'"),
            vec![
                Token::Ident("COUNT"),
                Token::LParen,
                Token::Star,
                Token::RParen,
                Token::Comma,
                Token::Ident("a"),
                Token::Eq,
                Token::String("Expenses:Food Stuff"),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_empty_string_literal() {
        assert_eq!(kinds("''"), vec![Token::String(""), Token::Eof]);
    }

    #[test]
    fn test_numbers_and_unknown_characters_pass_through() {
        assert_eq!(
            kinds("123 4.5 ; \"x"),
            vec![
                Token::Number("123"),
                Token::Number("4.5"),
                Token::Unknown(";"),
                Token::Unknown("\""),
                Token::Ident("x"),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("SELECT account FROM 'Expenses:Cash").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnterminatedString));
        assert_eq!(err.position, 20);
    }

    #[test]
    fn test_spans_and_eof() {
        let tokens = tokenize("SELECT  account").unwrap();
        assert_eq!(tokens[0].span, (0, 6));
        assert_eq!(tokens[1].span, (8, 15));
        assert_eq!(tokens[2], SpannedToken::new(Token::Eof, 15, 15));
    }

    #[test]
    fn test_display() {
        assert_eq!(Token::Ident("x").to_string(), "identifier 'x'");
        assert_eq!(Token::Eof.to_string(), "end of input");
        assert!(Token::Desc.is_keyword());
        assert!(!Token::Star.is_keyword());
    }
}

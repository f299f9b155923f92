//! BQL Parser implementation.
//!
//! Query text is tokenized with Logos, then parsed with chumsky combinators
//! operating on the token slice:
//!
//! ```text
//! query       := SELECT select_list from_opt where_opt group_opt order_opt EOF
//! select_list := select_expr (',' select_expr)*
//! select_expr := IDENT | IDENT '(' select_list ')' | IDENT '(' '*' ')'
//! from_opt    := (FROM STRING)?
//! where_opt   := (WHERE IDENT '=' STRING)?
//! group_opt   := (GROUP BY select_list)?
//! order_opt   := (ORDER BY order_item (',' order_item)*)?
//! order_item  := select_expr (ASC | DESC)?
//! ```
//!
//! Every omitted clause maps to its explicit zero value.

use chumsky::prelude::*;
use tracing::debug;

use crate::ast::{Expression, OrderBy, Predicate, Query};
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{tokenize, SpannedToken, Token};

type Tokens<'src> = &'src [SpannedToken<'src>];

/// Type alias for parser extra with our token type.
type TokExtra<'src> = extra::Err<Rich<'src, SpannedToken<'src>>>;

/// Parse a BQL query string.
///
/// # Errors
///
/// Returns a `ParseError` for an unterminated string literal or any input
/// the grammar rejects. There is no partial result.
pub fn parse(source: &str) -> Result<Query, ParseError> {
    let tokens = tokenize(source)?;
    let (result, errs) = query_parser()
        .parse(tokens.as_slice())
        .into_output_errors();

    if let Some(query) = result {
        debug!(
            select = query.select.len(),
            group_by = query.group_by.len(),
            order_by = query.order_by.len(),
            "parsed query"
        );
        return Ok(query);
    }

    // `found` is unset when a filter rejects, so read the token at the span
    let err = errs.first().map(|e| match tokens.get(e.span().start) {
        None => ParseError::new(ParseErrorKind::UnexpectedEof, source.len()),
        Some(t) if t.token == Token::Eof => ParseError::new(ParseErrorKind::UnexpectedEof, t.span.0),
        Some(t) => ParseError::new(
            ParseErrorKind::SyntaxError(format!("unexpected {}", t.token)),
            t.span.0,
        ),
    });
    Err(err.unwrap_or_else(|| ParseError::new(ParseErrorKind::UnexpectedEof, source.len())))
}

// ============================================================================
// Token Matchers
// ============================================================================

macro_rules! tok_keyword {
    ($name:ident, $variant:ident) => {
        fn $name<'src>() -> impl Parser<'src, Tokens<'src>, (), TokExtra<'src>> + Clone {
            any()
                .filter(|t: &SpannedToken<'_>| matches!(t.token, Token::$variant))
                .to(())
        }
    };
}

tok_keyword!(tok_select, Select);
tok_keyword!(tok_from, From);
tok_keyword!(tok_where, Where);
tok_keyword!(tok_group, Group);
tok_keyword!(tok_order, Order);
tok_keyword!(tok_by, By);
tok_keyword!(tok_asc, Asc);
tok_keyword!(tok_desc, Desc);

macro_rules! tok_punct {
    ($name:ident, $variant:ident) => {
        fn $name<'src>() -> impl Parser<'src, Tokens<'src>, (), TokExtra<'src>> + Clone {
            any()
                .filter(|t: &SpannedToken<'_>| matches!(t.token, Token::$variant))
                .to(())
        }
    };
}

tok_punct!(tok_eq, Eq);
tok_punct!(tok_comma, Comma);
tok_punct!(tok_lparen, LParen);
tok_punct!(tok_rparen, RParen);
tok_punct!(tok_star, Star);
tok_punct!(tok_eof, Eof);

/// Match an identifier and extract its text.
fn tok_ident<'src>() -> impl Parser<'src, Tokens<'src>, &'src str, TokExtra<'src>> + Clone {
    any()
        .filter(|t: &SpannedToken<'_>| matches!(t.token, Token::Ident(_)))
        .try_map(|t: SpannedToken<'src>, span| match t.token {
            Token::Ident(s) => Ok(s),
            _ => Err(Rich::custom(span, "expected identifier")),
        })
}

/// Match a string literal and extract its contents.
fn tok_string<'src>() -> impl Parser<'src, Tokens<'src>, &'src str, TokExtra<'src>> + Clone {
    any()
        .filter(|t: &SpannedToken<'_>| matches!(t.token, Token::String(_)))
        .try_map(|t: SpannedToken<'src>, span| match t.token {
            Token::String(s) => Ok(s),
            _ => Err(Rich::custom(span, "expected string")),
        })
}

// ============================================================================
// Grammar
// ============================================================================

/// `IDENT`, `IDENT '(' select_list ')'` or `IDENT '(' '*' ')'`.
fn select_expr<'src>() -> impl Parser<'src, Tokens<'src>, Expression, TokExtra<'src>> + Clone {
    recursive(|expr| {
        let args = choice((
            tok_star().to(vec![Expression::literal("*")]),
            expr.separated_by(tok_comma()).at_least(1).collect::<Vec<_>>(),
        ))
        .delimited_by(tok_lparen(), tok_rparen());

        tok_ident()
            .then(args.or_not())
            .map(|(name, args)| match args {
                Some(args) => Expression::call(name, args),
                None => Expression::literal(name),
            })
    })
}

fn select_list<'src>() -> impl Parser<'src, Tokens<'src>, Vec<Expression>, TokExtra<'src>> + Clone
{
    select_expr()
        .separated_by(tok_comma())
        .at_least(1)
        .collect()
}

fn from_clause<'src>() -> impl Parser<'src, Tokens<'src>, String, TokExtra<'src>> + Clone {
    tok_from()
        .ignore_then(tok_string())
        .or_not()
        .map(|prefix| prefix.map_or_else(String::new, str::to_string))
}

fn where_clause<'src>() -> impl Parser<'src, Tokens<'src>, Predicate, TokExtra<'src>> + Clone {
    tok_where()
        .ignore_then(tok_ident())
        .then_ignore(tok_eq())
        .then(tok_string())
        .map(|(field, value)| Predicate::new(field, value))
        .or_not()
        .map(|predicate| predicate.unwrap_or_else(Predicate::empty))
}

fn group_by_clause<'src>(
) -> impl Parser<'src, Tokens<'src>, Vec<Expression>, TokExtra<'src>> + Clone {
    tok_group()
        .ignore_then(tok_by())
        .ignore_then(select_list())
        .or_not()
        .map(Option::unwrap_or_default)
}

fn order_by_clause<'src>() -> impl Parser<'src, Tokens<'src>, Vec<OrderBy>, TokExtra<'src>> + Clone
{
    let direction = choice((tok_asc().to(true), tok_desc().to(false)));
    let item = select_expr()
        .then(direction.or_not())
        .map(|(expression, ascending)| OrderBy {
            expression,
            ascending: ascending.unwrap_or(true),
        });

    tok_order()
        .ignore_then(tok_by())
        .ignore_then(item.separated_by(tok_comma()).at_least(1).collect::<Vec<_>>())
        .or_not()
        .map(Option::unwrap_or_default)
}

fn query_parser<'src>() -> impl Parser<'src, Tokens<'src>, Query, TokExtra<'src>> {
    tok_select()
        .ignore_then(select_list())
        .then(from_clause())
        .then(where_clause())
        .then(group_by_clause())
        .then(order_by_clause())
        .then_ignore(tok_eof())
        .then_ignore(end())
        .map(|((((select, from), predicate), group_by), order_by)| Query {
            select,
            from,
            predicate,
            group_by,
            order_by,
        })
}

use crate::types::Value;
use super::scan::{closing_paren, is_ident_char};
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while},
    character::complete::{alpha1, char, digit1, multispace0, multispace1, satisfy},
    combinator::{map, map_res, not, opt, recognize, verify},
    error::{ErrorKind, FromExternalError, ParseError},
    sequence::{delimited, pair, terminated, tuple},
    IResult,
};

/// Error produced by the statement grammars.
///
/// Plain mismatches let `alt` backtrack; the other variants are raised as
/// `nom::Err::Failure` and abort the parse with a specific error kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// Input did not match; carries the text where matching stopped
    Mismatch(String),
    Arity(String),
    Unsupported(String),
    /// Malformed WHERE/HAVING leaf
    Condition(String),
}

impl ParseError<&str> for GrammarError {
    fn from_error_kind(input: &str, _kind: ErrorKind) -> Self {
        Self::Mismatch(input.to_string())
    }

    fn append(_input: &str, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<E> FromExternalError<&str, E> for GrammarError {
    fn from_external_error(input: &str, _kind: ErrorKind, _e: E) -> Self {
        Self::Mismatch(input.to_string())
    }
}

pub type PResult<'a, O> = IResult<&'a str, O, GrammarError>;

pub fn failure<T>(error: GrammarError) -> Result<T, nom::Err<GrammarError>> {
    Err(nom::Err::Failure(error))
}

pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: FnMut(&'a str) -> PResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Case-insensitive keyword that must end on a word boundary
pub fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    terminated(tag_no_case(word), not(satisfy(is_ident_char)))
}

/// Whitespace-separated keyword sequence such as `GROUP BY`
pub fn phrase<'a>(words: &'static str) -> impl FnMut(&'a str) -> PResult<'a, ()> {
    move |mut input: &'a str| {
        for (i, word) in words.split_whitespace().enumerate() {
            if i > 0 {
                input = multispace1(input)?.0;
            }
            input = keyword(word)(input)?.0;
        }
        Ok((input, ()))
    }
}

const RESERVED: &[&str] = &[
    "SELECT", "DISTINCT", "FROM", "WHERE", "GROUP", "BY", "HAVING", "ORDER", "LIMIT", "OFFSET",
    "UNION", "ALL", "JOIN", "INNER", "LEFT", "RIGHT", "CROSS", "OUTER", "ON", "AS", "AND", "OR",
    "NOT", "IN", "IS", "NULL", "LIKE", "BETWEEN", "EXISTS", "ASC", "DESC", "VALUES", "SET",
    "INTO",
];

#[must_use]
pub fn is_reserved(word: &str) -> bool {
    RESERVED.iter().any(|kw| kw.eq_ignore_ascii_case(word))
}

pub fn identifier(input: &str) -> PResult<'_, String> {
    map(
        recognize(pair(alt((alpha1, tag("_"))), take_while(is_ident_char))),
        |s: &str| s.to_string(),
    )(input)
}

// Identifier that is not a reserved keyword, so clause anchors such as
// WHERE or NOT EXISTS are never read as names
pub fn non_keyword_identifier(input: &str) -> PResult<'_, String> {
    verify(identifier, |s: &String| !is_reserved(s))(input)
}

/// `column` or `table.column`
pub fn column_ref(input: &str) -> PResult<'_, String> {
    map(
        recognize(pair(
            non_keyword_identifier,
            opt(pair(char('.'), identifier)),
        )),
        |s: &str| s.to_string(),
    )(input)
}

/// Quoted literal in either quote style, read verbatim
pub fn string_literal(input: &str) -> PResult<'_, String> {
    map(
        alt((
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
        )),
        |s: &str| s.to_string(),
    )(input)
}

pub fn number(input: &str) -> PResult<'_, Value> {
    map_res(
        recognize(tuple((opt(char('-')), digit1, opt(pair(char('.'), digit1))))),
        |s: &str| -> Result<Value, std::num::ParseFloatError> {
            if let Ok(i) = s.parse::<i64>() {
                return Ok(Value::Integer(i));
            }
            s.parse::<f64>().map(Value::Real)
        },
    )(input)
}

pub fn literal(input: &str) -> PResult<'_, Value> {
    alt((
        map(keyword("NULL"), |_| Value::Null),
        map(string_literal, Value::Text),
        number,
    ))(input)
}

/// `( ... )` matched by depth counting; yields the text between the parens.
pub fn balanced(input: &str) -> PResult<'_, &str> {
    let (rest, _) = char('(')(input)?;
    match closing_paren(rest) {
        Some(end) => Ok((&rest[end + 1..], &rest[..end])),
        None => Err(nom::Err::Error(GrammarError::from_error_kind(
            input,
            ErrorKind::Char,
        ))),
    }
}

/// Whether parenthesized text is a nested SELECT rather than a value list
#[must_use]
pub fn is_subquery(inner: &str) -> bool {
    keyword("SELECT")(inner.trim_start()).is_ok()
}

//! Single-pass tokenizer for the FPLO input dialect.
//!
//! One pattern per token kind, compiled once and tried in a fixed priority
//! order against the remainder of the current line; the first kind whose
//! pattern matches at the current offset wins. A kind that matches the
//! generic identifier pattern but is not a registered keyword reports a
//! mismatch and falls through to the identifier kind. The final kind is a
//! rest-of-line catch-all, so a position that matches nothing at all can only
//! occur on degenerate input and is reported as `None`.
//!
//! All patterns are anchored at the start of the remainder; whatever leading
//! whitespace a pattern consumes stays part of the token's text.

use once_cell::sync::Lazy;
use regex::Regex;

use super::tokens::{DatatypeKeyword, Literal, Operator, StructuralKeyword, Token, TokenKind};

static LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"^\s*(?:"(?P<str_d>(?:\\.|[^"\\])*)""#,
        r#"|'(?P<str_s>(?:\\.|[^'\\])*)'"#,
        // digits followed by a decimal point, or directly by a signed exponent
        r"|(?P<float>[+-]?(?:\d+\.\d*(?:[eE][+-]\d+)?|\d+[eE][+-]\d+))",
        r"|0x(?P<hex>[0-9a-fA-F]+)",
        r"|0(?P<octal>[0-7]+)",
        r"|(?P<decimal>[+-]?\d+)",
        r"|(?P<logical>[tf])\b",
        // overflowed Fortran output field
        r"|(?P<overflow>\*+))",
    ))
    .unwrap()
});

// No leading whitespace: flag-value markers bind directly to the identifier.
static FLAG_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(([+-])\)").unwrap());

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)").unwrap());

static SUBSCRIPT_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[").unwrap());
static SUBSCRIPT_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\]").unwrap());

static OPERATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\+=|-=|=|,|-|\+|/|\*)").unwrap());

static BLOCK_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\{").unwrap());
static BLOCK_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\}").unwrap());
static STATEMENT_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*;").unwrap());

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?://|#|/\*)(?P<comment>[^\n]*)").unwrap());

static TRAILING_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+$").unwrap());

// Never consumes the line terminator, so the line still ends in a
// trailing-whitespace token and reassembly stays lossless.
static BAD_INPUT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\n]+").unwrap());

type Matcher = fn(&str) -> Option<Token>;

/// Token kinds in match priority order, highest first.
const MATCHERS: &[Matcher] = &[
    try_literal,
    try_flag_value,
    try_datatype,
    try_keyword,
    try_identifier,
    try_subscript_open,
    try_subscript_close,
    // comment before operator, so `//` is not read as two divisions
    try_comment,
    try_operator,
    try_block_open,
    try_block_close,
    try_statement_end,
    try_trailing_whitespace,
    try_bad_input,
];

/// Attempt to produce the next token of `line` starting at byte offset `pos`.
///
/// Returns the token together with the offset immediately following its
/// matched text, or `None` if no kind matches (the caller abandons the rest
/// of the line).
pub fn next_token(line: &str, pos: usize) -> Option<(Token, usize)> {
    let rest = &line[pos..];
    if rest.is_empty() {
        return None;
    }
    for matcher in MATCHERS {
        if let Some(token) = matcher(rest) {
            let end = pos + token.text.len();
            return Some((token, end));
        }
    }
    None
}

/// Tokenize one whole line, stopping early if a position matches nothing.
pub fn tokenize_line(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < line.len() {
        match next_token(line, pos) {
            Some((token, end)) => {
                tokens.push(token);
                pos = end;
            }
            None => break,
        }
    }
    tokens
}

fn token(kind: TokenKind, text: &str) -> Token {
    Token {
        kind,
        text: text.to_string(),
    }
}

fn try_literal(rest: &str) -> Option<Token> {
    let caps = LITERAL.captures(rest)?;
    let literal = if let Some(m) = caps.name("str_d") {
        Literal::Str(unescape(m.as_str()))
    } else if let Some(m) = caps.name("str_s") {
        Literal::Str(unescape(m.as_str()))
    } else if let Some(m) = caps.name("float") {
        Literal::Real(m.as_str().parse().ok()?)
    } else if let Some(m) = caps.name("hex") {
        Literal::Int(i64::from_str_radix(m.as_str(), 16).ok()?)
    } else if let Some(m) = caps.name("octal") {
        Literal::Int(i64::from_str_radix(m.as_str(), 8).ok()?)
    } else if let Some(m) = caps.name("decimal") {
        Literal::Int(m.as_str().parse().ok()?)
    } else if let Some(m) = caps.name("logical") {
        Literal::Bool(m.as_str() == "t")
    } else if caps.name("overflow").is_some() {
        Literal::Overflow
    } else {
        return None;
    };
    Some(token(TokenKind::Literal(literal), &caps[0]))
}

fn try_flag_value(rest: &str) -> Option<Token> {
    let caps = FLAG_VALUE.captures(rest)?;
    Some(token(TokenKind::FlagValue(&caps[1] == "+"), &caps[0]))
}

fn try_datatype(rest: &str) -> Option<Token> {
    let caps = WORD.captures(rest)?;
    let keyword = DatatypeKeyword::from_name(&caps[1])?;
    Some(token(TokenKind::Datatype(keyword), &caps[0]))
}

fn try_keyword(rest: &str) -> Option<Token> {
    let caps = WORD.captures(rest)?;
    let keyword = StructuralKeyword::from_name(&caps[1])?;
    Some(token(TokenKind::Keyword(keyword), &caps[0]))
}

fn try_identifier(rest: &str) -> Option<Token> {
    let caps = WORD.captures(rest)?;
    Some(token(TokenKind::Identifier(caps[1].to_string()), &caps[0]))
}

fn try_subscript_open(rest: &str) -> Option<Token> {
    let m = SUBSCRIPT_OPEN.find(rest)?;
    Some(token(TokenKind::SubscriptOpen, m.as_str()))
}

fn try_subscript_close(rest: &str) -> Option<Token> {
    let m = SUBSCRIPT_CLOSE.find(rest)?;
    Some(token(TokenKind::SubscriptClose, m.as_str()))
}

fn try_operator(rest: &str) -> Option<Token> {
    let caps = OPERATOR.captures(rest)?;
    let op = Operator::from_symbol(&caps[1])?;
    Some(token(TokenKind::Operator(op), &caps[0]))
}

fn try_block_open(rest: &str) -> Option<Token> {
    let m = BLOCK_OPEN.find(rest)?;
    Some(token(TokenKind::BlockOpen, m.as_str()))
}

fn try_block_close(rest: &str) -> Option<Token> {
    let m = BLOCK_CLOSE.find(rest)?;
    Some(token(TokenKind::BlockClose, m.as_str()))
}

fn try_statement_end(rest: &str) -> Option<Token> {
    let m = STATEMENT_END.find(rest)?;
    Some(token(TokenKind::StatementEnd, m.as_str()))
}

fn try_comment(rest: &str) -> Option<Token> {
    let caps = COMMENT.captures(rest)?;
    Some(token(
        TokenKind::Comment(caps["comment"].to_string()),
        &caps[0],
    ))
}

fn try_trailing_whitespace(rest: &str) -> Option<Token> {
    let m = TRAILING_WHITESPACE.find(rest)?;
    Some(token(TokenKind::TrailingWhitespace, m.as_str()))
}

fn try_bad_input(rest: &str) -> Option<Token> {
    let m = BAD_INPUT.find(rest)?;
    Some(token(
        TokenKind::BadInput(m.as_str().to_string()),
        m.as_str(),
    ))
}

/// Decode backslash-escaped quotes and backslashes inside a string literal.
/// Any other backslash sequence is kept as written.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(escaped @ ('"' | '\'' | '\\')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

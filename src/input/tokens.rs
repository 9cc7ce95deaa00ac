//! Token types for the FPLO input dialect.
//!
//! Every token owns the exact text span it matched, including any leading
//! whitespace its pattern consumed. Concatenating the `text` of all tokens
//! produced from a line therefore reproduces that line byte-for-byte, which
//! is what makes the annotated/highlighted line output lossless.

use serde::Serialize;
use std::fmt;

/// ANSI display markers used when annotating tokenized lines.
///
/// One start marker per token kind, one shared reset marker. Callers that
/// want plain output simply skip the highlighted form.
pub mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const FG_BLUE: &str = "\x1b[34m";
    pub const FG_YELLOW: &str = "\x1b[33m";
    pub const FG_MAGENTA: &str = "\x1b[35m";
    pub const FG_CYAN: &str = "\x1b[36m";
    pub const FG_BRIGHT_GREEN: &str = "\x1b[92m";
    pub const FG_BRIGHT_YELLOW: &str = "\x1b[93m";
    pub const FG_BRIGHT_CYAN: &str = "\x1b[96m";
    pub const BG_BLUE: &str = "\x1b[44m";
    pub const INVERT_FG_YELLOW: &str = "\x1b[7m\x1b[33m";
    pub const INVERT_FG_BRIGHT_RED: &str = "\x1b[7m\x1b[91m";
}

/// A decoded literal value.
///
/// `Overflow` is the sentinel for a run of `*` characters, which FPLO prints
/// when a Fortran output field overflows; it carries no numeric value and
/// callers treat it as "unavailable".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Str(String),
    Real(f64),
    Int(i64),
    Bool(bool),
    Overflow,
}

/// The datatype keywords of the dialect.
///
/// `Flag` is not a C primitive: it declares a set of named booleans whose
/// member names are only discovered from the assigned value list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DatatypeKeyword {
    Char,
    Int,
    Real,
    Logical,
    Flag,
}

impl DatatypeKeyword {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "char" => Some(Self::Char),
            "int" => Some(Self::Int),
            "real" => Some(Self::Real),
            "logical" => Some(Self::Logical),
            "flag" => Some(Self::Flag),
            _ => None,
        }
    }
}

/// The structural keywords of the dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StructuralKeyword {
    Section,
    Struct,
}

impl StructuralKeyword {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "section" => Some(Self::Section),
            "struct" => Some(Self::Struct),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    AddAssign,
    SubAssign,
    Assign,
    Comma,
    Minus,
    Plus,
    Slash,
    Star,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+=" => Some(Self::AddAssign),
            "-=" => Some(Self::SubAssign),
            "=" => Some(Self::Assign),
            "," => Some(Self::Comma),
            "-" => Some(Self::Minus),
            "+" => Some(Self::Plus),
            "/" => Some(Self::Slash),
            "*" => Some(Self::Star),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::Assign => "=",
            Self::Comma => ",",
            Self::Minus => "-",
            Self::Plus => "+",
            Self::Slash => "/",
            Self::Star => "*",
        }
    }
}

/// Classification of one lexical unit, with its decoded payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenKind {
    Literal(Literal),
    /// Flag-value marker `(+)` or `(-)`, decoded to the boolean it denotes.
    FlagValue(bool),
    Datatype(DatatypeKeyword),
    Keyword(StructuralKeyword),
    Identifier(String),
    SubscriptOpen,
    SubscriptClose,
    Operator(Operator),
    BlockOpen,
    BlockClose,
    StatementEnd,
    Comment(String),
    TrailingWhitespace,
    /// Catch-all for input no other kind matched; carries the offending text.
    BadInput(String),
}

impl TokenKind {
    /// Short kind name used in dumps and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Literal(_) => "literal",
            Self::FlagValue(_) => "flag-value",
            Self::Datatype(_) => "datatype",
            Self::Keyword(_) => "keyword",
            Self::Identifier(_) => "identifier",
            Self::SubscriptOpen => "subscript-open",
            Self::SubscriptClose => "subscript-close",
            Self::Operator(_) => "operator",
            Self::BlockOpen => "block-open",
            Self::BlockClose => "block-close",
            Self::StatementEnd => "statement-end",
            Self::Comment(_) => "comment",
            Self::TrailingWhitespace => "trailing-whitespace",
            Self::BadInput(_) => "bad-input",
        }
    }

    /// ANSI start marker for this kind of token.
    pub fn highlight_start(&self) -> &'static str {
        match self {
            Self::Literal(_) | Self::FlagValue(_) => ansi::FG_MAGENTA,
            Self::Datatype(_) => ansi::FG_YELLOW,
            Self::Keyword(_) => ansi::FG_BRIGHT_YELLOW,
            Self::Identifier(_) => ansi::FG_CYAN,
            Self::SubscriptOpen | Self::SubscriptClose => ansi::FG_BRIGHT_GREEN,
            Self::Operator(_) => ansi::INVERT_FG_YELLOW,
            Self::BlockOpen | Self::BlockClose => ansi::FG_BRIGHT_CYAN,
            Self::StatementEnd => ansi::FG_BRIGHT_YELLOW,
            Self::Comment(_) => ansi::FG_BLUE,
            Self::TrailingWhitespace => ansi::BG_BLUE,
            Self::BadInput(_) => ansi::INVERT_FG_BRIGHT_RED,
        }
    }
}

/// A classified unit of lexical input.
///
/// Immutable once constructed; ownership is transient, tokens are consumed
/// by the concrete-tree builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact matched text span, leading whitespace included.
    pub text: String,
}

impl Token {
    /// The matched text wrapped in the display markers for its kind.
    ///
    /// Trailing newlines are moved outside the reset marker so that the
    /// highlighting never spans a line break.
    pub fn highlighted(&self) -> String {
        let body = self.text.trim_end_matches('\n');
        let newlines = &self.text[body.len()..];
        format!(
            "{}{}{}{}",
            self.kind.highlight_start(),
            body,
            ansi::RESET,
            newlines
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Literal(lit) => write!(f, "{:>12} {:?}", "literal", lit),
            TokenKind::FlagValue(v) => write!(f, "{:>12} {}", "flag-value", v),
            TokenKind::Datatype(_) | TokenKind::Keyword(_) | TokenKind::Identifier(_) => {
                write!(f, "{:>12} {}", self.kind.name(), self.text.trim())
            }
            TokenKind::Operator(op) => write!(f, "{:>12} {}", "operator", op.symbol()),
            TokenKind::Comment(text) => write!(f, "{:>12} {}", "comment", text),
            TokenKind::BadInput(text) => write!(f, "{:>12} {:?}", "bad-input", text),
            other => write!(f, "{:>12}", other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlighted_keeps_newline_outside_markers() {
        let token = Token {
            kind: TokenKind::TrailingWhitespace,
            text: "  \n".to_string(),
        };
        assert_eq!(
            token.highlighted(),
            format!("{}  {}\n", ansi::BG_BLUE, ansi::RESET)
        );
    }

    #[test]
    fn keyword_tables_are_disjoint() {
        for name in ["char", "int", "real", "logical", "flag"] {
            assert!(DatatypeKeyword::from_name(name).is_some());
            assert!(StructuralKeyword::from_name(name).is_none());
        }
        for name in ["section", "struct"] {
            assert!(StructuralKeyword::from_name(name).is_some());
            assert!(DatatypeKeyword::from_name(name).is_none());
        }
    }
}

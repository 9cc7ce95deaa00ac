//! Error types for the input front end.
//!
//! Lexical mismatches are not represented here: they abandon the offending
//! line and flag the file as containing bad input, but the parse continues.
//! Everything in `ParseError` is fatal for the whole file or embedded block;
//! once the shape of a declaration or assignment cannot be determined,
//! nothing observed after it can be safely typed.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// `}` with no open block to close.
    UnmatchedBlockClose,
    /// `]` while the current scope is not a subscript.
    UnmatchedSubscriptClose,
    /// End of input with open `{`/`[` scopes remaining.
    UnclosedScopes { open: usize },
    /// A declaration's shape can be attached at most once.
    ShapeRedeclared { name: String },
    /// A statement starts with something that is neither a keyword nor a
    /// datatype.
    UnexpectedStatementHead { found: String },
    /// An item that cannot appear at this position of a statement.
    UnexpectedItem { found: String },
    /// Assignment with nothing after the `=`.
    MissingValue { name: String },
    /// Assignment with more than one value item after the `=`.
    ExtraValue { name: String },
    /// A flag value group that is not an identifier/marker pair.
    MalformedFlagGroup { found: String },
    /// A subscript item that does not denote an array dimension.
    InvalidShapeItem { found: String },
    /// A value block must contain exactly one statement.
    ValueBlockArity { statements: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnmatchedBlockClose => {
                write!(f, "unmatched '}}' with no open block")
            }
            ParseError::UnmatchedSubscriptClose => {
                write!(f, "unmatched ']' outside any subscript")
            }
            ParseError::UnclosedScopes { open } => {
                write!(f, "end of input with {} unclosed scope(s)", open)
            }
            ParseError::ShapeRedeclared { name } => {
                write!(f, "declaration '{}' already has a shape", name)
            }
            ParseError::UnexpectedStatementHead { found } => {
                write!(f, "statement does not start with a declaration: '{}'", found)
            }
            ParseError::UnexpectedItem { found } => {
                write!(f, "unexpected item following declaration: '{}'", found)
            }
            ParseError::MissingValue { name } => {
                write!(f, "missing value in assignment to '{}'", name)
            }
            ParseError::ExtraValue { name } => {
                write!(f, "too many values in assignment to '{}'", name)
            }
            ParseError::MalformedFlagGroup { found } => {
                write!(f, "flag value group is not a name/marker pair: {}", found)
            }
            ParseError::InvalidShapeItem { found } => {
                write!(f, "item does not denote an array dimension: '{}'", found)
            }
            ParseError::ValueBlockArity { statements } => {
                write!(
                    f,
                    "value block contains {} statements, expected exactly 1",
                    statements
                )
            }
        }
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

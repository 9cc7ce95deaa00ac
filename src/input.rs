//! Front end for the FPLO input-file dialect.
//!
//! Control flow: raw text lines arrive one at a time and are tokenized at the
//! current offset within the line ([`tokenizer`]); the builder ([`builder`])
//! consumes the tokens while maintaining a stack of open scopes and appends
//! them to the currently open statement of the concrete tree ([`cst`]); at
//! end of input the completed concrete tree is interpreted statement by
//! statement into typed semantic nodes ([`transform`], [`ast`]); the export
//! step ([`export`]) walks the AST to describe a schema or to produce data
//! events.
//!
//! Each stage only depends on the ones before it, and nothing here is shared
//! across input files: every file (or embedded block) gets its own parser
//! instance.

pub mod ast;
pub mod builder;
pub mod cst;
pub mod embedded;
pub mod error;
pub mod export;
pub mod tokenizer;
pub mod tokens;
pub mod transform;

pub use ast::{AstNode, AstRoot, Datatype, Declaration, ElementKind, Value};
pub use builder::{InputParser, NoHooks, ParseHooks, ParseOutcome};
pub use embedded::EmbeddedInputParser;
pub use error::{ParseError, ParseResult};
pub use export::{
    replay, schema_records, write_schema_json, DataEvent, DataSink, JsonEventSink, RecordingSink,
    SchemaKind, SchemaRecord,
};
pub use tokenizer::{next_token, tokenize_line};
pub use tokens::{DatatypeKeyword, Literal, Operator, StructuralKeyword, Token, TokenKind};

/// Parse a complete input text in one call.
///
/// Convenience wrapper over [`InputParser`] for callers that already hold the
/// whole file in memory; lines are still fed through the builder one at a
/// time, exactly as when reading incrementally.
pub fn parse_str(text: &str) -> ParseResult<ParseOutcome> {
    let mut parser = InputParser::new();
    parser.parse_str(text)?;
    parser.finish()
}

//! # fplo-parser
//!
//! A parser for the input files of the FPLO band-structure program.
//!
//! FPLO uses C-inspired input files. They are not quite C, so no conventional
//! C parser can be reused; among the more irregular features are nested
//! structs, arrays-of-struct, a `flag` pseudo-type whose members are only
//! known once its assigned value list is read, and fraction constants.
//!
//! The library is organized as a three-stage pipeline:
//! 1. a tokenizer for the C subset/dialect,
//! 2. an incremental builder that folds tokens into a concrete syntax tree,
//! 3. a transform from the concrete tree to an abstract syntax tree (AST),
//!
//! followed by an export step that either describes the input's schema or
//! replays the AST as data events against an external sink.
//!
//! The same dialect is echoed verbatim into FPLO's log output, so the parser
//! can also be driven line-by-line from within an embedded block of a larger
//! log stream (see [`input::embedded`]).

pub mod input;

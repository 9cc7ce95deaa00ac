//! Incremental concrete-tree builder.
//!
//! A line-driven stack machine with no backtracking: the only state is the
//! cursor denoting the currently open statement, block, or subscript. Each
//! line is tokenized at the current offset and every token is dispatched on
//! its kind; block and subscript tokens move the cursor, content tokens are
//! appended to it, and `;` closes the current statement and opens a sibling.
//!
//! Lexical failures abandon the remainder of the offending line and flag the
//! parse as containing bad input; the flag is surfaced once, at end of
//! input, through a hook. Structural errors (a closer with no matching
//! opener, open scopes at end of input) abort the whole parse.

use super::ast::AstRoot;
use super::cst::{ConcreteTree, NodeId, NodeKind};
use super::error::{ParseError, ParseResult};
use super::tokenizer::next_token;
use super::tokens::{Token, TokenKind};
use super::transform::build_ast;

/// Integration points for the surrounding log-stream matcher or CLI.
///
/// All methods default to no-ops; standalone parsing does not need any of
/// them.
pub trait ParseHooks {
    /// Called once per fully-terminated input line with the ANSI-highlighted
    /// rendition of that line.
    fn on_annotated_line(&mut self, _line: &str) {}
    /// Called once, at end of input, if any line produced bad input.
    fn on_bad_input(&mut self) {}
    /// Called once, at end of input, after the bad-input notification.
    fn on_end_of_file(&mut self) {}
}

/// Hook set that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl ParseHooks for NoHooks {}

/// Everything a finished parse produces.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    /// The completed concrete tree (kept for dumps and diagnostics).
    pub tree: ConcreteTree,
    pub ast: AstRoot,
    /// Data-quality warnings collected by the value evaluator.
    pub warnings: Vec<String>,
    /// Whether any line contained input no token kind recognized.
    pub bad_input: bool,
}

/// Stateful incremental parser for one input file or embedded block.
///
/// Feed lines with [`parse_line`](Self::parse_line) (or all at once with
/// [`parse_str`](Self::parse_str)), then call [`finish`](Self::finish)
/// exactly once. State is never shared across files; every input gets its
/// own instance.
pub struct InputParser<H: ParseHooks = NoHooks> {
    pub hooks: H,
    tree: ConcreteTree,
    cursor: NodeId,
    bad_input: bool,
    annotated_line: String,
}

impl InputParser<NoHooks> {
    pub fn new() -> Self {
        Self::with_hooks(NoHooks)
    }
}

impl Default for InputParser<NoHooks> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ParseHooks> InputParser<H> {
    pub fn with_hooks(hooks: H) -> Self {
        let tree = ConcreteTree::new();
        let cursor = tree.first_statement();
        InputParser {
            hooks,
            tree,
            cursor,
            bad_input: false,
            annotated_line: String::new(),
        }
    }

    /// Tokenize and fold one raw line into the concrete tree.
    ///
    /// A position no token kind matches abandons the remainder of the line
    /// and flags the parse; only structural errors are returned.
    pub fn parse_line(&mut self, line: &str) -> ParseResult<()> {
        let mut pos = 0;
        while pos < line.len() {
            let Some((token, end)) = next_token(line, pos) else {
                self.bad_input = true;
                break;
            };
            self.annotate(&token.highlighted());
            self.dispatch(token)?;
            pos = end;
        }
        Ok(())
    }

    /// Feed a whole text, line by line, terminators included.
    pub fn parse_str(&mut self, text: &str) -> ParseResult<()> {
        for line in text.split_inclusive('\n') {
            self.parse_line(line)?;
        }
        Ok(())
    }

    /// Finalize the parse: verify all scopes are closed, deliver the
    /// end-of-input notifications, and run the AST transform.
    ///
    /// The parser is spent afterwards; its tree moves into the outcome.
    pub fn finish(&mut self) -> ParseResult<ParseOutcome> {
        if !self.annotated_line.is_empty() {
            let pending = std::mem::take(&mut self.annotated_line);
            self.hooks.on_annotated_line(&pending);
        }
        let open = self.open_scopes();
        if open != 0 {
            return Err(ParseError::UnclosedScopes { open });
        }
        if self.bad_input {
            self.hooks.on_bad_input();
        }
        self.hooks.on_end_of_file();
        let tree = std::mem::take(&mut self.tree);
        let bundle = build_ast(&tree)?;
        Ok(ParseOutcome {
            tree,
            ast: bundle.root,
            warnings: bundle.warnings,
            bad_input: self.bad_input,
        })
    }

    /// Forward a raw line straight to the annotation callback, bypassing the
    /// tokenizer. Used for sentinel lines that delimit embedded blocks.
    pub(crate) fn forward_annotated_line(&mut self, line: &str) {
        self.hooks.on_annotated_line(line);
    }

    /// Number of `{`/`[` scopes still open at the cursor.
    fn open_scopes(&self) -> usize {
        let mut open = 0;
        let mut cursor = Some(self.cursor);
        while let Some(id) = cursor {
            if id != self.tree.root()
                && matches!(self.tree.kind(id), NodeKind::Block | NodeKind::Subscript)
            {
                open += 1;
            }
            cursor = self.tree.parent(id);
        }
        open
    }

    fn annotate(&mut self, highlighted: &str) {
        self.annotated_line.push_str(highlighted);
        if self.annotated_line.ends_with('\n') {
            let line = std::mem::take(&mut self.annotated_line);
            self.hooks.on_annotated_line(&line);
        }
    }

    fn dispatch(&mut self, token: Token) -> ParseResult<()> {
        match token.kind {
            TokenKind::BlockOpen => {
                let block = self.tree.push_node(self.cursor, NodeKind::Block);
                self.cursor = self.tree.push_node(block, NodeKind::Statement);
            }
            TokenKind::BlockClose => {
                // statement -> its block -> the statement holding the block
                let enclosing = self
                    .tree
                    .parent(self.cursor)
                    .filter(|_| self.tree.kind(self.cursor) == NodeKind::Statement)
                    .filter(|block| self.tree.kind(*block) == NodeKind::Block)
                    .and_then(|block| self.tree.parent(block));
                match enclosing {
                    Some(statement) => self.cursor = statement,
                    None => return Err(ParseError::UnmatchedBlockClose),
                }
            }
            TokenKind::SubscriptOpen => {
                self.cursor = self.tree.push_node(self.cursor, NodeKind::Subscript);
            }
            TokenKind::SubscriptClose => {
                if self.tree.kind(self.cursor) != NodeKind::Subscript {
                    return Err(ParseError::UnmatchedSubscriptClose);
                }
                // a subscript always has a parent statement
                self.cursor = self
                    .tree
                    .parent(self.cursor)
                    .ok_or(ParseError::UnmatchedSubscriptClose)?;
            }
            TokenKind::StatementEnd => {
                let parent = self
                    .tree
                    .parent(self.cursor)
                    .ok_or(ParseError::UnmatchedBlockClose)?;
                self.cursor = self.tree.push_node(parent, NodeKind::Statement);
            }
            TokenKind::Comment(_) | TokenKind::TrailingWhitespace => {}
            TokenKind::BadInput(_) => self.bad_input = true,
            kind @ (TokenKind::Literal(_)
            | TokenKind::FlagValue(_)
            | TokenKind::Datatype(_)
            | TokenKind::Keyword(_)
            | TokenKind::Identifier(_)
            | TokenKind::Operator(_)) => {
                self.tree.push_token(
                    self.cursor,
                    Token {
                        kind,
                        text: token.text,
                    },
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::cst::Item;

    fn parse(text: &str) -> ParseOutcome {
        let mut parser = InputParser::new();
        parser.parse_str(text).expect("structural error");
        parser.finish().expect("finish failed")
    }

    #[test]
    fn statement_end_opens_a_sibling_statement() {
        let outcome = parse("int a;\nint b;\n");
        let tree = &outcome.tree;
        // root: two filled statements plus the trailing empty one
        let statements: Vec<_> = tree
            .node(tree.root())
            .items
            .iter()
            .filter_map(|item| match item {
                Item::Node(id) => Some(*id),
                Item::Token(_) => None,
            })
            .collect();
        assert_eq!(statements.len(), 3);
        assert_eq!(tree.node(statements[0]).items.len(), 2);
        assert_eq!(tree.node(statements[1]).items.len(), 2);
        assert!(tree.node(statements[2]).items.is_empty());
    }

    #[test]
    fn comment_or_whitespace_only_lines_append_nothing() {
        let outcome = parse("   \n// just a comment\n# another\n");
        assert!(outcome.ast.children.is_empty());
        let tree = &outcome.tree;
        let stmt = tree.first_statement();
        assert!(tree.node(stmt).items.is_empty());
    }

    #[test]
    fn nesting_depth_tracks_open_scopes() {
        let mut parser = InputParser::new();
        parser.parse_line("section s {\n").unwrap();
        parser.parse_line("int a;\n").unwrap();
        // block still open
        assert!(matches!(
            parser.finish(),
            Err(ParseError::UnclosedScopes { open: 1 })
        ));
    }

    #[test]
    fn unmatched_block_close_is_fatal() {
        let mut parser = InputParser::new();
        let err = parser.parse_line("}\n").unwrap_err();
        assert_eq!(err, ParseError::UnmatchedBlockClose);
    }

    #[test]
    fn unmatched_subscript_close_is_fatal() {
        let mut parser = InputParser::new();
        let err = parser.parse_line("int x];\n").unwrap_err();
        assert_eq!(err, ParseError::UnmatchedSubscriptClose);
    }

    #[test]
    fn bad_input_flags_but_does_not_abort() {
        let outcome = parse("int a = 1;\n?!?\nint b = 2;\n");
        assert!(outcome.bad_input);
        assert_eq!(outcome.ast.children.len(), 2);
    }

    #[test]
    fn lines_split_across_statements_still_assemble() {
        let outcome = parse("int\nn\n=\n1;\n");
        assert_eq!(outcome.ast.children.len(), 1);
    }

    #[test]
    fn annotated_lines_are_delivered_per_line() {
        #[derive(Default)]
        struct Collect {
            lines: Vec<String>,
            bad: usize,
            eof: usize,
        }
        impl ParseHooks for Collect {
            fn on_annotated_line(&mut self, line: &str) {
                self.lines.push(line.to_string());
            }
            fn on_bad_input(&mut self) {
                self.bad += 1;
            }
            fn on_end_of_file(&mut self) {
                self.eof += 1;
            }
        }
        let mut parser = InputParser::with_hooks(Collect::default());
        parser.parse_str("int a = 1;\nint b = 2;\n").unwrap();
        let outcome = parser.finish().unwrap();
        assert!(!outcome.bad_input);
        assert_eq!(parser.hooks.lines.len(), 2);
        assert!(parser.hooks.lines[0].ends_with('\n'));
        assert_eq!(parser.hooks.bad, 0);
        assert_eq!(parser.hooks.eof, 1);
    }
}

//! Embedded input blocks inside a simulation log stream.
//!
//! FPLO echoes its input file verbatim into the log output. The surrounding
//! log matcher hands those lines over one at a time and the block ends at a
//! dashed separator line. The adapter feeds everything before the separator
//! into an [`InputParser`] and finalizes it exactly as for a standalone
//! file; the separator itself is only forwarded to the annotation callback.

use once_cell::sync::Lazy;
use regex::Regex;

use super::builder::{InputParser, NoHooks, ParseHooks, ParseOutcome};
use super::error::ParseResult;

static SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*-{60,}\s*$").unwrap());

/// Whether a line is the dashed separator that terminates an embedded block.
pub fn is_separator_line(line: &str) -> bool {
    SEPARATOR.is_match(line)
}

/// Line-by-line adapter for one embedded input block.
pub struct EmbeddedInputParser<H: ParseHooks = NoHooks> {
    parser: InputParser<H>,
    done: bool,
}

impl EmbeddedInputParser<NoHooks> {
    pub fn new() -> Self {
        Self::with_hooks(NoHooks)
    }
}

impl Default for EmbeddedInputParser<NoHooks> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ParseHooks> EmbeddedInputParser<H> {
    pub fn with_hooks(hooks: H) -> Self {
        EmbeddedInputParser {
            parser: InputParser::with_hooks(hooks),
            done: false,
        }
    }

    /// Feed one line from the log stream. Returns `true` once the separator
    /// sentinel has been seen; further lines are ignored.
    pub fn feed(&mut self, line: &str) -> ParseResult<bool> {
        if self.done {
            return Ok(true);
        }
        if is_separator_line(line) {
            self.parser.forward_annotated_line(line);
            self.done = true;
            return Ok(true);
        }
        self.parser.parse_line(line)?;
        Ok(false)
    }

    /// Whether the separator has been consumed.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Finalize the embedded block, exactly as for a standalone file.
    pub fn finish(&mut self) -> ParseResult<ParseOutcome> {
        self.parser.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_needs_sixty_dashes() {
        assert!(is_separator_line(&"-".repeat(60)));
        assert!(is_separator_line(&format!("  {}  \n", "-".repeat(72))));
        assert!(!is_separator_line(&"-".repeat(59)));
        assert!(!is_separator_line("int a = 1;"));
    }

    #[test]
    fn feed_stops_at_separator() {
        let mut embedded = EmbeddedInputParser::new();
        assert!(!embedded.feed("int a = 1;\n").unwrap());
        assert!(embedded.feed(&format!("{}\n", "-".repeat(64))).unwrap());
        // lines after the separator are ignored
        assert!(embedded.feed("int b = 2;\n").unwrap());
        let outcome = embedded.finish().unwrap();
        assert_eq!(outcome.ast.children.len(), 1);
    }
}

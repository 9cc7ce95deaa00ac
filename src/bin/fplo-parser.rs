//! Command-line interface for fplo-parser
//!
//! Tokenizes and parses FPLO input files, then either writes the schema
//! declaration for the observed structure or replays the parsed data as
//! JSON events.
//!
//! Usage:
//!   fplo-parser [--annotate] [--dump-concrete] [--dump-ast] [--schema] <files>...

use clap::{Arg, ArgAction, Command};
use std::io::Write;
use std::process;

use fplo_parser::input::{
    replay, write_schema_json, InputParser, JsonEventSink, ParseHooks,
};

struct StderrHooks {
    annotate: bool,
}

impl ParseHooks for StderrHooks {
    fn on_annotated_line(&mut self, line: &str) {
        if self.annotate {
            eprint!("{}", line);
        }
    }

    fn on_bad_input(&mut self) {
        eprintln!("warning: input contains lines no token kind recognized");
    }
}

fn main() {
    let matches = Command::new("fplo-parser")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parser for C-like FPLO input files")
        .arg(
            Arg::new("annotate")
                .long("annotate")
                .action(ArgAction::SetTrue)
                .help("Write annotated/tokenized input lines to stderr"),
        )
        .arg(
            Arg::new("dump-concrete")
                .long("dump-concrete")
                .action(ArgAction::SetTrue)
                .help("Write the concrete syntax tree to stderr"),
        )
        .arg(
            Arg::new("dump-ast")
                .long("dump-ast")
                .action(ArgAction::SetTrue)
                .help("Write the abstract syntax tree to stderr"),
        )
        .arg(
            Arg::new("schema")
                .long("schema")
                .action(ArgAction::SetTrue)
                .help("Write the schema declaration JSON to stdout instead of data events"),
        )
        .arg(
            Arg::new("namespace")
                .long("namespace")
                .default_value("x_fplo_in")
                .help("Root namespace for exported names"),
        )
        .arg(
            Arg::new("files")
                .help("FPLO input files")
                .required(true)
                .num_args(1..),
        )
        .get_matches();

    let annotate = matches.get_flag("annotate");
    let dump_concrete = matches.get_flag("dump-concrete");
    let dump_ast = matches.get_flag("dump-ast");
    let schema = matches.get_flag("schema");
    let namespace = matches
        .get_one::<String>("namespace")
        .expect("has a default")
        .clone();
    let files: Vec<String> = matches
        .get_many::<String>("files")
        .expect("required")
        .cloned()
        .collect();

    for path in &files {
        if let Err(message) = process_file(path, annotate, dump_concrete, dump_ast, schema, &namespace) {
            eprintln!("{}: {}", path, message);
            process::exit(1);
        }
    }
}

fn process_file(
    path: &str,
    annotate: bool,
    dump_concrete: bool,
    dump_ast: bool,
    schema: bool,
    namespace: &str,
) -> Result<(), String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("cannot read file: {}", e))?;

    let mut parser = InputParser::with_hooks(StderrHooks { annotate });
    parser
        .parse_str(&text)
        .map_err(|e| format!("parse error: {}", e))?;
    let outcome = parser.finish().map_err(|e| format!("parse error: {}", e))?;

    for warning in &outcome.warnings {
        eprintln!("warning: {}", warning);
    }
    if dump_concrete {
        eprintln!("concrete syntax tree:\n{}", outcome.tree.indented_dump());
    }
    if dump_ast {
        eprintln!("abstract syntax tree:\n{}", outcome.ast.indented_dump());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if schema {
        write_schema_json(&mut out, &outcome.ast, namespace)
            .map_err(|e| format!("cannot write schema: {}", e))?;
    } else {
        let mut sink = JsonEventSink::new(&mut out);
        replay(&outcome.ast, namespace, &mut sink);
        sink.finish()
            .map_err(|e| format!("cannot write events: {}", e))?;
    }
    out.flush().map_err(|e| format!("cannot write output: {}", e))?;
    Ok(())
}

//! Export of a completed AST to the external schema/backend collaborator.
//!
//! Two independent consumers, both pure tree walks whose only state is the
//! accumulating dot-joined namespace path:
//!
//! - **Schema declaration**: one record per declaration, section, or
//!   composite member, describing its fully-qualified name, whether it
//!   repeats, and its element kind (or "composite").
//! - **Data replay**: open-group/close-group/set-value events against a
//!   [`DataSink`].

use serde::Serialize;
use serde_json::json;
use std::io;

use super::ast::{AstNode, AstRoot, Datatype, Declaration, ElementKind, Value};

/// Kind of a schema record: a composite group, or a primitive element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Composite,
    Char,
    Int,
    Real,
    Logical,
}

impl From<ElementKind> for SchemaKind {
    fn from(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Char => SchemaKind::Char,
            ElementKind::Int => SchemaKind::Int,
            ElementKind::Real => SchemaKind::Real,
            ElementKind::Logical => SchemaKind::Logical,
        }
    }
}

impl SchemaKind {
    /// Single-letter dtype code for primitive kinds; composites have none.
    pub fn dtype_code(&self) -> Option<&'static str> {
        match self {
            SchemaKind::Composite => None,
            SchemaKind::Char => Some("C"),
            SchemaKind::Int => Some("i"),
            SchemaKind::Real => Some("f"),
            SchemaKind::Logical => Some("b"),
        }
    }
}

/// One schema declaration record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaRecord {
    pub name: String,
    pub repeats: bool,
    pub kind: SchemaKind,
}

/// Describe the whole AST as a flat record list rooted at `namespace`.
pub fn schema_records(root: &AstRoot, namespace: &str) -> Vec<SchemaRecord> {
    let mut records = vec![SchemaRecord {
        name: namespace.to_string(),
        repeats: false,
        kind: SchemaKind::Composite,
    }];
    for child in &root.children {
        record_node(child, namespace, &mut records);
    }
    records
}

fn record_node(node: &AstNode, namespace: &str, records: &mut Vec<SchemaRecord>) {
    match node {
        AstNode::Section { name, children } => {
            let full = format!("{}.{}", namespace, name);
            records.push(SchemaRecord {
                name: full.clone(),
                repeats: false,
                kind: SchemaKind::Composite,
            });
            for child in children {
                record_node(child, &full, records);
            }
        }
        AstNode::Declaration(decl) | AstNode::Assignment { target: decl, .. } => {
            record_declaration(decl, namespace, records);
        }
    }
}

fn record_declaration(decl: &Declaration, namespace: &str, records: &mut Vec<SchemaRecord>) {
    let full = format!("{}.{}", namespace, decl.name);
    let repeats = decl.shape.is_some();
    match &decl.datatype {
        Datatype::Primitive(kind) => records.push(SchemaRecord {
            name: full,
            repeats,
            kind: SchemaKind::from(*kind),
        }),
        Datatype::Struct { members } => {
            records.push(SchemaRecord {
                name: full.clone(),
                repeats,
                kind: SchemaKind::Composite,
            });
            for member in members {
                record_node(member, &full, records);
            }
        }
        Datatype::Flag { members } => {
            records.push(SchemaRecord {
                name: full.clone(),
                repeats,
                kind: SchemaKind::Composite,
            });
            for member in members {
                record_declaration(member, &full, records);
            }
        }
    }
}

/// Write the schema declaration as one JSON document.
pub fn write_schema_json<W: io::Write>(
    out: &mut W,
    root: &AstRoot,
    namespace: &str,
) -> io::Result<()> {
    let records: Vec<serde_json::Value> = schema_records(root, namespace)
        .iter()
        .map(|record| {
            let mut obj = json!({
                "name": record.name,
                "repeats": record.repeats,
            });
            match record.kind.dtype_code() {
                Some(code) => obj["dtypeStr"] = json!(code),
                None => obj["kindStr"] = json!("type_section"),
            }
            obj
        })
        .collect();
    let document = json!({
        "type": "fplo_input_schema_1_0",
        "description": "FPLO input schema, autogenerated",
        "records": records,
    });
    serde_json::to_writer_pretty(&mut *out, &document)?;
    out.write_all(b"\n")
}

/// Receiver of replayed data events.
pub trait DataSink {
    fn open_group(&mut self, name: &str);
    fn close_group(&mut self, name: &str);
    fn set_value(&mut self, name: &str, value: &Value);
}

/// Replay the AST as data events rooted at `namespace`.
///
/// Sections and struct-typed declarations open groups around their members;
/// assignments set values. A flag assignment opens a group and sets one
/// boolean per discovered member, so the expanded bitfield keeps its
/// structure on the backend side.
pub fn replay(root: &AstRoot, namespace: &str, sink: &mut dyn DataSink) {
    sink.open_group(namespace);
    for child in &root.children {
        replay_node(child, namespace, sink);
    }
    sink.close_group(namespace);
}

fn replay_node(node: &AstNode, namespace: &str, sink: &mut dyn DataSink) {
    match node {
        AstNode::Section { name, children } => {
            let full = format!("{}.{}", namespace, name);
            sink.open_group(&full);
            for child in children {
                replay_node(child, &full, sink);
            }
            sink.close_group(&full);
        }
        AstNode::Declaration(decl) => replay_declaration(decl, namespace, sink),
        AstNode::Assignment { target, value } => {
            let full = format!("{}.{}", namespace, target.name);
            if let (Datatype::Flag { members }, Value::List(values)) = (&target.datatype, value) {
                sink.open_group(&full);
                for (member, member_value) in members.iter().zip(values) {
                    let member_name = format!("{}.{}", full, member.name);
                    sink.set_value(&member_name, member_value);
                }
                sink.close_group(&full);
            } else {
                sink.set_value(&full, value);
            }
        }
    }
}

fn replay_declaration(decl: &Declaration, namespace: &str, sink: &mut dyn DataSink) {
    let full = format!("{}.{}", namespace, decl.name);
    match &decl.datatype {
        // a bare primitive declaration carries no data
        Datatype::Primitive(_) => {}
        Datatype::Struct { members } => {
            sink.open_group(&full);
            for member in members {
                replay_node(member, &full, sink);
            }
            sink.close_group(&full);
        }
        Datatype::Flag { members } => {
            sink.open_group(&full);
            for member in members {
                replay_declaration(member, &full, sink);
            }
            sink.close_group(&full);
        }
    }
}

/// One recorded data event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DataEvent {
    OpenGroup(String),
    CloseGroup(String),
    SetValue { name: String, value: Value },
}

/// Sink that records events for inspection.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordingSink {
    pub events: Vec<DataEvent>,
}

impl DataSink for RecordingSink {
    fn open_group(&mut self, name: &str) {
        self.events.push(DataEvent::OpenGroup(name.to_string()));
    }

    fn close_group(&mut self, name: &str) {
        self.events.push(DataEvent::CloseGroup(name.to_string()));
    }

    fn set_value(&mut self, name: &str, value: &Value) {
        self.events.push(DataEvent::SetValue {
            name: name.to_string(),
            value: value.clone(),
        });
    }
}

/// Sink that streams events as JSON lines.
///
/// Write errors are sticky: the first one is kept and later events are
/// dropped, so the walk itself never has to unwind.
pub struct JsonEventSink<W: io::Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: io::Write> JsonEventSink<W> {
    pub fn new(out: W) -> Self {
        JsonEventSink { out, error: None }
    }

    /// Surface the first write error, if any, and hand back the writer.
    pub fn finish(self) -> io::Result<W> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.out),
        }
    }

    fn emit(&mut self, event: serde_json::Value) {
        if self.error.is_some() {
            return;
        }
        let result = serde_json::to_writer(&mut self.out, &event)
            .map_err(io::Error::from)
            .and_then(|_| self.out.write_all(b"\n"));
        if let Err(err) = result {
            self.error = Some(err);
        }
    }
}

impl<W: io::Write> DataSink for JsonEventSink<W> {
    fn open_group(&mut self, name: &str) {
        self.emit(json!({ "event": "openGroup", "name": name }));
    }

    fn close_group(&mut self, name: &str) {
        self.emit(json!({ "event": "closeGroup", "name": name }));
    }

    fn set_value(&mut self, name: &str, value: &Value) {
        self.emit(json!({ "event": "setValue", "name": name, "value": value.to_json() }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::parse_str;

    #[test]
    fn schema_records_resolve_element_kinds() {
        let outcome = parse_str("section outer { struct { int a; real b; } inner; };\n").unwrap();
        let records = schema_records(&outcome.ast, "x_fplo_in");
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "x_fplo_in",
                "x_fplo_in.outer",
                "x_fplo_in.outer.inner",
                "x_fplo_in.outer.inner.a",
                "x_fplo_in.outer.inner.b",
            ]
        );
        assert_eq!(records[2].kind, SchemaKind::Composite);
        assert_eq!(records[3].kind, SchemaKind::Int);
        assert_eq!(records[4].kind, SchemaKind::Real);
    }

    #[test]
    fn shaped_declarations_repeat() {
        let outcome = parse_str("real x[3];\n").unwrap();
        let records = schema_records(&outcome.ast, "ns");
        assert_eq!(records[1].name, "ns.x");
        assert!(records[1].repeats);
    }

    #[test]
    fn replay_wraps_values_in_group_events() {
        let outcome = parse_str("section s { int n = 7; };\n").unwrap();
        let mut sink = RecordingSink::default();
        replay(&outcome.ast, "ns", &mut sink);
        assert_eq!(
            sink.events,
            vec![
                DataEvent::OpenGroup("ns".to_string()),
                DataEvent::OpenGroup("ns.s".to_string()),
                DataEvent::SetValue {
                    name: "ns.s.n".to_string(),
                    value: Value::Int(7),
                },
                DataEvent::CloseGroup("ns.s".to_string()),
                DataEvent::CloseGroup("ns".to_string()),
            ]
        );
    }

    #[test]
    fn flag_assignment_replays_member_booleans() {
        let outcome = parse_str("flag opts = { a(+), b(-) };\n").unwrap();
        let mut sink = RecordingSink::default();
        replay(&outcome.ast, "ns", &mut sink);
        assert_eq!(
            sink.events,
            vec![
                DataEvent::OpenGroup("ns".to_string()),
                DataEvent::OpenGroup("ns.opts".to_string()),
                DataEvent::SetValue {
                    name: "ns.opts.a".to_string(),
                    value: Value::Bool(true),
                },
                DataEvent::SetValue {
                    name: "ns.opts.b".to_string(),
                    value: Value::Bool(false),
                },
                DataEvent::CloseGroup("ns.opts".to_string()),
                DataEvent::CloseGroup("ns".to_string()),
            ]
        );
    }

    #[test]
    fn json_event_sink_streams_one_event_per_line() {
        let outcome = parse_str("int n = 1;\n").unwrap();
        let mut sink = JsonEventSink::new(Vec::new());
        replay(&outcome.ast, "ns", &mut sink);
        let bytes = sink.finish().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("\"setValue\""));
        assert!(lines[1].contains("\"ns.n\""));
    }
}

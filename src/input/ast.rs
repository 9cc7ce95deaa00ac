//! Abstract syntax tree for the FPLO input dialect.
//!
//! Typed semantic nodes derived from the concrete tree. AST nodes own their
//! children exclusively; no back-references exist after construction. The
//! tree is built once, at end of input, and is read-only afterward.

use serde::Serialize;
use std::fmt;

use super::error::{ParseError, ParseResult};

/// External element kind a primitive datatype resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElementKind {
    Char,
    Int,
    Real,
    Logical,
}

impl ElementKind {
    /// Single-letter dtype code used by the schema backend.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Char => "C",
            Self::Int => "i",
            Self::Real => "f",
            Self::Logical => "b",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Char => "char",
            Self::Int => "int",
            Self::Real => "real",
            Self::Logical => "logical",
        }
    }
}

/// A declaration's datatype.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Datatype {
    Primitive(ElementKind),
    /// Ordered named sub-declarations.
    Struct { members: Vec<AstNode> },
    /// Struct variant whose logical members are discovered from the
    /// right-hand side of its assignment; empty until then.
    Flag { members: Vec<Declaration> },
}

impl Datatype {
    pub fn is_composite(&self) -> bool {
        !matches!(self, Datatype::Primitive(_))
    }
}

/// A variable declaration: name, optional shape, datatype.
///
/// A shape dimension of `-1` denotes a variable-length dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declaration {
    pub name: String,
    pub shape: Option<Vec<i64>>,
    pub datatype: Datatype,
}

impl Declaration {
    pub fn new(name: impl Into<String>, datatype: Datatype) -> Self {
        Declaration {
            name: name.into(),
            shape: None,
            datatype,
        }
    }

    /// Attach the shape; attaching twice is a fatal error.
    pub fn set_shape(&mut self, shape: Vec<i64>) -> ParseResult<()> {
        if self.shape.is_some() {
            return Err(ParseError::ShapeRedeclared {
                name: self.name.clone(),
            });
        }
        self.shape = Some(shape);
        Ok(())
    }
}

/// An evaluated value: one decoded literal, or a nested list of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Str(String),
    Int(i64),
    Real(f64),
    Bool(bool),
    /// Placeholder for an overflowed field or an unevaluable group.
    Unavailable,
    List(Vec<Value>),
}

impl Value {
    /// Plain JSON rendition: scalars as scalars, `Unavailable` as null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Str(s) => serde_json::Value::from(s.as_str()),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Real(r) => serde_json::Value::from(*r),
            Value::Bool(b) => serde_json::Value::from(*b),
            Value::Unavailable => serde_json::Value::Null,
            Value::List(items) => {
                serde_json::Value::from(items.iter().map(Value::to_json).collect::<Vec<_>>())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{:?}", r),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Unavailable => write!(f, "*"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A top-level or nested semantic node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AstNode {
    /// Named group of declarations.
    Section {
        name: String,
        children: Vec<AstNode>,
    },
    Declaration(Declaration),
    Assignment { target: Declaration, value: Value },
}

/// Top-level sequence of declarations and sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AstRoot {
    pub children: Vec<AstNode>,
}

impl AstRoot {
    /// Human-readable dump, two-space indent per level.
    pub fn indented_dump(&self) -> String {
        let mut out = String::from("root\n");
        for child in &self.children {
            dump_node(child, "  ", &mut out);
        }
        out
    }
}

fn dump_node(node: &AstNode, indent: &str, out: &mut String) {
    match node {
        AstNode::Section { name, children } => {
            out.push_str(&format!("{}section {}\n", indent, name));
            let child_indent = format!("{}  ", indent);
            for child in children {
                dump_node(child, &child_indent, out);
            }
        }
        AstNode::Declaration(decl) => dump_declaration(decl, indent, out),
        AstNode::Assignment { target, value } => {
            out.push_str(&format!("{}assignment\n", indent));
            let child_indent = format!("{}  ", indent);
            dump_declaration(target, &child_indent, out);
            out.push_str(&format!("{}value {}\n", child_indent, value));
        }
    }
}

fn dump_declaration(decl: &Declaration, indent: &str, out: &mut String) {
    out.push_str(&format!("{}declaration {}\n", indent, decl.name));
    let child_indent = format!("{}  ", indent);
    if let Some(shape) = &decl.shape {
        let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
        out.push_str(&format!("{}shape [{}]\n", child_indent, dims.join(", ")));
    }
    match &decl.datatype {
        Datatype::Primitive(kind) => {
            out.push_str(&format!("{}{}\n", child_indent, kind.name()));
        }
        Datatype::Struct { members } => {
            out.push_str(&format!("{}struct\n", child_indent));
            let member_indent = format!("{}  ", child_indent);
            for member in members {
                dump_node(member, &member_indent, out);
            }
        }
        Datatype::Flag { members } => {
            out.push_str(&format!("{}flag\n", child_indent));
            let member_indent = format!("{}  ", child_indent);
            for member in members {
                dump_declaration(member, &member_indent, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_can_only_be_attached_once() {
        let mut decl = Declaration::new("x", Datatype::Primitive(ElementKind::Int));
        decl.set_shape(vec![3]).unwrap();
        assert_eq!(
            decl.set_shape(vec![4]),
            Err(ParseError::ShapeRedeclared {
                name: "x".to_string()
            })
        );
        assert_eq!(decl.shape, Some(vec![3]));
    }

    #[test]
    fn value_display_is_compact() {
        let value = Value::List(vec![
            Value::Real(1.0),
            Value::Int(2),
            Value::Bool(true),
            Value::Unavailable,
        ]);
        assert_eq!(value.to_string(), "[1.0, 2, true, *]");
    }

    #[test]
    fn dump_shows_nesting() {
        let root = AstRoot {
            children: vec![AstNode::Section {
                name: "outer".to_string(),
                children: vec![AstNode::Declaration(Declaration::new(
                    "inner",
                    Datatype::Struct {
                        members: vec![AstNode::Declaration(Declaration::new(
                            "a",
                            Datatype::Primitive(ElementKind::Int),
                        ))],
                    },
                ))],
            }],
        };
        let expected = "\
root
  section outer
    declaration inner
      struct
        declaration a
          int
";
        assert_eq!(root.indented_dump(), expected);
    }
}

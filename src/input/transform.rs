//! Concrete tree to AST transform.
//!
//! A pure recursive-descent walk over the fully-built concrete tree. Each
//! statement is interpreted positionally: a structural keyword or datatype
//! keyword opens a section or declaration head, an optional subscript
//! attaches the shape, and an optional `=` plus a right-hand side (a braced
//! list, a literal, or a fraction constant) turns the declaration into an
//! assignment.
//!
//! Two evaluators handle value blocks. The flag-pair evaluator resolves the
//! `flag` pseudo-type, whose member names only exist on the right-hand side
//! of its assignment. The generic evaluator folds comma-separated literal
//! groups, including the dialect's native fraction constants (`1/2`).
//! Malformed groups degrade to an unavailable placeholder plus a recorded
//! warning; all other violations abort the transform.

use super::ast::{AstNode, AstRoot, Datatype, Declaration, ElementKind, Value};
use super::cst::{ConcreteTree, Item, NodeId, NodeKind};
use super::error::{ParseError, ParseResult};
use super::tokens::{DatatypeKeyword, Literal, Operator, StructuralKeyword, TokenKind};

/// Result of a transform: the AST plus any data-quality warnings collected
/// by the generic value evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct AstBundle {
    pub root: AstRoot,
    pub warnings: Vec<String>,
}

/// Interpret a completed concrete tree. The tree is not modified; running
/// the transform twice yields structurally identical output.
pub fn build_ast(tree: &ConcreteTree) -> ParseResult<AstBundle> {
    let mut transform = Transform {
        tree,
        warnings: Vec::new(),
    };
    let children = transform.block_children(tree.root())?;
    Ok(AstBundle {
        root: AstRoot { children },
        warnings: transform.warnings,
    })
}

struct Transform<'a> {
    tree: &'a ConcreteTree,
    warnings: Vec<String>,
}

/// Accumulated item in the generic value evaluator: a literal value or the
/// `/` of a fraction constant.
enum Accum {
    Value(Value),
    Slash,
}

/// Accumulated item in the flag-pair evaluator.
enum FlagItem {
    Name(String),
    Marker(bool),
}

impl<'a> Transform<'a> {
    fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    fn block_children(&mut self, block: NodeId) -> ParseResult<Vec<AstNode>> {
        let tree = self.tree;
        let mut children = Vec::new();
        for item in &tree.node(block).items {
            if let Item::Node(id) = item {
                if let Some(node) = self.statement_to_ast(*id)? {
                    children.push(node);
                }
            }
        }
        Ok(children)
    }

    fn statement_to_ast(&mut self, stmt: NodeId) -> ParseResult<Option<AstNode>> {
        let tree = self.tree;
        let items = &tree.node(stmt).items;
        if items.is_empty() {
            return Ok(None);
        }

        let (mut decl, mut pos) = match head_kind(&items[0]) {
            Some(TokenKind::Keyword(StructuralKeyword::Section)) => {
                let name = ident_at(tree, items, 1)?;
                let block = block_at(tree, items, 2)?;
                let children = self.block_children(block)?;
                if items.len() > 3 {
                    return Err(ParseError::UnexpectedItem {
                        found: describe(tree, &items[3]),
                    });
                }
                return Ok(Some(AstNode::Section { name, children }));
            }
            Some(TokenKind::Keyword(StructuralKeyword::Struct)) => {
                let block = block_at(tree, items, 1)?;
                let members = self.block_children(block)?;
                let name = ident_at(tree, items, 2)?;
                (Declaration::new(name, Datatype::Struct { members }), 3)
            }
            Some(TokenKind::Datatype(DatatypeKeyword::Flag)) => {
                let name = ident_at(tree, items, 1)?;
                // array-of-flag length is not tracked; skip the subscript
                let pos = if is_subscript(tree, items.get(2)) { 3 } else { 2 };
                (
                    Declaration::new(
                        name,
                        Datatype::Flag {
                            members: Vec::new(),
                        },
                    ),
                    pos,
                )
            }
            Some(TokenKind::Datatype(dt)) => {
                // char followed by a subscript: the subscript is the string
                // buffer length, which the data model does not track
                let (name, pos) =
                    if dt == DatatypeKeyword::Char && is_subscript(tree, items.get(1)) {
                        (ident_at(tree, items, 2)?, 3)
                    } else {
                        (ident_at(tree, items, 1)?, 2)
                    };
                (Declaration::new(name, Datatype::Primitive(primitive_kind(dt))), pos)
            }
            _ => {
                return Err(ParseError::UnexpectedStatementHead {
                    found: describe(tree, &items[0]),
                })
            }
        };

        // a subscript after the declaration head declares the shape
        while let Some(item) = items.get(pos) {
            let Item::Node(id) = item else { break };
            if tree.kind(*id) != NodeKind::Subscript {
                break;
            }
            let shape = self.subscript_to_shape(*id)?;
            decl.set_shape(shape)?;
            pos += 1;
        }

        if pos >= items.len() {
            return Ok(Some(AstNode::Declaration(decl)));
        }

        match head_kind(&items[pos]) {
            Some(TokenKind::Operator(Operator::Assign)) => {}
            _ => {
                return Err(ParseError::UnexpectedItem {
                    found: describe(tree, &items[pos]),
                })
            }
        }
        pos += 1;

        let value = match &items[pos..] {
            [Item::Node(id)] if tree.kind(*id) == NodeKind::Block => {
                if matches!(decl.datatype, Datatype::Flag { .. }) {
                    // flag members are only known now, from the value list
                    let (names, markers) = self.flag_pairs(*id)?;
                    decl.datatype = Datatype::Flag {
                        members: names
                            .into_iter()
                            .map(|name| {
                                Declaration::new(name, Datatype::Primitive(ElementKind::Logical))
                            })
                            .collect(),
                    };
                    Value::List(markers.into_iter().map(Value::Bool).collect())
                } else {
                    Value::List(self.block_values(*id)?)
                }
            }
            // a bare right-hand side: one literal, or one fraction constant
            rest => {
                let mut values = self.items_values(rest)?;
                if values.len() > 1 {
                    return Err(ParseError::ExtraValue { name: decl.name });
                }
                match values.pop() {
                    Some(value) => value,
                    None => return Err(ParseError::MissingValue { name: decl.name }),
                }
            }
        };

        let value = coerce(value, &decl.datatype);
        Ok(Some(AstNode::Assignment {
            target: decl,
            value,
        }))
    }

    fn subscript_to_shape(&self, id: NodeId) -> ParseResult<Vec<i64>> {
        let tree = self.tree;
        let mut shape = Vec::new();
        for item in &tree.node(id).items {
            match head_kind(item) {
                Some(TokenKind::Literal(Literal::Int(n))) => shape.push(n),
                // `*` and named constants both denote a variable-length dimension
                Some(TokenKind::Literal(Literal::Overflow))
                | Some(TokenKind::Operator(Operator::Star))
                | Some(TokenKind::Identifier(_)) => shape.push(-1),
                // `,` separates dimensions
                Some(TokenKind::Operator(Operator::Comma)) => {}
                _ => {
                    return Err(ParseError::InvalidShapeItem {
                        found: describe(tree, item),
                    })
                }
            }
        }
        Ok(shape)
    }

    fn block_values(&mut self, block: NodeId) -> ParseResult<Vec<Value>> {
        let stmt = single_statement(self.tree, block)?;
        self.statement_values(stmt)
    }

    fn statement_values(&mut self, stmt: NodeId) -> ParseResult<Vec<Value>> {
        let tree = self.tree;
        self.items_values(&tree.node(stmt).items)
    }

    /// Fold a comma-separated item sequence into evaluated values.
    fn items_values(&mut self, items: &[Item]) -> ParseResult<Vec<Value>> {
        let tree = self.tree;
        let mut result = Vec::new();
        let mut accum: Vec<Accum> = Vec::new();
        for item in items {
            match item {
                Item::Token(token) => match &token.kind {
                    TokenKind::Literal(lit) => accum.push(Accum::Value(literal_value(lit))),
                    TokenKind::Operator(Operator::Comma) => {
                        if !accum.is_empty() {
                            let group = std::mem::take(&mut accum);
                            let value = self.eval_group(group);
                            result.push(value);
                        }
                    }
                    TokenKind::Operator(Operator::Slash) => accum.push(Accum::Slash),
                    _ => self.warn(format!(
                        "unhandled item in value list: '{}'",
                        describe(tree, item)
                    )),
                },
                Item::Node(id) if tree.kind(*id) == NodeKind::Block => {
                    let nested = self.block_values(*id)?;
                    result.push(Value::List(nested));
                }
                Item::Node(_) => self.warn(format!(
                    "unhandled item in value list: '{}'",
                    describe(tree, item)
                )),
            }
        }
        if !accum.is_empty() {
            let group = std::mem::take(&mut accum);
            let value = self.eval_group(group);
            result.push(value);
        }
        Ok(result)
    }

    /// Evaluate one comma-delimited group: a single literal, or a
    /// `<literal> / <literal>` fraction constant. Anything else degrades to
    /// an unavailable placeholder with a warning.
    fn eval_group(&mut self, group: Vec<Accum>) -> Value {
        match group.as_slice() {
            [Accum::Value(v)] => v.clone(),
            [Accum::Value(num), Accum::Slash, Accum::Value(den)] => {
                match (numeric(num), numeric(den)) {
                    (Some(n), Some(d)) => Value::Real(n / d),
                    _ => {
                        self.warn(format!(
                            "cannot fold fraction {} / {}",
                            num, den
                        ));
                        Value::Unavailable
                    }
                }
            }
            other => {
                self.warn(format!(
                    "value group of {} item(s) is neither a literal nor a fraction",
                    other.len()
                ));
                Value::Unavailable
            }
        }
    }

    /// Walk a flag value block into (name, boolean) pairs. `NOT_USED` names
    /// mark intentionally-absent bitfield slots and are dropped from both
    /// lists.
    fn flag_pairs(&mut self, block: NodeId) -> ParseResult<(Vec<String>, Vec<bool>)> {
        let tree = self.tree;
        let stmt = single_statement(tree, block)?;
        let mut names = Vec::new();
        let mut markers = Vec::new();
        let mut accum: Vec<FlagItem> = Vec::new();
        for item in &tree.node(stmt).items {
            match head_kind(item) {
                Some(TokenKind::Identifier(name)) => accum.push(FlagItem::Name(name)),
                Some(TokenKind::FlagValue(marker)) => accum.push(FlagItem::Marker(marker)),
                Some(TokenKind::Operator(Operator::Comma)) => {
                    close_flag_group(&mut accum, &mut names, &mut markers)?;
                }
                _ => {
                    return Err(ParseError::MalformedFlagGroup {
                        found: describe(tree, item),
                    })
                }
            }
        }
        if !accum.is_empty() {
            close_flag_group(&mut accum, &mut names, &mut markers)?;
        }
        Ok((names, markers))
    }
}

fn close_flag_group(
    accum: &mut Vec<FlagItem>,
    names: &mut Vec<String>,
    markers: &mut Vec<bool>,
) -> ParseResult<()> {
    match accum.as_slice() {
        [FlagItem::Name(name), FlagItem::Marker(marker)] => {
            if name != "NOT_USED" {
                names.push(name.clone());
                markers.push(*marker);
            }
        }
        other => {
            return Err(ParseError::MalformedFlagGroup {
                found: format!("group of {} item(s)", other.len()),
            })
        }
    }
    accum.clear();
    Ok(())
}

/// The token kind at the head of an item, cloned out for matching.
fn head_kind(item: &Item) -> Option<TokenKind> {
    match item {
        Item::Token(token) => Some(token.kind.clone()),
        Item::Node(_) => None,
    }
}

fn is_subscript(tree: &ConcreteTree, item: Option<&Item>) -> bool {
    matches!(item, Some(Item::Node(id)) if tree.kind(*id) == NodeKind::Subscript)
}

fn ident_at(tree: &ConcreteTree, items: &[Item], idx: usize) -> ParseResult<String> {
    match items.get(idx) {
        Some(Item::Token(token)) => {
            if let TokenKind::Identifier(name) = &token.kind {
                return Ok(name.clone());
            }
            Err(ParseError::UnexpectedItem {
                found: describe(tree, &items[idx]),
            })
        }
        Some(item) => Err(ParseError::UnexpectedItem {
            found: describe(tree, item),
        }),
        None => Err(ParseError::UnexpectedItem {
            found: "end of statement".to_string(),
        }),
    }
}

fn block_at(tree: &ConcreteTree, items: &[Item], idx: usize) -> ParseResult<NodeId> {
    match items.get(idx) {
        Some(Item::Node(id)) if tree.kind(*id) == NodeKind::Block => Ok(*id),
        Some(item) => Err(ParseError::UnexpectedItem {
            found: describe(tree, item),
        }),
        None => Err(ParseError::UnexpectedItem {
            found: "end of statement".to_string(),
        }),
    }
}

/// A value block holds exactly one statement; the builder only ever splits
/// statements on `;`, which cannot occur inside an initializer list.
fn single_statement(tree: &ConcreteTree, block: NodeId) -> ParseResult<NodeId> {
    let items = &tree.node(block).items;
    let mut statements = items.iter().filter_map(|item| match item {
        Item::Node(id) => Some(*id),
        Item::Token(_) => None,
    });
    match (statements.next(), statements.next()) {
        (Some(stmt), None) => Ok(stmt),
        _ => Err(ParseError::ValueBlockArity {
            statements: items.len(),
        }),
    }
}

fn describe(tree: &ConcreteTree, item: &Item) -> String {
    match item {
        Item::Token(token) => token.text.trim().to_string(),
        Item::Node(id) => tree.kind(*id).name().to_string(),
    }
}

fn primitive_kind(keyword: DatatypeKeyword) -> ElementKind {
    match keyword {
        DatatypeKeyword::Char => ElementKind::Char,
        DatatypeKeyword::Int => ElementKind::Int,
        DatatypeKeyword::Real => ElementKind::Real,
        DatatypeKeyword::Logical => ElementKind::Logical,
        // the flag head is dispatched before primitive declarations
        DatatypeKeyword::Flag => unreachable!("flag is handled as its own statement head"),
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Real(r) => Some(*r),
        _ => None,
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Str(s) => Value::Str(s.clone()),
        Literal::Int(i) => Value::Int(*i),
        Literal::Real(r) => Value::Real(*r),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Overflow => Value::Unavailable,
    }
}

/// Widen integer literals assigned to `real` declarations; no other
/// coercion, and never any narrowing.
fn coerce(value: Value, datatype: &Datatype) -> Value {
    match datatype {
        Datatype::Primitive(ElementKind::Real) => widen(value),
        _ => value,
    }
}

fn widen(value: Value) -> Value {
    match value {
        Value::Int(i) => Value::Real(i as f64),
        Value::List(items) => Value::List(items.into_iter().map(widen).collect()),
        other => other,
    }
}

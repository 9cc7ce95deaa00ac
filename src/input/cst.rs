//! Concrete syntax tree for the FPLO input dialect.
//!
//! The tree mirrors the input's brace/bracket nesting before any semantic
//! interpretation. Nodes live in an arena and address each other by index;
//! the parent link is a plain index used for navigation only, ownership
//! always flows root to children.

use serde::Serialize;

use super::tokens::Token;

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeId(usize);

/// The three concrete node shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    /// Flat token/subtree sequence between two statement boundaries.
    Statement,
    /// Sequence of statements between `{` and `}`.
    Block,
    /// Sequence of items between `[` and `]`.
    Subscript,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Statement => "statement",
            Self::Block => "block",
            Self::Subscript => "subscript",
        }
    }
}

/// One ordered child of a concrete node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Item {
    Token(Token),
    Node(NodeId),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub items: Vec<Item>,
}

/// Arena-backed concrete tree. The root is a block holding the top-level
/// statements; a fresh tree starts with one empty statement to append to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcreteTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl ConcreteTree {
    pub fn new() -> Self {
        let mut tree = ConcreteTree {
            nodes: vec![Node {
                kind: NodeKind::Block,
                parent: None,
                items: Vec::new(),
            }],
            root: NodeId(0),
        };
        tree.push_node(tree.root, NodeKind::Statement);
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Id of the statement the builder starts appending to.
    pub fn first_statement(&self) -> NodeId {
        match self.nodes[self.root.0].items[0] {
            Item::Node(id) => id,
            Item::Token(_) => unreachable!("root always starts with a statement"),
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Allocate a new node and append it as a child of `parent`.
    pub fn push_node(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            items: Vec::new(),
        });
        self.nodes[parent.0].items.push(Item::Node(id));
        id
    }

    pub fn push_token(&mut self, node: NodeId, token: Token) {
        self.nodes[node.0].items.push(Item::Token(token));
    }

    /// Number of open scopes between `id` and the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cursor = id;
        while let Some(parent) = self.parent(cursor) {
            depth += 1;
            cursor = parent;
        }
        depth
    }

    /// Human-readable dump of the tree, two-space indent per level.
    /// Nodes without items are omitted, so a tree built from blank or
    /// comment-only input dumps as a bare root.
    pub fn indented_dump(&self) -> String {
        self.dump_node(self.root, "")
    }

    fn dump_node(&self, id: NodeId, indent: &str) -> String {
        let node = self.node(id);
        if node.items.is_empty() {
            return String::new();
        }
        let mut out = format!("{}{}:\n", indent, node.kind.name());
        let child_indent = format!("{}  ", indent);
        for item in &node.items {
            match item {
                Item::Node(child) => out.push_str(&self.dump_node(*child, &child_indent)),
                Item::Token(token) => {
                    out.push_str(&format!("{}{}\n", child_indent, token));
                }
            }
        }
        out
    }
}

impl Default for ConcreteTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::tokens::TokenKind;

    #[test]
    fn fresh_tree_has_root_with_one_empty_statement() {
        let tree = ConcreteTree::new();
        assert_eq!(tree.kind(tree.root()), NodeKind::Block);
        assert_eq!(tree.node(tree.root()).items.len(), 1);
        let stmt = tree.first_statement();
        assert_eq!(tree.kind(stmt), NodeKind::Statement);
        assert!(tree.node(stmt).items.is_empty());
        assert_eq!(tree.depth(stmt), 1);
    }

    #[test]
    fn parent_links_are_navigation_only() {
        let mut tree = ConcreteTree::new();
        let stmt = tree.first_statement();
        let block = tree.push_node(stmt, NodeKind::Block);
        let inner = tree.push_node(block, NodeKind::Statement);
        assert_eq!(tree.parent(inner), Some(block));
        assert_eq!(tree.parent(block), Some(stmt));
        assert_eq!(tree.parent(tree.root()), None);
        assert_eq!(tree.depth(inner), 3);
    }

    #[test]
    fn empty_nodes_are_omitted_from_dumps() {
        let tree = ConcreteTree::new();
        // root has an (empty) statement child, which contributes nothing
        assert_eq!(tree.indented_dump(), "block:\n");
        let mut tree = ConcreteTree::new();
        let stmt = tree.first_statement();
        tree.push_token(
            stmt,
            Token {
                kind: TokenKind::Identifier("x".to_string()),
                text: "x".to_string(),
            },
        );
        assert!(tree.indented_dump().contains("statement:"));
    }
}

//! Abstract syntax tree for arithmetic expressions.

use std::fmt;

use serde::Serialize;

/// Binary arithmetic operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum OperatorKind {
    Add,
    Sub,
    Mul,
    Div,
}

impl OperatorKind {
    /// The operator's source symbol.
    pub fn symbol(&self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }
}

/// A node of the expression tree.
///
/// Every node owns its children exclusively, so a tree built by the parser
/// always has exactly one operand per negation and two per binary operator.
///
/// Dropping and `Display` are iterative. The derived `Clone`, `PartialEq`,
/// `Debug` and `Serialize` recurse once per level, so only use them on trees
/// from bounded input.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum AstNode {
    Literal(f64),
    UnaryNegate(Box<AstNode>),
    BinaryOp {
        op: OperatorKind,
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
}

impl AstNode {
    pub fn literal(value: f64) -> Self {
        Self::Literal(value)
    }

    pub fn negate(operand: AstNode) -> Self {
        Self::UnaryNegate(Box::new(operand))
    }

    pub fn binary(op: OperatorKind, left: AstNode, right: AstNode) -> Self {
        Self::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Pieces of output still to be written by `Display`.
enum Piece<'a> {
    Node(&'a AstNode),
    Operator(char),
    Close,
}

/// Renders the tree fully parenthesised, e.g. `(2 + (3 * 4))`.
///
/// Walks an explicit stack, so long operator chains format without deep
/// recursion.
impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pieces = vec![Piece::Node(self)];
        while let Some(piece) = pieces.pop() {
            match piece {
                Piece::Node(Self::Literal(value)) => write!(f, "{}", value)?,
                Piece::Node(Self::UnaryNegate(operand)) => {
                    f.write_str("(-")?;
                    pieces.push(Piece::Close);
                    pieces.push(Piece::Node(operand));
                }
                Piece::Node(Self::BinaryOp { op, left, right }) => {
                    f.write_str("(")?;
                    pieces.push(Piece::Close);
                    pieces.push(Piece::Node(right));
                    pieces.push(Piece::Operator(op.symbol()));
                    pieces.push(Piece::Node(left));
                }
                Piece::Operator(symbol) => write!(f, " {} ", symbol)?,
                Piece::Close => f.write_str(")")?,
            }
        }
        Ok(())
    }
}

/// Frees the tree iteratively.
///
/// A chain such as `1 + 1 + ... + 1` is as deep as it is long, and the
/// generated drop glue would recurse once per level.
impl Drop for AstNode {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.detach_children(&mut pending);
        }
    }
}

impl AstNode {
    /// Move every non-leaf child onto `pending`, leaving literals behind.
    fn detach_children(&mut self, pending: &mut Vec<AstNode>) {
        match self {
            Self::Literal(_) => {}
            Self::UnaryNegate(operand) => detach(operand, pending),
            Self::BinaryOp { left, right, .. } => {
                detach(left, pending);
                detach(right, pending);
            }
        }
    }
}

fn detach(slot: &mut AstNode, pending: &mut Vec<AstNode>) {
    if !matches!(slot, AstNode::Literal(_)) {
        pending.push(std::mem::replace(slot, AstNode::Literal(0.0)));
    }
}

//! Statement AST nodes

use super::*;

/// `{ ... }`; `close` is the span of the closing brace.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Node<Stmt>>,
    pub close: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `let name [: ty] = init`
    Let {
        name: Node<Ident>,
        ty: Option<Node<TypeExpr>>,
        init: Node<Expr>,
    },

    /// `name = value`
    Assign {
        target: Node<Ident>,
        value: Node<Expr>,
    },

    /// `return [values]`
    Return(Vec<Node<Expr>>),

    If {
        condition: Node<Expr>,
        then_branch: Node<Block>,
        /// Either a `Stmt::Block` or a nested `Stmt::If`
        else_branch: Option<Box<Node<Stmt>>>,
    },

    Block(Block),

    Expr(Node<Expr>),
}

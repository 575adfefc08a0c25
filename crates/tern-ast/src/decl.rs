//! Top-level declaration AST nodes

use super::*;

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Function(FunctionDecl),
    Const(ConstDecl),
}

impl Decl {
    pub fn name(&self) -> &Node<Ident> {
        match self {
            Decl::Function(func) => &func.name,
            Decl::Const(constant) => &constant.name,
        }
    }
}

/// `fn name(params) [-> result] { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Node<Ident>,
    pub params: Vec<Param>,
    pub result: Option<Node<TypeExpr>>,
    pub body: Node<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Node<Ident>,
    pub ty: Node<TypeExpr>,
}

/// `const name: ty = value`
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub name: Node<Ident>,
    pub ty: Node<TypeExpr>,
    pub value: Node<Expr>,
}

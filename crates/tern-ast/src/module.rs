//! File-level AST: package clause and imports

use super::*;

/// Import declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    /// `f "strings"` or `_ "example.com/side"`
    pub alias: Option<Node<Ident>>,
    /// The import path, spanning the string literal
    pub path: Node<String>,
}

impl ImportDecl {
    pub fn is_blank(&self) -> bool {
        self.alias.as_ref().is_some_and(|alias| alias.value.is_blank())
    }
}

/// Root AST node - represents a complete source file
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// Span of the `package` keyword
    pub package_keyword: Span,
    pub package: Node<Ident>,
    pub imports: Vec<ImportDecl>,
    pub items: Vec<Node<Decl>>,
    pub span: Span,
}

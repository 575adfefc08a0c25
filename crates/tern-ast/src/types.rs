//! Type annotations as written in source

use super::*;

/// Type expression in a parameter, result or binding annotation
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// `int`, `string`, `bool`, `any`
    Named(Ident),

    /// `testing.T`
    Qualified {
        package: Node<Ident>,
        name: Node<Ident>,
    },
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(ident) => write!(f, "{}", ident),
            TypeExpr::Qualified { package, name } => write!(f, "{}.{}", package.value, name.value),
        }
    }
}

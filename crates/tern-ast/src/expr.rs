//! Expression AST nodes

use super::*;

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),

    Ident(Ident),

    /// `base.field`, either a package member or a method
    Selector {
        base: Box<Node<Expr>>,
        field: Node<Ident>,
    },

    Call {
        callee: Box<Node<Expr>>,
        args: Vec<Node<Expr>>,
    },

    Unary {
        op: UnaryOp,
        expr: Box<Node<Expr>>,
    },

    Binary {
        op: BinaryOp,
        left: Box<Node<Expr>>,
        right: Box<Node<Expr>>,
    },

    Paren(Box<Node<Expr>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    String(String),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus, // -
    Not,   // !
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,   // +
    Sub,   // -
    Mul,   // *
    Div,   // /
    Mod,   // %
    Eq,    // ==
    NotEq, // !=
    Lt,    // <
    LtEq,  // <=
    Gt,    // >
    GtEq,  // >=
    And,   // &&
    Or,    // ||
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Minus => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        };
        write!(f, "{}", symbol)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(value) => write!(f, "{}", value),
            Literal::String(value) => write!(f, "{:?}", value),
            Literal::Bool(value) => write!(f, "{}", value),
        }
    }
}

/// Renders the expression back to source form; used in diagnostics.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(literal) => write!(f, "{}", literal),
            Expr::Ident(ident) => write!(f, "{}", ident),
            Expr::Selector { base, field } => write!(f, "{}.{}", base.value, field.value),
            Expr::Call { callee, args } => {
                write!(f, "{}(", callee.value)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg.value)?;
                }
                write!(f, ")")
            }
            Expr::Unary { op, expr } => write!(f, "{}{}", op, expr.value),
            Expr::Binary { op, left, right } => write!(f, "{} {} {}", left.value, op, right.value),
            Expr::Paren(inner) => write!(f, "({})", inner.value),
        }
    }
}

//! Type checking errors

use std::fmt;
use tern_ast::Span;

use crate::types::Type;

/// Type error kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TypeErrorKind {
    /// Import never referenced in its file
    UnusedImport {
        path: String,
        alias: Option<String>,
    },
    /// Local variable declared but never read
    UnusedVariable(String),
    /// `return value` in a function without a result
    NoResultExpected,
    /// Bare `return` in a function with a result
    NotEnoughReturnValues,
    /// More values returned than the function declares
    TooManyReturnValues,
    /// Function with a result can fall off its end
    MissingReturn,
    /// Unknown name (`x` or `p.X`)
    Undefined(String),
    /// Lower-case member of another package
    NotExported {
        name: String,
        package: String,
    },
    /// Too few call arguments
    NotEnoughArguments(String),
    /// Too many call arguments
    TooManyArguments(String),
    /// Value not assignable to the expected type
    CannotUse {
        expr: String,
        found: Type,
        expected: Type,
        context: String,
    },
    /// Binary operands of different types
    MismatchedTypes {
        expr: String,
        left: Type,
        right: Type,
    },
    /// Operator applied to an operand type it does not support
    OperatorNotDefined {
        op: String,
        expr: String,
        ty: Type,
    },
    /// Cannot call non-function
    NotCallable {
        expr: String,
        ty: Type,
    },
    /// Call without a result used as a value
    NoValueUsed(String),
    /// Expression statement that is not a call
    NotUsed(String),
    /// Duplicate declaration
    Redeclared(String),
    /// Package name used as a value
    PackageWithoutSelector(String),
    /// `if` condition is not a bool
    NonBooleanCondition,
    /// Assignment to a constant, function or package
    CannotAssign(String),
    /// Selector naming nothing on the value's type
    NoFieldOrMethod {
        expr: String,
        ty: Type,
        name: String,
    },
    /// A package type used where a value is expected
    TypeNotExpression(String),
    /// `any` outside of a parameter list
    AnyOutsideParams,
}

/// Type error with location information
#[derive(Debug, Clone, PartialEq)]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub span: Span,
}

impl TypeError {
    pub fn new(kind: TypeErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for TypeError {}

impl fmt::Display for TypeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeErrorKind::UnusedImport { path, alias: None } => {
                write!(f, "\"{}\" imported but not used", path)
            }
            TypeErrorKind::UnusedImport {
                path,
                alias: Some(alias),
            } => write!(f, "\"{}\" imported as {} but not used", path, alias),
            TypeErrorKind::UnusedVariable(name) => write!(f, "{} declared but not used", name),
            TypeErrorKind::NoResultExpected => write!(f, "no result values expected"),
            TypeErrorKind::NotEnoughReturnValues => write!(f, "not enough return values"),
            TypeErrorKind::TooManyReturnValues => write!(f, "too many return values"),
            TypeErrorKind::MissingReturn => write!(f, "missing return"),
            TypeErrorKind::Undefined(name) => write!(f, "undefined: {}", name),
            TypeErrorKind::NotExported { name, package } => {
                write!(f, "name {} not exported by package {}", name, package)
            }
            TypeErrorKind::NotEnoughArguments(callee) => {
                write!(f, "not enough arguments in call to {}", callee)
            }
            TypeErrorKind::TooManyArguments(callee) => {
                write!(f, "too many arguments in call to {}", callee)
            }
            TypeErrorKind::CannotUse {
                expr,
                found,
                expected,
                context,
            } => write!(
                f,
                "cannot use {} (type {}) as {} value in {}",
                expr, found, expected, context
            ),
            TypeErrorKind::MismatchedTypes { expr, left, right } => write!(
                f,
                "invalid operation: {} (mismatched types {} and {})",
                expr, left, right
            ),
            TypeErrorKind::OperatorNotDefined { op, expr, ty } => write!(
                f,
                "invalid operation: operator {} not defined on {} (type {})",
                op, expr, ty
            ),
            TypeErrorKind::NotCallable { expr, ty } => write!(
                f,
                "invalid operation: cannot call non-function {} (type {})",
                expr, ty
            ),
            TypeErrorKind::NoValueUsed(expr) => write!(f, "{} (no value) used as value", expr),
            TypeErrorKind::NotUsed(expr) => write!(f, "{} is not used", expr),
            TypeErrorKind::Redeclared(name) => write!(f, "{} redeclared in this block", name),
            TypeErrorKind::PackageWithoutSelector(name) => {
                write!(f, "use of package {} without selector", name)
            }
            TypeErrorKind::NonBooleanCondition => write!(f, "non-boolean condition in if statement"),
            TypeErrorKind::CannotAssign(name) => write!(
                f,
                "cannot assign to {} (neither a variable nor a parameter)",
                name
            ),
            TypeErrorKind::NoFieldOrMethod { expr, ty, name } => write!(
                f,
                "{}.{} undefined (type {} has no field or method {})",
                expr, name, ty, name
            ),
            TypeErrorKind::TypeNotExpression(name) => write!(f, "{} (type) is not an expression", name),
            TypeErrorKind::AnyOutsideParams => write!(f, "any is only permitted as a parameter type"),
        }
    }
}

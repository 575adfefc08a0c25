//! Internal type representation

use std::fmt;

/// Internal type representation used by the type checker
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Primitive types
    Int,
    String,
    Bool,
    Any,

    /// Result of a call to a function without a result
    Void,

    /// Named type exported by another package (e.g. `testing.T`)
    Named {
        path: String,
        package: String,
        name: String,
    },

    /// Function type
    Func(Signature),

    /// Type of an expression that already produced an error, or that
    /// comes from a package whose interface is incomplete. Compatible
    /// with everything so one problem is reported once.
    Invalid,
}

impl Type {
    pub fn is_invalid(&self) -> bool {
        matches!(self, Type::Invalid)
    }

    /// Whether a value of this type may be stored where `target` is expected.
    pub fn is_assignable_to(&self, target: &Type) -> bool {
        if self.is_invalid() || target.is_invalid() {
            return true;
        }
        if matches!(self, Type::Void) {
            return false;
        }
        matches!(target, Type::Any) || self == target
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::String => write!(f, "string"),
            Type::Bool => write!(f, "bool"),
            Type::Any => write!(f, "any"),
            Type::Void => write!(f, "()"),
            Type::Named { package, name, .. } => write!(f, "{}.{}", package, name),
            Type::Func(signature) => write!(f, "{}", signature),
            Type::Invalid => write!(f, "invalid type"),
        }
    }
}

/// Function signature.
///
/// When `variadic` is set the last parameter may be repeated any number of
/// times, including zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: Vec<Type>,
    pub variadic: bool,
    pub result: Box<Type>,
}

impl Signature {
    pub fn new(params: Vec<Type>, result: Type) -> Self {
        Self {
            params,
            variadic: false,
            result: Box::new(result),
        }
    }

    pub fn variadic(params: Vec<Type>, result: Type) -> Self {
        Self {
            params,
            variadic: true,
            result: Box::new(result),
        }
    }

    /// Parameter type expected at argument position `index`.
    pub fn param_at(&self, index: usize) -> Option<&Type> {
        match self.params.get(index) {
            Some(ty) => Some(ty),
            None if self.variadic => self.params.last(),
            None => None,
        }
    }

    pub fn min_args(&self) -> usize {
        if self.variadic {
            self.params.len().saturating_sub(1)
        } else {
            self.params.len()
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if self.variadic && i + 1 == self.params.len() {
                write!(f, "...")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")?;
        if *self.result != Type::Void {
            write!(f, " -> {}", self.result)?;
        }
        Ok(())
    }
}

//! Expression checking methods

use std::sync::Arc;

use tern_ast::{is_exported, BinaryOp, Expr, Ident, Literal, Node, Span, UnaryOp};

use crate::checker::{MethodLookup, Symbol, TypeChecker};
use crate::error::TypeErrorKind;
use crate::interface::Member;
use crate::types::{Signature, Type};

impl TypeChecker<'_> {
    /// Checks an expression whose value is needed. Calls without a result
    /// are reported and yield `Type::Invalid`.
    pub(crate) fn check_value(&mut self, expr: &Node<Expr>) -> Type {
        match self.check_expr(expr) {
            Type::Void => {
                self.error(TypeErrorKind::NoValueUsed(expr.value.to_string()), expr.span);
                Type::Invalid
            }
            ty => ty,
        }
    }

    pub(crate) fn check_expr(&mut self, expr: &Node<Expr>) -> Type {
        match &expr.value {
            Expr::Literal(Literal::Int(_)) => Type::Int,
            Expr::Literal(Literal::String(_)) => Type::String,
            Expr::Literal(Literal::Bool(_)) => Type::Bool,
            Expr::Ident(ident) => self.check_ident(ident, expr.span),
            Expr::Selector { base, field } => self.check_selector(base, field),
            Expr::Call { callee, args } => self.check_call(expr, callee, args),
            Expr::Paren(inner) => self.check_expr(inner),
            Expr::Unary { op, expr: operand } => self.check_unary(*op, operand),
            Expr::Binary { op, left, right } => self.check_binary(expr, *op, left, right),
        }
    }

    fn check_ident(&mut self, ident: &Ident, span: Span) -> Type {
        if let Some(ty) = self.env.use_local(&ident.name) {
            return ty;
        }
        match self.package_scope.get(&ident.name) {
            Some(Symbol::Func(signature)) => return Type::Func(signature.clone()),
            Some(Symbol::Const(ty)) => return ty.clone(),
            None => {}
        }
        if let Some(import) = self.lookup_import(&ident.name) {
            import.used = true;
            self.error(TypeErrorKind::PackageWithoutSelector(ident.name.clone()), span);
            return Type::Invalid;
        }

        self.error(TypeErrorKind::Undefined(ident.name.clone()), span);
        Type::Invalid
    }

    /// Whether `name` refers to an import of the current file rather than a
    /// local or package-level declaration.
    fn names_import(&self, name: &str) -> bool {
        self.env.lookup(name).is_none()
            && !self.package_scope.contains_key(name)
            && self.file_imports.iter().any(|import| import.name == name)
    }

    fn check_selector(&mut self, base: &Node<Expr>, field: &Node<Ident>) -> Type {
        if let Expr::Ident(package) = &base.value {
            if self.names_import(&package.name) {
                return self.check_qualified(&package.name, field);
            }
        }

        let base_ty = self.check_value(base);
        let missing = match &base_ty {
            Type::Invalid => return Type::Invalid,
            Type::Named { path, name, .. } => match self.lookup_method(path, name, &field.value.name) {
                MethodLookup::Found(signature) => return Type::Func(signature),
                MethodLookup::Unknown => return Type::Invalid,
                MethodLookup::Missing => true,
            },
            _ => true,
        };

        if missing {
            self.error(
                TypeErrorKind::NoFieldOrMethod {
                    expr: base.value.to_string(),
                    ty: base_ty,
                    name: field.value.name.clone(),
                },
                field.span,
            );
        }
        Type::Invalid
    }

    /// `package.Member`
    fn check_qualified(&mut self, package: &str, field: &Node<Ident>) -> Type {
        let Some(import) = self.lookup_import(package) else {
            return Type::Invalid;
        };
        import.used = true;
        let interface = Arc::clone(&import.interface);
        let name = &field.value.name;

        let member = match interface.member(name) {
            Some(member) => member,
            None if interface.complete => {
                self.error(TypeErrorKind::Undefined(format!("{}.{}", package, name)), field.span);
                return Type::Invalid;
            }
            None => return Type::Invalid,
        };

        if !is_exported(name) {
            self.error(
                TypeErrorKind::NotExported {
                    name: name.clone(),
                    package: interface.name.clone(),
                },
                field.span,
            );
            return Type::Invalid;
        }

        match member {
            Member::Func(signature) => Type::Func(signature.clone()),
            Member::Const(ty) => ty.clone(),
            Member::Type(_) => {
                self.error(
                    TypeErrorKind::TypeNotExpression(format!("{}.{}", package, name)),
                    field.span,
                );
                Type::Invalid
            }
        }
    }

    fn check_call(&mut self, call: &Node<Expr>, callee: &Node<Expr>, args: &[Node<Expr>]) -> Type {
        let callee_ty = self.check_value(callee);
        let signature = match callee_ty {
            Type::Func(signature) => signature,
            Type::Invalid => {
                for arg in args {
                    self.check_value(arg);
                }
                return Type::Invalid;
            }
            other => {
                self.error(
                    TypeErrorKind::NotCallable {
                        expr: callee.value.to_string(),
                        ty: other,
                    },
                    callee.span,
                );
                for arg in args {
                    self.check_value(arg);
                }
                return Type::Invalid;
            }
        };

        let arg_types: Vec<Type> = args.iter().map(|arg| self.check_value(arg)).collect();
        if self.check_arity(call, callee, args, &signature) {
            let context = format!("argument to {}", callee.value);
            for (index, (arg, found)) in args.iter().zip(&arg_types).enumerate() {
                if let Some(expected) = signature.param_at(index) {
                    self.check_assignable(arg, found, expected, &context);
                }
            }
        }

        *signature.result
    }

    /// Reports a wrong argument count; returns true when the count is fine.
    fn check_arity(
        &mut self,
        call: &Node<Expr>,
        callee: &Node<Expr>,
        args: &[Node<Expr>],
        signature: &Signature,
    ) -> bool {
        if args.len() < signature.min_args() {
            // Reported at the closing parenthesis.
            let close = Span::new(call.span.end.saturating_sub(1), call.span.end, call.span.file_id);
            self.error(TypeErrorKind::NotEnoughArguments(callee.value.to_string()), close);
            return false;
        }
        if !signature.variadic && args.len() > signature.params.len() {
            self.error(
                TypeErrorKind::TooManyArguments(callee.value.to_string()),
                args[signature.params.len()].span,
            );
            return false;
        }
        true
    }

    fn check_unary(&mut self, op: UnaryOp, operand: &Node<Expr>) -> Type {
        let ty = self.check_value(operand);
        let expected = match op {
            UnaryOp::Minus => Type::Int,
            UnaryOp::Not => Type::Bool,
        };
        if ty.is_invalid() || ty == expected {
            return expected;
        }

        self.error(
            TypeErrorKind::OperatorNotDefined {
                op: op.to_string(),
                expr: operand.value.to_string(),
                ty,
            },
            operand.span,
        );
        Type::Invalid
    }

    fn check_binary(&mut self, expr: &Node<Expr>, op: BinaryOp, left: &Node<Expr>, right: &Node<Expr>) -> Type {
        let left_ty = self.check_value(left);
        let right_ty = self.check_value(right);
        let result = |operand: Type| {
            if op.is_comparison() {
                Type::Bool
            } else {
                operand
            }
        };

        if left_ty.is_invalid() || right_ty.is_invalid() {
            return if op.is_comparison() || op.is_logical() {
                Type::Bool
            } else {
                Type::Invalid
            };
        }

        if left_ty != right_ty {
            self.error(
                TypeErrorKind::MismatchedTypes {
                    expr: expr.value.to_string(),
                    left: left_ty,
                    right: right_ty,
                },
                expr.span,
            );
            return Type::Invalid;
        }

        let defined = match op {
            BinaryOp::And | BinaryOp::Or => left_ty == Type::Bool,
            BinaryOp::Eq | BinaryOp::NotEq => !matches!(left_ty, Type::Func(_)),
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq | BinaryOp::Add => {
                matches!(left_ty, Type::Int | Type::String)
            }
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => left_ty == Type::Int,
        };
        if defined {
            return result(left_ty);
        }

        self.error(
            TypeErrorKind::OperatorNotDefined {
                op: op.to_string(),
                expr: left.value.to_string(),
                ty: left_ty,
            },
            left.span,
        );
        Type::Invalid
    }
}

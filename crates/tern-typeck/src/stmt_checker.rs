//! Statement checking methods

use tern_ast::{Block, Expr, Node, Stmt};

use crate::checker::TypeChecker;
use crate::env::{LocalInfo, LocalKind};
use crate::error::TypeErrorKind;
use crate::types::Type;

impl TypeChecker<'_> {
    pub(crate) fn check_stmt(&mut self, stmt: &Node<Stmt>) {
        match &stmt.value {
            Stmt::Let { name, ty, init } => {
                let found = self.check_value(init);
                let declared = match ty {
                    Some(ty) => {
                        let declared = self.resolve_type(ty, false);
                        self.check_assignable(init, &found, &declared, "variable declaration");
                        declared
                    }
                    None => found,
                };

                if name.value.is_blank() {
                    return;
                }
                let info = LocalInfo::new(declared, LocalKind::Var, name.span);
                if !self.env.declare(&name.value.name, info) {
                    self.error(TypeErrorKind::Redeclared(name.value.name.clone()), name.span);
                }
            }
            Stmt::Assign { target, value } => {
                let found = self.check_value(value);
                if target.value.is_blank() {
                    return;
                }

                // Assignment is not a read, so the binding stays unused.
                let local = self.env.lookup(&target.value.name).map(|info| info.ty.clone());
                let expected = match local {
                    Some(ty) => ty,
                    None => {
                        let kind = if self.package_scope.contains_key(&target.value.name)
                            || self.lookup_import(&target.value.name).is_some()
                        {
                            TypeErrorKind::CannotAssign(target.value.name.clone())
                        } else {
                            TypeErrorKind::Undefined(target.value.name.clone())
                        };
                        self.error(kind, target.span);
                        return;
                    }
                };
                self.check_assignable(value, &found, &expected, "assignment");
            }
            Stmt::Return(values) => self.check_return(stmt, values),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition_ty = self.check_value(condition);
                if !matches!(condition_ty, Type::Bool | Type::Invalid) {
                    self.error(TypeErrorKind::NonBooleanCondition, condition.span);
                }

                self.check_block(&then_branch.value);
                if let Some(else_branch) = else_branch {
                    self.check_stmt(else_branch);
                }
            }
            Stmt::Block(block) => self.check_block(block),
            Stmt::Expr(expr) => {
                self.check_expr(expr);
                if !is_call(&expr.value) {
                    self.error(TypeErrorKind::NotUsed(expr.value.to_string()), expr.span);
                }
            }
        }
    }

    pub(crate) fn check_block(&mut self, block: &Block) {
        self.env.push_scope();
        for stmt in &block.stmts {
            self.check_stmt(stmt);
        }
        self.pop_scope();
    }

    fn check_return(&mut self, stmt: &Node<Stmt>, values: &[Node<Expr>]) {
        let types: Vec<Type> = values.iter().map(|value| self.check_value(value)).collect();
        let result = self.current_result.clone();

        match (&result, values) {
            (Type::Void, []) => {}
            (Type::Void, [first, ..]) => {
                self.error(TypeErrorKind::NoResultExpected, first.span);
            }
            (_, []) => self.error(TypeErrorKind::NotEnoughReturnValues, stmt.span),
            (_, [_, second, ..]) => {
                self.error(TypeErrorKind::TooManyReturnValues, second.span);
            }
            (expected, [value]) => {
                self.check_assignable(value, &types[0], expected, "return statement");
            }
        }
    }

    /// Whether control cannot reach the end of the block.
    pub(crate) fn block_terminates(block: &Block) -> bool {
        block.stmts.last().is_some_and(|stmt| Self::stmt_terminates(&stmt.value))
    }

    fn stmt_terminates(stmt: &Stmt) -> bool {
        match stmt {
            Stmt::Return(_) => true,
            Stmt::Block(block) => Self::block_terminates(block),
            Stmt::If {
                then_branch,
                else_branch: Some(else_branch),
                ..
            } => Self::block_terminates(&then_branch.value) && Self::stmt_terminates(&else_branch.value),
            _ => false,
        }
    }

    /// Reports `value` unless `found` may be used as `expected`.
    pub(crate) fn check_assignable(
        &mut self,
        value: &Node<Expr>,
        found: &Type,
        expected: &Type,
        context: &str,
    ) {
        if found.is_assignable_to(expected) {
            return;
        }
        self.error(
            TypeErrorKind::CannotUse {
                expr: value.value.to_string(),
                found: found.clone(),
                expected: expected.clone(),
                context: context.to_string(),
            },
            value.span,
        );
    }
}

fn is_call(expr: &Expr) -> bool {
    match expr {
        Expr::Call { .. } => true,
        Expr::Paren(inner) => is_call(&inner.value),
        _ => false,
    }
}

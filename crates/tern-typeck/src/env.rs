//! Type environment (scoped symbol table for function bodies)

use rustc_hash::FxHashMap;
use tern_ast::Span;

use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalKind {
    Param,
    Var,
}

/// A local binding and whether it has been read
#[derive(Debug, Clone)]
pub struct LocalInfo {
    pub ty: Type,
    pub kind: LocalKind,
    pub span: Span,
    pub used: bool,
}

impl LocalInfo {
    pub fn new(ty: Type, kind: LocalKind, span: Span) -> Self {
        Self {
            ty,
            kind,
            span,
            used: false,
        }
    }
}

/// Type environment with scoped symbol tables
#[derive(Debug, Clone, Default)]
pub struct TypeEnv {
    scopes: Vec<FxHashMap<String, LocalInfo>>,
}

impl TypeEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Pops the innermost scope, returning its unread variables ordered by
    /// position. Parameters are never reported.
    pub fn pop_scope(&mut self) -> Vec<(String, Span)> {
        let Some(scope) = self.scopes.pop() else {
            return Vec::new();
        };
        let mut unused: Vec<(String, Span)> = scope
            .into_iter()
            .filter(|(_, info)| info.kind == LocalKind::Var && !info.used)
            .map(|(name, info)| (name, info.span))
            .collect();
        unused.sort_by_key(|(_, span)| span.start);
        unused
    }

    /// Declares a binding in the innermost scope. Returns false if the name
    /// is already declared there.
    pub fn declare(&mut self, name: &str, info: LocalInfo) -> bool {
        let Some(scope) = self.scopes.last_mut() else {
            return false;
        };
        if scope.contains_key(name) {
            return false;
        }
        scope.insert(name.to_string(), info);
        true
    }

    pub fn lookup(&self, name: &str) -> Option<&LocalInfo> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Looks a binding up and records the read.
    pub fn use_local(&mut self, name: &str) -> Option<Type> {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(info) = scope.get_mut(name) {
                info.used = true;
                return Some(info.ty.clone());
            }
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

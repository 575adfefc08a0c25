//! Package interfaces: what a checked package offers to its importers

use rustc_hash::FxHashMap;

use crate::types::{Signature, Type};

/// Exported surface of a checked package.
///
/// `complete` is false when the package could not be fully checked
/// (syntax errors, a broken directory, a failed load). Lookups that miss
/// in an incomplete interface are not reported to importers.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageInterface {
    pub path: String,
    pub name: String,
    pub complete: bool,
    members: FxHashMap<String, Member>,
}

/// A top-level declaration visible through an interface
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Func(Signature),
    Const(Type),
    Type(NamedType),
}

/// A named type together with its methods
#[derive(Debug, Clone, PartialEq)]
pub struct NamedType {
    pub name: String,
    pub methods: FxHashMap<String, Signature>,
}

impl NamedType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: FxHashMap::default(),
        }
    }

    pub fn with_method(mut self, name: &str, signature: Signature) -> Self {
        self.methods.insert(name.to_string(), signature);
        self
    }
}

impl PackageInterface {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            complete: true,
            members: FxHashMap::default(),
        }
    }

    /// Interface of a package that is known to exist but whose members are
    /// unknown.
    pub fn incomplete(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            complete: false,
            ..Self::new(path, name)
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, member: Member) {
        self.members.insert(name.into(), member);
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn method(&self, type_name: &str, method: &str) -> Option<&Signature> {
        match self.members.get(type_name)? {
            Member::Type(named) => named.methods.get(method),
            _ => None,
        }
    }

    /// The `Type::Named` value for a type member of this package.
    pub fn named_type(&self, name: &str) -> Type {
        Type::Named {
            path: self.path.clone(),
            package: self.name.clone(),
            name: name.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

//! Standard package registry
//!
//! Interfaces for the packages that ship with the checker (`fmt`, `strings`,
//! `strconv`, `os`, `testing`). They have no sources on disk.

use std::sync::{Arc, OnceLock};

use rustc_hash::FxHashMap;

use crate::interface::{Member, NamedType, PackageInterface};
use crate::types::{Signature, Type};

/// Registry of standard package interfaces
pub struct BuiltinRegistry {
    packages: FxHashMap<String, Arc<PackageInterface>>,
}

/// Whether `path` names a standard package: its first element has no dot.
pub fn is_standard_path(path: &str) -> bool {
    let first = path.split('/').next().unwrap_or(path);
    !first.contains('.')
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            packages: FxHashMap::default(),
        };
        registry.register_all_builtins();
        registry
    }

    /// Process-wide registry, built on first use.
    pub fn standard() -> &'static BuiltinRegistry {
        static REGISTRY: OnceLock<BuiltinRegistry> = OnceLock::new();
        REGISTRY.get_or_init(BuiltinRegistry::new)
    }

    pub fn package(&self, path: &str) -> Option<Arc<PackageInterface>> {
        self.packages.get(path).cloned()
    }

    pub fn is_builtin_package(&self, path: &str) -> bool {
        self.packages.contains_key(path)
    }

    fn register_package(&mut self, package: PackageInterface) {
        self.packages.insert(package.path.clone(), Arc::new(package));
    }

    fn register_all_builtins(&mut self) {
        self.register_fmt_package();
        self.register_strings_package();
        self.register_strconv_package();
        self.register_os_package();
        self.register_testing_package();
    }

    fn register_fmt_package(&mut self) {
        let mut fmt = PackageInterface::new("fmt", "fmt");
        fmt.insert("Print", Member::Func(Signature::variadic(vec![Type::Any], Type::Void)));
        fmt.insert("Println", Member::Func(Signature::variadic(vec![Type::Any], Type::Void)));
        fmt.insert(
            "Printf",
            Member::Func(Signature::variadic(vec![Type::String, Type::Any], Type::Void)),
        );
        fmt.insert("Sprint", Member::Func(Signature::variadic(vec![Type::Any], Type::String)));
        fmt.insert(
            "Sprintf",
            Member::Func(Signature::variadic(vec![Type::String, Type::Any], Type::String)),
        );
        self.register_package(fmt);
    }

    fn register_strings_package(&mut self) {
        let mut strings = PackageInterface::new("strings", "strings");
        for name in ["Contains", "HasPrefix", "HasSuffix", "EqualFold"] {
            strings.insert(
                name,
                Member::Func(Signature::new(vec![Type::String, Type::String], Type::Bool)),
            );
        }
        for name in ["ToUpper", "ToLower", "TrimSpace"] {
            strings.insert(name, Member::Func(Signature::new(vec![Type::String], Type::String)));
        }
        for name in ["Index", "Count"] {
            strings.insert(
                name,
                Member::Func(Signature::new(vec![Type::String, Type::String], Type::Int)),
            );
        }
        strings.insert(
            "Repeat",
            Member::Func(Signature::new(vec![Type::String, Type::Int], Type::String)),
        );
        strings.insert(
            "Replace",
            Member::Func(Signature::new(
                vec![Type::String, Type::String, Type::String],
                Type::String,
            )),
        );
        self.register_package(strings);
    }

    fn register_strconv_package(&mut self) {
        let mut strconv = PackageInterface::new("strconv", "strconv");
        strconv.insert("Itoa", Member::Func(Signature::new(vec![Type::Int], Type::String)));
        strconv.insert("Quote", Member::Func(Signature::new(vec![Type::String], Type::String)));
        strconv.insert(
            "FormatBool",
            Member::Func(Signature::new(vec![Type::Bool], Type::String)),
        );
        self.register_package(strconv);
    }

    fn register_os_package(&mut self) {
        let mut os = PackageInterface::new("os", "os");
        os.insert("Exit", Member::Func(Signature::new(vec![Type::Int], Type::Void)));
        os.insert("Getenv", Member::Func(Signature::new(vec![Type::String], Type::String)));
        os.insert(
            "Setenv",
            Member::Func(Signature::new(vec![Type::String, Type::String], Type::Void)),
        );
        os.insert("PathSeparator", Member::Const(Type::String));
        self.register_package(os);
    }

    fn register_testing_package(&mut self) {
        let mut testing = PackageInterface::new("testing", "testing");
        let t = NamedType::new("T")
            .with_method("Error", Signature::variadic(vec![Type::Any], Type::Void))
            .with_method("Errorf", Signature::variadic(vec![Type::String, Type::Any], Type::Void))
            .with_method("Fatal", Signature::variadic(vec![Type::Any], Type::Void))
            .with_method("Fatalf", Signature::variadic(vec![Type::String, Type::Any], Type::Void))
            .with_method("Log", Signature::variadic(vec![Type::Any], Type::Void))
            .with_method("Helper", Signature::new(vec![], Type::Void))
            .with_method("Name", Signature::new(vec![], Type::String));
        testing.insert("T", Member::Type(t));
        testing.insert("Short", Member::Func(Signature::new(vec![], Type::Bool)));
        self.register_package(testing);
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

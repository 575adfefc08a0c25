//! Main type checker struct

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tern_ast::{is_exported, Decl, FunctionDecl, Node, SourceFile, Span, TypeExpr};

use crate::builtins::BuiltinRegistry;
use crate::env::{LocalInfo, LocalKind, TypeEnv};
use crate::error::{TypeError, TypeErrorKind};
use crate::interface::{Member, PackageInterface};
use crate::types::{Signature, Type};

/// One file of the package being checked
#[derive(Debug, Clone, Copy)]
pub struct PackageFile<'a> {
    pub ast: &'a SourceFile,
    /// Set when the file did not parse cleanly; unused-name reports are
    /// suppressed for it.
    pub has_syntax_errors: bool,
}

/// Everything needed to check one package
#[derive(Debug, Clone, Copy)]
pub struct PackageRequest<'a> {
    pub path: &'a str,
    pub files: &'a [PackageFile<'a>],
    /// Interfaces of the imported packages keyed by import path. A path
    /// missing here failed to load and is treated as an incomplete package.
    pub imports: &'a FxHashMap<String, Arc<PackageInterface>>,
}

/// The checked package's interface and every error found
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub interface: PackageInterface,
    pub errors: Vec<TypeError>,
}

/// Top-level declaration of the package being checked
#[derive(Debug, Clone)]
pub(crate) enum Symbol {
    Func(Signature),
    Const(Type),
}

/// An import of the file currently being checked
#[derive(Debug, Clone)]
pub(crate) struct FileImport {
    pub(crate) path: String,
    pub(crate) name: String,
    pub(crate) alias: Option<String>,
    pub(crate) span: Span,
    pub(crate) interface: Arc<PackageInterface>,
    pub(crate) used: bool,
}

/// Main type checker
pub struct TypeChecker<'a> {
    pub(crate) imports: &'a FxHashMap<String, Arc<PackageInterface>>,
    pub(crate) env: TypeEnv,
    pub(crate) errors: Vec<TypeError>,
    pub(crate) package_scope: FxHashMap<String, Symbol>,
    pub(crate) file_imports: Vec<FileImport>,
    /// Declared result of the function being checked; `Type::Void` when it
    /// has none.
    pub(crate) current_result: Type,
    pub(crate) report_unused: bool,
}

impl<'a> TypeChecker<'a> {
    pub fn new(imports: &'a FxHashMap<String, Arc<PackageInterface>>) -> Self {
        Self {
            imports,
            env: TypeEnv::new(),
            errors: Vec::new(),
            package_scope: FxHashMap::default(),
            file_imports: Vec::new(),
            current_result: Type::Void,
            report_unused: true,
        }
    }

    /// Checks all files of one package.
    ///
    /// Top-level declarations of every file are collected first so that
    /// function bodies may refer to declarations of other files.
    pub fn check_package(mut self, request: &PackageRequest<'_>) -> CheckResult {
        let name = request
            .files
            .first()
            .map(|file| file.ast.package.value.name.clone())
            .unwrap_or_default();
        let mut interface = PackageInterface::new(request.path, name);
        interface.complete = !request.files.iter().any(|file| file.has_syntax_errors);

        let mut file_imports = Vec::with_capacity(request.files.len());
        for file in request.files {
            self.bind_imports(file.ast);
            self.collect_declarations(file.ast);
            file_imports.push(std::mem::take(&mut self.file_imports));
        }

        for (file, imports) in request.files.iter().zip(file_imports) {
            self.file_imports = imports;
            self.report_unused = !file.has_syntax_errors;
            self.check_file(file.ast);
            if self.report_unused {
                self.report_unused_imports();
            }
        }

        let mut names: Vec<_> = self.package_scope.keys().cloned().collect();
        names.sort();
        for name in names {
            match self.package_scope.remove(&name) {
                Some(Symbol::Func(signature)) => interface.insert(name, Member::Func(signature)),
                Some(Symbol::Const(ty)) => interface.insert(name, Member::Const(ty)),
                None => {}
            }
        }

        CheckResult {
            interface,
            errors: self.errors,
        }
    }

    pub(crate) fn error(&mut self, kind: TypeErrorKind, span: Span) {
        self.errors.push(TypeError::new(kind, span));
    }

    // =========================================================================
    // Imports
    // =========================================================================

    fn bind_imports(&mut self, file: &SourceFile) {
        self.file_imports.clear();

        for import in &file.imports {
            if import.is_blank() {
                continue;
            }
            let path = import.path.value.clone();
            let interface = match self.imports.get(&path) {
                Some(interface) => Arc::clone(interface),
                None => Arc::new(PackageInterface::incomplete(path.clone(), default_package_name(&path))),
            };
            let alias = import.alias.as_ref().map(|alias| alias.value.name.clone());
            let name = alias.clone().unwrap_or_else(|| interface.name.clone());

            let span = import
                .alias
                .as_ref()
                .map(|alias| alias.span)
                .unwrap_or(import.path.span);
            if self.file_imports.iter().any(|bound| bound.name == name) {
                self.error(TypeErrorKind::Redeclared(name), span);
                continue;
            }

            self.file_imports.push(FileImport {
                path,
                name,
                alias,
                span: import.path.span,
                interface,
                used: false,
            });
        }
    }

    pub(crate) fn lookup_import(&mut self, name: &str) -> Option<&mut FileImport> {
        self.file_imports.iter_mut().find(|import| import.name == name)
    }

    fn report_unused_imports(&mut self) {
        let unused: Vec<_> = self
            .file_imports
            .iter()
            .filter(|import| !import.used)
            .map(|import| {
                (
                    TypeErrorKind::UnusedImport {
                        path: import.path.clone(),
                        alias: import.alias.clone(),
                    },
                    import.span,
                )
            })
            .collect();
        for (kind, span) in unused {
            self.error(kind, span);
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn collect_declarations(&mut self, file: &SourceFile) {
        for item in &file.items {
            let name = item.value.name();
            let symbol = match &item.value {
                Decl::Function(func) => Symbol::Func(self.function_signature(func)),
                Decl::Const(constant) => Symbol::Const(self.resolve_type(&constant.ty, false)),
            };

            if name.value.is_blank() {
                continue;
            }
            if self.package_scope.contains_key(&name.value.name) {
                self.error(TypeErrorKind::Redeclared(name.value.name.clone()), name.span);
                continue;
            }
            self.package_scope.insert(name.value.name.clone(), symbol);
        }
    }

    fn function_signature(&mut self, func: &FunctionDecl) -> Signature {
        let params = func
            .params
            .iter()
            .map(|param| self.resolve_type(&param.ty, true))
            .collect();
        let result = match &func.result {
            Some(result) => self.resolve_type(result, false),
            None => Type::Void,
        };
        Signature::new(params, result)
    }

    fn check_file(&mut self, file: &SourceFile) {
        for item in &file.items {
            match &item.value {
                Decl::Function(func) => self.check_function(func),
                Decl::Const(constant) => {
                    let declared = self.resolve_type(&constant.ty, false);
                    let found = self.check_value(&constant.value);
                    self.check_assignable(&constant.value, &found, &declared, "constant declaration");
                }
            }
        }
    }

    fn check_function(&mut self, func: &FunctionDecl) {
        self.env.push_scope();
        for param in &func.params {
            let ty = self.resolve_type(&param.ty, true);
            if param.name.value.is_blank() {
                continue;
            }
            let info = LocalInfo::new(ty, LocalKind::Param, param.name.span);
            if !self.env.declare(&param.name.value.name, info) {
                self.error(
                    TypeErrorKind::Redeclared(param.name.value.name.clone()),
                    param.name.span,
                );
            }
        }

        self.current_result = match &func.result {
            Some(result) => self.resolve_type(result, false),
            None => Type::Void,
        };

        let body = &func.body.value;
        for stmt in &body.stmts {
            self.check_stmt(stmt);
        }
        if self.current_result != Type::Void && !Self::block_terminates(body) {
            self.error(TypeErrorKind::MissingReturn, body.close);
        }

        self.pop_scope();
        self.current_result = Type::Void;
    }

    /// Pops a scope and reports its unread variables.
    pub(crate) fn pop_scope(&mut self) {
        let unused = self.env.pop_scope();
        if self.report_unused {
            for (name, span) in unused {
                self.error(TypeErrorKind::UnusedVariable(name), span);
            }
        }
    }

    // =========================================================================
    // Type annotations
    // =========================================================================

    pub(crate) fn resolve_type(&mut self, ty: &Node<TypeExpr>, allow_any: bool) -> Type {
        match &ty.value {
            TypeExpr::Named(ident) => match ident.name.as_str() {
                "int" => Type::Int,
                "string" => Type::String,
                "bool" => Type::Bool,
                "any" if allow_any => Type::Any,
                "any" => {
                    self.error(TypeErrorKind::AnyOutsideParams, ty.span);
                    Type::Invalid
                }
                other => {
                    self.error(TypeErrorKind::Undefined(other.to_string()), ty.span);
                    Type::Invalid
                }
            },
            TypeExpr::Qualified { package, name } => {
                let Some(import) = self.lookup_import(&package.value.name) else {
                    self.error(TypeErrorKind::Undefined(package.value.name.clone()), package.span);
                    return Type::Invalid;
                };
                import.used = true;
                let interface = Arc::clone(&import.interface);

                match interface.member(&name.value.name) {
                    Some(Member::Type(_)) if !is_exported(&name.value.name) => {
                        self.error(
                            TypeErrorKind::NotExported {
                                name: name.value.name.clone(),
                                package: interface.name.clone(),
                            },
                            name.span,
                        );
                        Type::Invalid
                    }
                    Some(Member::Type(_)) => interface.named_type(&name.value.name),
                    _ if !interface.complete => Type::Invalid,
                    _ => {
                        self.error(
                            TypeErrorKind::Undefined(format!("{}.{}", package.value.name, name.value.name)),
                            name.span,
                        );
                        Type::Invalid
                    }
                }
            }
        }
    }

    /// Methods of a named type, looked up in the imported interfaces first and
    /// then among the standard packages.
    pub(crate) fn lookup_method(&self, path: &str, type_name: &str, method: &str) -> MethodLookup {
        let interface = self
            .imports
            .get(path)
            .cloned()
            .or_else(|| BuiltinRegistry::standard().package(path));
        match interface {
            Some(interface) => match interface.method(type_name, method) {
                Some(signature) => MethodLookup::Found(signature.clone()),
                None if interface.complete => MethodLookup::Missing,
                None => MethodLookup::Unknown,
            },
            None => MethodLookup::Unknown,
        }
    }
}

pub(crate) enum MethodLookup {
    Found(Signature),
    Missing,
    Unknown,
}

/// Package name assumed for an import whose interface is unavailable: the
/// last path element.
pub(crate) fn default_package_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

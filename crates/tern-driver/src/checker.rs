//! The type-checking capability the loader calls into

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tern_ast::{SourceFile, Span};
use tern_typeck::{BuiltinRegistry, PackageFile, PackageInterface, PackageRequest};

/// One parsed file of the unit being checked
#[derive(Debug, Clone, Copy)]
pub struct CheckFile<'a> {
    pub ast: &'a SourceFile,
    pub has_syntax_errors: bool,
}

#[derive(Debug, Clone)]
pub struct CheckRequest<'a> {
    pub import_path: &'a str,
    pub files: Vec<CheckFile<'a>>,
    /// Interfaces of the resolved imports by import path
    pub imports: FxHashMap<String, Arc<PackageInterface>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckDiagnostic {
    pub span: Span,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct CheckOutput {
    pub interface: PackageInterface,
    pub diagnostics: Vec<CheckDiagnostic>,
}

/// A package type checker.
///
/// Called once per unit, possibly from several threads at once.
pub trait Checker: Sync {
    /// Interface of a standard package, `None` if there is no such package.
    fn standard_package(&self, path: &str) -> Option<Arc<PackageInterface>>;

    fn check(&self, request: &CheckRequest<'_>) -> CheckOutput;
}

/// Checker backed by `tern-typeck`
#[derive(Debug, Clone, Copy, Default)]
pub struct TernChecker;

impl Checker for TernChecker {
    fn standard_package(&self, path: &str) -> Option<Arc<PackageInterface>> {
        BuiltinRegistry::standard().package(path)
    }

    fn check(&self, request: &CheckRequest<'_>) -> CheckOutput {
        let files: Vec<PackageFile<'_>> = request
            .files
            .iter()
            .map(|file| PackageFile {
                ast: file.ast,
                has_syntax_errors: file.has_syntax_errors,
            })
            .collect();

        let result = tern_typeck::check_package(&PackageRequest {
            path: request.import_path,
            files: &files,
            imports: &request.imports,
        });

        CheckOutput {
            interface: result.interface,
            diagnostics: result
                .errors
                .into_iter()
                .map(|error| CheckDiagnostic {
                    message: error.kind.to_string(),
                    span: error.span,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standard_packages() {
        let checker = TernChecker;
        assert!(checker.standard_package("fmt").is_some());
        assert!(checker.standard_package("testing").is_some());
        assert!(checker.standard_package("nope").is_none());
    }

    #[test]
    fn test_check_reports_spans_and_messages() {
        let parsed = tern_parser::parse_source("package foo\nimport \"fmt\"\n", 0);
        let ast = parsed.file.unwrap();
        let checker = TernChecker;
        let mut imports = FxHashMap::default();
        imports.insert("fmt".to_string(), checker.standard_package("fmt").unwrap());

        let output = checker.check(&CheckRequest {
            import_path: "example.com/foo",
            files: vec![CheckFile {
                ast: &ast,
                has_syntax_errors: false,
            }],
            imports,
        });

        assert_eq!(output.interface.name, "foo");
        assert_eq!(
            output.diagnostics,
            vec![CheckDiagnostic {
                span: Span::new(19, 24, 0),
                message: "\"fmt\" imported but not used".to_string(),
            }]
        );
    }
}

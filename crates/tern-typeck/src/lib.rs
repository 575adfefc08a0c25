//! # Tern Type Checker
//!
//! Checks one package at a time against the interfaces of the packages it
//! imports, and produces the package's own interface for its importers.
//! Also provides the standard packages, which have no sources.

mod error;
mod types;
mod env;
mod interface;
mod builtins;
mod checker;
mod stmt_checker;
mod expr_checker;

// Re-export public API
pub use error::{TypeError, TypeErrorKind};
pub use types::{Signature, Type};
pub use env::{LocalInfo, LocalKind, TypeEnv};
pub use interface::{Member, NamedType, PackageInterface};
pub use builtins::{is_standard_path, BuiltinRegistry};
pub use checker::{CheckResult, PackageFile, PackageRequest, TypeChecker};

// =============================================================================
// Public API
// =============================================================================

/// Type check one package
pub fn check_package(request: &PackageRequest<'_>) -> CheckResult {
    TypeChecker::new(request.imports).check_package(request)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rustc_hash::FxHashMap;
    use std::sync::Arc;
    use tern_ast::{LineIndex, SourceFile};

    struct Checked {
        result: CheckResult,
        sources: Vec<String>,
    }

    impl Checked {
        /// Errors as `file:line:col: message`, in report order.
        fn messages(&self) -> Vec<String> {
            let mut errors = self.result.errors.clone();
            errors.sort_by_key(|err| (err.span.file_id, err.span.start));
            errors
                .iter()
                .map(|err| {
                    let index = LineIndex::new(&self.sources[err.span.file_id]);
                    let (line, col) = index.position(err.span.start);
                    format!("{}:{}:{}: {}", err.span.file_id, line, col, err.kind)
                })
                .collect()
        }
    }

    fn std_imports() -> FxHashMap<String, Arc<PackageInterface>> {
        let mut imports = FxHashMap::default();
        for path in ["fmt", "strings", "strconv", "os", "testing"] {
            imports.insert(path.to_string(), BuiltinRegistry::standard().package(path).unwrap());
        }
        imports
    }

    fn check_with(sources: &[&str], imports: &FxHashMap<String, Arc<PackageInterface>>) -> Checked {
        let parsed: Vec<_> = sources
            .iter()
            .enumerate()
            .map(|(file_id, source)| tern_parser::parse_source(source, file_id))
            .collect();
        let asts: Vec<(SourceFile, bool)> = parsed
            .into_iter()
            .map(|p| {
                let has_errors = !p.errors.is_empty();
                (p.file.expect("package clause"), has_errors)
            })
            .collect();
        let files: Vec<PackageFile<'_>> = asts
            .iter()
            .map(|(ast, has_syntax_errors)| PackageFile {
                ast,
                has_syntax_errors: *has_syntax_errors,
            })
            .collect();
        let result = check_package(&PackageRequest {
            path: "example.com/p",
            files: &files,
            imports,
        });
        Checked {
            result,
            sources: sources.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn check(sources: &[&str]) -> Vec<String> {
        check_with(sources, &std_imports()).messages()
    }

    #[test]
    fn test_clean_package() {
        let messages = check(&[r#"package foo
import "fmt"
const Greeting: string = "hi"
fn Foo(n: int) -> string {
    let s = fmt.Sprintf("%d", n)
    if n > 1 {
        return s + Greeting
    }
    return s
}"#]);
        assert_eq!(messages, Vec::<String>::new());
    }

    #[test]
    fn test_unused_import() {
        let messages = check(&["package bar\nimport \"fmt\"\nimport s \"strings\""]);
        assert_eq!(
            messages,
            vec![
                "0:2:8: \"fmt\" imported but not used",
                "0:3:10: \"strings\" imported as s but not used",
            ]
        );
    }

    #[test]
    fn test_blank_import_is_never_unused() {
        assert!(check(&["package bar\nimport _ \"fmt\""]).is_empty());
    }

    #[test]
    fn test_return_count() {
        let messages = check(&["package foo\nfn Foo() {\n\treturn \"Foo\"\n}\nfn Bar() -> int {\n\treturn\n}\nfn Baz() -> int {\n\treturn 1, 2\n}"]);
        assert_eq!(
            messages,
            vec![
                "0:3:9: no result values expected",
                "0:6:2: not enough return values",
                "0:9:12: too many return values",
            ]
        );
    }

    #[test]
    fn test_missing_return() {
        let messages = check(&["package foo\nfn Foo(b: bool) -> int {\n    if b { return 1 }\n}\nfn Bar(b: bool) -> int {\n    if b { return 1 } else { return 2 }\n}"]);
        assert_eq!(messages, vec!["0:4:1: missing return"]);
    }

    #[test]
    fn test_unused_variable_and_assignment() {
        let messages = check(&["package foo\nfn Foo() {\n\tlet bar = 1\n\tbar = 2\n\tlet used = 3\n\tlet _ = used\n}"]);
        assert_eq!(messages, vec!["0:3:6: bar declared but not used"]);
    }

    #[test]
    fn test_syntax_errors_suppress_unused_reports() {
        let checked = check_with(
            &["package foo\nimport \"fmt\"\nfn Broken( {\n}\nfn Fine() { let x = 1 }"],
            &std_imports(),
        );
        assert!(checked.messages().is_empty());
        assert!(!checked.result.interface.complete);
    }

    #[test]
    fn test_undefined_names() {
        let messages = check(&["package foo\nimport \"fmt\"\nfn Foo() {\n\tfmt.Nope()\n\tmissing()\n\tfmt.println()\n}"]);
        assert_eq!(
            messages,
            vec![
                "0:4:6: undefined: fmt.Nope",
                "0:5:2: undefined: missing",
                "0:6:6: undefined: fmt.println",
            ]
        );
    }

    #[test]
    fn test_not_exported() {
        let mut dep = PackageInterface::new("example.com/dep", "dep");
        dep.insert("hidden", Member::Func(Signature::new(vec![], Type::Void)));
        let mut imports = std_imports();
        imports.insert("example.com/dep".to_string(), Arc::new(dep));

        let checked = check_with(&["package foo\nimport \"example.com/dep\"\nfn Foo() { dep.hidden() }"], &imports);
        assert_eq!(
            checked.messages(),
            vec!["0:3:16: name hidden not exported by package dep"]
        );
    }

    #[test]
    fn test_incomplete_import_does_not_cascade() {
        let messages = check(&["package foo\nimport \"example.com/broken\"\nfn Foo() { broken.Anything(1, 2) }"]);
        assert!(messages.is_empty(), "{:?}", messages);
    }

    #[test]
    fn test_call_arity_and_argument_types() {
        let messages = check(&[r#"package foo
import "strings"
fn Foo() {
    strings.Repeat("a")
    strings.Repeat("a", 1, 2)
    strings.Repeat(1, 2)
}"#]);
        assert_eq!(
            messages,
            vec![
                "0:4:23: not enough arguments in call to strings.Repeat",
                "0:5:28: too many arguments in call to strings.Repeat",
                "0:6:20: cannot use 1 (type int) as string value in argument to strings.Repeat",
            ]
        );
    }

    #[test]
    fn test_operators() {
        let messages = check(&[r#"package foo
fn Foo(s: string, n: int) -> bool {
    let a = s + n
    let b = -s
    let c = s - s
    return n < 3 && a == b && c
}"#]);
        assert_eq!(
            messages,
            vec![
                "0:3:13: invalid operation: s + n (mismatched types string and int)",
                "0:4:14: invalid operation: operator - not defined on s (type string)",
                "0:5:13: invalid operation: operator - not defined on s (type string)",
            ]
        );
    }

    #[test]
    fn test_void_value_and_unused_expression() {
        let messages = check(&["package foo\nimport \"fmt\"\nfn Foo(n: int) {\n\tlet x = fmt.Println()\n\tn + 1\n\tfmt\n}"]);
        assert_eq!(
            messages,
            vec![
                "0:4:6: x declared but not used",
                "0:4:10: fmt.Println() (no value) used as value",
                "0:5:2: n + 1 is not used",
                "0:6:2: use of package fmt without selector",
                "0:6:2: fmt is not used",
            ]
        );
    }

    #[test]
    fn test_redeclaration_and_assignment_targets() {
        let messages = check(&[
            "package foo\nconst Limit: int = 1\nfn Foo(t: int) {\n\tlet t = 2\n\tLimit = 3\n\tnope = 4\n}",
            "package foo\nfn Foo() {}",
        ]);
        assert_eq!(
            messages,
            vec![
                "0:4:6: t redeclared in this block",
                "0:5:2: cannot assign to Limit (neither a variable nor a parameter)",
                "0:6:2: undefined: nope",
                "1:2:4: Foo redeclared in this block",
            ]
        );
    }

    #[test]
    fn test_condition_must_be_bool() {
        let messages = check(&["package foo\nfn Foo(n: int) {\n\tif n { }\n}"]);
        assert_eq!(messages, vec!["0:3:5: non-boolean condition in if statement"]);
    }

    #[test]
    fn test_testing_methods() {
        let messages = check(&[r#"package foo_test
import "testing"
fn TestFoo(t: testing.T) {
    t.Helper()
    t.Errorf("got %d", 1)
    t.Run("x")
    t.Log(1, "two", true)
}"#]);
        assert_eq!(
            messages,
            vec!["0:6:7: t.Run undefined (type testing.T has no field or method Run)"]
        );
    }

    #[test]
    fn test_declarations_visible_across_files() {
        let checked = check_with(
            &[
                "package foo\nfn Foo() -> int { return helper() }",
                "package foo\nfn helper() -> int { return Limit }\nconst Limit: int = 4",
            ],
            &std_imports(),
        );
        assert!(checked.messages().is_empty());

        let interface = &checked.result.interface;
        assert_eq!(interface.name, "foo");
        assert_eq!(interface.path, "example.com/p");
        assert!(interface.complete);
        assert_eq!(interface.len(), 3);
        assert!(matches!(interface.member("Limit"), Some(Member::Const(Type::Int))));
    }
}

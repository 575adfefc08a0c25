//! # Tern Parser
//!
//! Recursive descent parser for Tern source files.
//! Uses Pratt parsing for expressions with proper operator precedence.
//!
//! Parsing never gives up on a whole file unless the package clause is
//! missing: a broken declaration is recorded and skipped, and the
//! declarations around it are still returned.

use tern_ast::*;
use tern_lexer::{Lexer, Token, TokenKind};

// Module declarations
mod error;
mod parser;
mod expr;
mod stmt;
mod types;
mod decl;
mod helpers;

// Re-export public types
pub use error::{ParseError, ParseResult};
pub use parser::{ParsedFile, Parser};

/// Lex and parse one source file.
///
/// Lexical errors are reported as parse errors and their tokens dropped, so
/// the parser sees a clean stream.
pub fn parse_source(source: &str, file_id: usize) -> ParsedFile {
    let tokens = Lexer::with_file_id(source, file_id).tokenize();

    let mut lex_errors = Vec::new();
    let tokens: Vec<Token> = tokens
        .into_iter()
        .filter(|token| {
            if token.kind == TokenKind::Error {
                lex_errors.push(ParseError::new(token.value.clone(), token.span));
                false
            } else {
                true
            }
        })
        .collect();

    let mut parsed = Parser::new(tokens).parse_file();
    if !lex_errors.is_empty() {
        lex_errors.append(&mut parsed.errors);
        lex_errors.sort_by_key(|err| err.span.start);
        parsed.errors = lex_errors;
    }
    parsed
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParsedFile {
        parse_source(source, 0)
    }

    fn parse_ok(source: &str) -> SourceFile {
        let parsed = parse(source);
        assert!(parsed.errors.is_empty(), "unexpected errors: {:?}", parsed.errors);
        parsed.file.unwrap()
    }

    #[test]
    fn test_parse_package_clause() {
        let file = parse_ok("package foo");
        assert_eq!(file.package.value.name, "foo");
        assert_eq!(file.package_keyword, Span::new(0, 7, 0));
        assert!(file.imports.is_empty());
        assert!(file.items.is_empty());
    }

    #[test]
    fn test_missing_package_clause() {
        let parsed = parse("fn Foo() {}");
        assert!(parsed.file.is_none());
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].message, "expected 'package', found 'fn'");
    }

    #[test]
    fn test_parse_imports() {
        let file = parse_ok(
            r#"package foo
import "fmt"
import (
    "testing"
    s "strings"
    _ "example.com/side"
)
"#,
        );
        let paths: Vec<_> = file.imports.iter().map(|i| i.path.value.as_str()).collect();
        assert_eq!(paths, vec!["fmt", "testing", "strings", "example.com/side"]);
        assert_eq!(file.imports[2].alias.as_ref().unwrap().value.name, "s");
        assert!(file.imports[3].is_blank());
        // span covers the string literal including quotes
        assert_eq!(file.imports[0].path.span, Span::new(19, 24, 0));
    }

    #[test]
    fn test_parse_function_declaration() {
        let file = parse_ok("package foo\nfn add(a: int, b: int) -> int { return a + b; }");
        assert_eq!(file.items.len(), 1);
        let Decl::Function(func) = &file.items[0].value else {
            panic!("expected function");
        };
        assert_eq!(func.name.value.name, "add");
        assert_eq!(func.params.len(), 2);
        assert!(func.result.is_some());
        assert_eq!(func.body.value.stmts.len(), 1);
    }

    #[test]
    fn test_parse_const_declaration() {
        let file = parse_ok("package foo\nconst Limit: int = 10");
        let Decl::Const(constant) = &file.items[0].value else {
            panic!("expected const");
        };
        assert_eq!(constant.name.value.name, "Limit");
        assert_eq!(constant.value.value, Expr::Literal(Literal::Int(10)));
    }

    #[test]
    fn test_parse_statements() {
        let file = parse_ok(
            r#"package foo
fn f(t: testing.T) {
    let x: int = 1
    x = x * 2;
    if x > 1 { t.Log(x) } else if x < 0 { return } else { }
    {
        fmt.Println("hi")
    }
}"#,
        );
        let Decl::Function(func) = &file.items[0].value else {
            panic!("expected function");
        };
        let stmts = &func.body.value.stmts;
        assert_eq!(stmts.len(), 4);
        assert!(matches!(stmts[0].value, Stmt::Let { .. }));
        assert!(matches!(stmts[1].value, Stmt::Assign { .. }));
        assert!(matches!(stmts[2].value, Stmt::If { .. }));
        assert!(matches!(stmts[3].value, Stmt::Block(_)));
    }

    #[test]
    fn test_operator_precedence() {
        let file = parse_ok("package p\nconst X: bool = 1 + 2 * 3 == 7 && !false");
        let Decl::Const(constant) = &file.items[0].value else {
            panic!("expected const");
        };
        let Expr::Binary { op, left, .. } = &constant.value.value else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::And);
        assert_eq!(left.value.to_string(), "1 + 2 * 3 == 7");
        let Expr::Binary { op: eq, left: sum, .. } = &left.value else {
            panic!("expected comparison");
        };
        assert_eq!(*eq, BinaryOp::Eq);
        assert!(matches!(sum.value, Expr::Binary { op: BinaryOp::Add, .. }));
    }

    #[test]
    fn test_return_multiple_values() {
        let file = parse_ok("package p\nfn f() { return 1, \"a\" }");
        let Decl::Function(func) = &file.items[0].value else {
            panic!("expected function");
        };
        let Stmt::Return(values) = &func.body.value.stmts[0].value else {
            panic!("expected return");
        };
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_recovery_keeps_following_declarations() {
        let parsed = parse("package p\nfn broken( {\n}\nfn Fine() {}\n");
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].message, "expected identifier, found '{'");
        let file = parsed.file.unwrap();
        assert_eq!(file.items.len(), 1);
        assert_eq!(file.items[0].value.name().value.name, "Fine");
    }

    #[test]
    fn test_lex_errors_become_parse_errors() {
        let parsed = parse("package p\nfn f() { let s = \"open\n}\n");
        assert!(parsed
            .errors
            .iter()
            .any(|e| e.message == "string literal not terminated"));
    }

    #[test]
    fn test_import_after_declaration() {
        let parsed = parse("package p\nfn f() {}\nimport \"fmt\"\n");
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(
            parsed.errors[0].message,
            "imports must appear before other declarations"
        );
    }

    #[test]
    fn test_unclosed_block() {
        let parsed = parse("package p\nfn f() {\n");
        assert_eq!(parsed.errors[0].message, "expected '}', found EOF");
    }
}

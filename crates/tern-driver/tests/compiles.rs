use std::fs;
use std::path::Path;
use std::process::Command;

use pretty_assertions::assert_eq;
use tern_driver::{Config, Failure, ModMode, OutputFormat};

fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

fn check(config: &Config, targets: &[&str]) -> (Result<(), Failure>, String) {
    let mut out = Vec::new();
    let result = tern_driver::run(targets, config, &mut out);
    (result, String::from_utf8(out).unwrap())
}

/// A fixture tree under a symlink-free temporary directory, so reported
/// paths start with `temp.path()`.
fn project(files: &[(&str, &str)]) -> tempfile::TempDir {
    let temp = tempfile::tempdir_in(std::env::temp_dir().canonicalize().unwrap()).unwrap();
    write_tree(temp.path(), files);
    temp
}

const MODULE: (&str, &str) = ("tern.mod", "module example.com/my-project\n");

const FOO_RETURNS_VALUE: (&str, &str) = ("foo/foo.tn", "package foo\nfn Foo() {\n\treturn \"Foo\"\n}");

const FOO_XTEST_UNUSED: (&str, &str) = (
    "foo/foo_test.tn",
    "package foo_test
import (
\t\"testing\"
\t\"example.com/my-project/foo\"
)
fn TestFoo(t: testing.T) {
\tlet bar = foo.Foo()
}",
);

// =============================================================================
// Pass cases
// =============================================================================

#[test]
fn test_module_with_external_test_passes() {
    let temp = project(&[
        MODULE,
        ("foo/foo.tn", "package foo\nimport \"fmt\"\nfn Foo() {\n\tfmt.Println()\n}"),
        (
            "foo/foo_test.tn",
            "package foo_test\nimport \"testing\"\nimport \"example.com/my-project/foo\"\nfn TestFoo(t: testing.T) {\n\tfoo.Foo()\n}",
        ),
    ]);

    let (result, output) = check(&Config::new(temp.path()), &["./foo"]);
    assert_eq!(output, "");
    assert!(result.is_ok());
}

const REPLACED_AND_VENDORED: &[(&str, &str)] = &[
    (
        "tern.mod",
        "module example.com/foo\ntern 1.2\n\nrequire example.com/inner v1.0.0\n\nreplace example.com/inner => ./inner\n",
    ),
    ("foo.tn", "package foo\nimport \"example.com/inner\"\nfn Foo() {\n\tinner.Inner()\n}"),
    (
        "foo_test.tn",
        "package foo_test\nimport \"testing\"\nimport \"example.com/inner\"\nfn TestFoo(t: testing.T) {\n\tinner.Inner()\n}",
    ),
    ("inner/tern.mod", "module example.com/inner"),
    ("inner/inner.tn", "package inner\nfn Inner() {}"),
    (
        "vendor/modules.txt",
        "# example.com/inner v1.0.0 => ./inner\n## explicit\nexample.com/inner\n# example.com/inner => ./inner\n",
    ),
    ("vendor/example.com/inner/tern.mod", "module example.com/inner"),
];

#[test]
fn test_replace_and_vendor_passes() {
    let temp = project(REPLACED_AND_VENDORED);
    write_tree(temp.path(), &[("vendor/example.com/inner/inner.tn", "package inner\nfn Inner() {}")]);

    let (result, output) = check(&Config::new(temp.path()), &["."]);
    assert_eq!(output, "");
    assert!(result.is_ok());
}

#[test]
fn test_nested_vendor_without_manifest_passes() {
    let temp = project(&[
        ("foo/foo.tn", "package foo\nimport \"example.com/inner\"\nfn Foo() {\n\tinner.Inner()\n}"),
        (
            "foo/foo_test.tn",
            "package foo_test\nimport \"testing\"\nimport \"example.com/inner\"\nfn TestFoo(t: testing.T) {\n\tinner.Inner()\n}",
        ),
        ("foo/vendor/example.com/inner/inner.tn", "package inner\nfn Inner() {}"),
    ]);

    let (result, output) = check(&Config::new(temp.path()), &["./foo"]);
    assert_eq!(output, "");
    assert!(result.is_ok());
}

// =============================================================================
// Error cases
// =============================================================================

#[test]
fn test_wrong_return_and_unused_import() {
    let temp = project(&[
        MODULE,
        FOO_RETURNS_VALUE,
        ("bar/bar.tn", "package bar\nimport \"fmt\"\nimport _ \"example.com/my-project/foo\""),
    ]);
    let dir = temp.path().display();

    let (result, output) = check(&Config::new(temp.path()), &["./foo", "./bar"]);
    assert_eq!(
        output,
        format!(
            "{dir}/foo/foo.tn:3:9: no result values expected\n{dir}/bar/bar.tn:2:8: \"fmt\" imported but not used\n"
        )
    );
    assert!(matches!(result, Err(Failure::Diagnostics { count: 2 })));
}

#[test]
fn test_unused_variable_in_external_test() {
    let temp = project(&[
        MODULE,
        ("foo/foo.tn", "package foo\nfn Foo() -> string {\n\treturn \"Foo\"\n}"),
        FOO_XTEST_UNUSED,
    ]);

    let (result, output) = check(&Config::new(temp.path()), &["./foo"]);
    assert_eq!(
        output,
        format!("{}/foo/foo_test.tn:7:6: bar declared but not used\n", temp.path().display())
    );
    assert!(result.is_err());
}

#[test]
fn test_unused_variable_in_internal_test() {
    let temp = project(&[
        MODULE,
        ("foo/foo.tn", "package foo\nfn Foo() -> string {\n\treturn \"Foo\"\n}"),
        (
            "foo/foo_test.tn",
            "package foo\nimport \"testing\"\nfn TestFoo(t: testing.T) {\n\tlet bar = Foo()\n}",
        ),
    ]);

    let (result, output) = check(&Config::new(temp.path()), &["./foo"]);
    assert_eq!(
        output,
        format!("{}/foo/foo_test.tn:4:6: bar declared but not used\n", temp.path().display())
    );
    assert!(result.is_err());
}

#[test]
fn test_mixed_packages_in_one_directory() {
    let temp = project(&[MODULE, ("foo/foo.tn", "package foo"), ("foo/bar.tn", "package bar")]);
    let dir = temp.path().display();

    let (result, output) = check(&Config::new(temp.path()), &["./foo"]);
    assert_eq!(
        output,
        format!(
            "-: found packages bar (bar.tn) and foo (foo.tn) in {dir}/foo\n{dir}/foo/foo.tn:1:1: package foo; expected bar\n"
        )
    );
    assert!(matches!(result, Err(Failure::Diagnostics { count: 2 })));
}

#[test]
fn test_syntax_error_in_leaf_dependency() {
    let temp = project(&[
        MODULE,
        ("app/app.tn", "package app\nimport \"example.com/my-project/leaf\"\nfn App() {\n\tleaf.Broken()\n}"),
        ("leaf/leaf.tn", "package leaf\nfn Broken( {\n}\n"),
    ]);

    let (result, output) = check(&Config::new(temp.path()), &["./app"]);
    assert_eq!(
        output,
        format!("{}/leaf/leaf.tn:2:12: expected identifier, found '{{'\n", temp.path().display())
    );
    assert!(result.is_err());
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_output_is_deterministic() {
    let temp = project(&[
        MODULE,
        FOO_RETURNS_VALUE,
        FOO_XTEST_UNUSED,
        ("bar/bar.tn", "package bar\nimport \"fmt\"\nimport \"strings\"\nfn Bar() -> int { return \"x\" }"),
        ("baz/baz.tn", "package baz\nimport _ \"example.com/my-project/bar\"\nimport _ \"example.com/my-project/foo\""),
    ]);
    let config = Config::new(temp.path());

    let (_, first) = check(&config, &["./baz", "./foo", "./bar"]);
    let (_, second) = check(&config.clone().with_jobs(1), &["./baz", "./foo", "./bar"]);
    assert_eq!(first, second);
    assert_eq!(first.lines().count(), 6);
}

#[test]
fn test_shared_dependency_reported_once() {
    let temp = project(&[
        MODULE,
        ("a/a.tn", "package a\nimport _ \"example.com/my-project/shared\""),
        ("b/b.tn", "package b\nimport _ \"example.com/my-project/shared\""),
        ("shared/shared.tn", "package shared\nimport \"os\""),
    ]);

    let (result, output) = check(&Config::new(temp.path()), &["./a", "./b"]);
    assert_eq!(
        output,
        format!("{}/shared/shared.tn:2:8: \"os\" imported but not used\n", temp.path().display())
    );
    assert!(matches!(result, Err(Failure::Diagnostics { count: 1 })));
}

#[test]
fn test_external_test_errors_need_tests() {
    let temp = project(&[
        MODULE,
        ("foo/foo.tn", "package foo\nfn Foo() -> string {\n\treturn \"Foo\"\n}"),
        FOO_XTEST_UNUSED,
    ]);

    let (result, output) = check(&Config::new(temp.path()).with_tests(false), &["./foo"]);
    assert_eq!(output, "");
    assert!(result.is_ok());

    // as a dependency the package is never built with its tests
    write_tree(temp.path(), &[("app/app.tn", "package app\nimport _ \"example.com/my-project/foo\"")]);
    let (result, output) = check(&Config::new(temp.path()), &["./app"]);
    assert_eq!(output, "");
    assert!(result.is_ok());
}

#[test]
fn test_vendored_copy_wins_over_replacement() {
    let temp = project(REPLACED_AND_VENDORED);
    write_tree(
        temp.path(),
        &[("vendor/example.com/inner/inner.tn", "package inner\nfn Inner() {\n\treturn 1\n}")],
    );

    let (result, output) = check(&Config::new(temp.path()), &["."]);
    assert_eq!(
        output,
        format!(
            "{}/vendor/example.com/inner/inner.tn:3:9: no result values expected\n",
            temp.path().display()
        )
    );
    assert!(result.is_err());

    let (result, output) = check(&Config::new(temp.path()).with_mod_mode(ModMode::Mod), &["."]);
    assert_eq!(output, "");
    assert!(result.is_ok());
}

#[test]
fn test_unreadable_dependency_is_reported_without_position() {
    let temp = project(&[
        MODULE,
        ("app/app.tn", "package app\nimport \"example.com/my-project/bad\"\nfn App() {\n\tbad.Anything()\n}"),
    ]);
    fs::create_dir_all(temp.path().join("bad")).unwrap();
    fs::write(temp.path().join("bad/bad.tn"), [b'p', 0xff, 0xfe, b'\n']).unwrap();

    let (result, output) = check(&Config::new(temp.path()), &["./app"]);
    assert_eq!(
        output,
        format!(
            "-: cannot read {}/bad: stream did not contain valid UTF-8\n",
            temp.path().display()
        )
    );
    assert!(matches!(result, Err(Failure::Diagnostics { count: 1 })));
}

#[test]
fn test_cycle_through_internal_test_ignores_target_order() {
    let temp = project(&[
        MODULE,
        ("foo/foo.tn", "package foo\nfn Foo() {}"),
        ("foo/internal_test.tn", "package foo\nimport _ \"example.com/my-project/bar\""),
        ("bar/bar.tn", "package bar\nimport _ \"example.com/my-project/foo\""),
    ]);
    let expected = format!(
        "{}/foo/internal_test.tn:2:10: import cycle not allowed in test\n",
        temp.path().display()
    );

    let orders: [&[&str]; 3] = [&["./foo"], &["./bar", "./foo"], &["./foo", "./bar"]];
    for targets in orders {
        let (result, output) = check(&Config::new(temp.path()), targets);
        assert_eq!(output, expected, "targets {:?}", targets);
        assert!(matches!(result, Err(Failure::Diagnostics { count: 1 })));
    }

    // bar on its own is fine
    let (result, output) = check(&Config::new(temp.path()), &["./bar"]);
    assert_eq!(output, "");
    assert!(result.is_ok());
}

#[cfg(unix)]
#[test]
fn test_symlinked_working_dir_reports_real_paths() {
    let temp = project(&[]);
    let real = temp.path().join("real");
    write_tree(&real, &[MODULE, FOO_RETURNS_VALUE]);
    let link = temp.path().join("link");
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let (result, output) = check(&Config::new(link.clone()), &["./foo"]);
    assert_eq!(
        output,
        format!("{}/foo/foo.tn:3:9: no result values expected\n", real.display())
    );
    assert!(result.is_err());
}

#[test]
fn test_resolution_failure_is_written_once() {
    let temp = project(&[MODULE, ("foo/foo.tn", "package foo")]);

    let (result, output) = check(&Config::new(temp.path()), &["./foo", "./..."]);
    assert_eq!(output, "pattern \"./...\": \"...\" wildcards are not supported\n");
    let err = result.unwrap_err();
    assert!(matches!(err, Failure::Resolution(_)));
    assert_eq!(err.to_string(), "target resolution failed");
}

#[test]
fn test_pretty_format_keeps_unpositioned_lines() {
    let temp = project(&[MODULE, ("foo/foo.tn", "package foo"), ("foo/bar.tn", "package bar")]);

    let (_, output) = check(&Config::new(temp.path()).with_format(OutputFormat::Pretty), &["./foo"]);
    assert!(output.starts_with("-: found packages bar (bar.tn) and foo (foo.tn) in "));
    assert!(output.contains("package foo; expected bar"));
}

// =============================================================================
// Binary
// =============================================================================

fn tern_compiles(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_tern-compiles"))
        .arg("-C")
        .arg(dir)
        .args(args)
        .env_remove("TERN_MOD")
        .env_remove("TERN_MODCACHE")
        .env_remove("TERNPATH")
        .env_remove("TERN_LOG")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_binary_exit_codes() {
    let temp = project(&[
        MODULE,
        FOO_RETURNS_VALUE,
        ("bar/bar.tn", "package bar\nimport \"fmt\"\nfn Bar() { fmt.Println(\"bar\") }"),
    ]);

    let output = tern_compiles(temp.path(), &["./bar"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "");

    let output = tern_compiles(temp.path(), &["./foo", "./bar"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        format!("{}/foo/foo.tn:3:9: no result values expected\n", temp.path().display())
    );
    assert_eq!(String::from_utf8_lossy(&output.stderr), "");
}

#[test]
fn test_binary_mod_flag() {
    let temp = project(REPLACED_AND_VENDORED);
    write_tree(
        temp.path(),
        &[("vendor/example.com/inner/inner.tn", "package inner\nfn Inner() {\n\treturn 1\n}")],
    );

    let output = tern_compiles(temp.path(), &["--mod", "mod", "."]);
    assert!(output.status.success());

    let output = tern_compiles(temp.path(), &["--mod", "vendor", "."]);
    assert_eq!(output.status.code(), Some(1));
}

//! Source files and package directories

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tern_ast::{LineIndex, Span};
use tern_parser::{parse_source, ParsedFile};

use crate::unit::{Diagnostic, DiagnosticKind, Position};

pub const SOURCE_EXTENSION: &str = "tn";
const TEST_SUFFIX: &str = "_test.tn";

/// A source file, read and parsed once per session
#[derive(Debug)]
pub struct LoadedFile {
    pub path: PathBuf,
    /// File name within its directory
    pub name: String,
    pub text: String,
    pub line_index: LineIndex,
    pub parsed: ParsedFile,
    pub is_test: bool,
}

impl LoadedFile {
    pub fn has_syntax_errors(&self) -> bool {
        !self.parsed.errors.is_empty()
    }
}

/// File table of a session. A file's index is the `file_id` of its spans.
#[derive(Debug, Default)]
pub struct SourceMap {
    files: Vec<LoadedFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse `dir/name`.
    pub fn load(&mut self, dir: &Path, name: &str) -> io::Result<usize> {
        let path = dir.join(name);
        let text = fs::read_to_string(&path)?;
        Ok(self.add(path, text))
    }

    /// Add a file from memory.
    pub fn add(&mut self, path: PathBuf, text: String) -> usize {
        let file_id = self.files.len();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parsed = parse_source(&text, file_id);
        self.files.push(LoadedFile {
            line_index: LineIndex::new(&text),
            is_test: name.ends_with(TEST_SUFFIX),
            path,
            name,
            text,
            parsed,
        });
        file_id
    }

    pub fn file(&self, file_id: usize) -> &LoadedFile {
        &self.files[file_id]
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn position(&self, span: Span) -> Position {
        let file = self.file(span.file_id);
        let (line, col) = file.line_index.position(span.start);
        Position {
            path: file.path.clone(),
            line,
            col,
        }
    }

    /// A positioned diagnostic at `span`.
    pub fn diagnostic(&self, kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Diagnostic {
        Diagnostic::positioned(kind, self.position(span), span, message)
    }
}

/// Names of the source files in `dir`, sorted. Names starting with `.` or
/// `_` are ignored.
pub fn list_sources(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || name.starts_with('_') {
            continue;
        }
        if Path::new(&name).extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// The source files of one directory, grouped by variant.
#[derive(Debug, Clone, Default)]
pub struct DirPackage {
    pub dir: PathBuf,
    /// Package name fixed by the first file with a package clause
    pub name: Option<String>,
    pub normal: Vec<usize>,
    /// In-package test files
    pub test: Vec<usize>,
    /// Test files declaring `<name>_test`
    pub xtest: Vec<usize>,
    /// Conflicting package names
    pub structural: Vec<Diagnostic>,
    pub broken: bool,
}

impl DirPackage {
    /// Read, parse and group every source file of `dir`.
    pub fn load(dir: &Path, sources: &mut SourceMap) -> io::Result<DirPackage> {
        let mut files = Vec::new();
        for name in list_sources(dir)? {
            files.push(sources.load(dir, &name)?);
        }
        Ok(Self::group(dir, &files, sources))
    }

    pub fn group(dir: &Path, files: &[usize], sources: &SourceMap) -> DirPackage {
        let mut package = DirPackage {
            dir: dir.to_path_buf(),
            ..DirPackage::default()
        };
        let mut primary_file: Option<&str> = None;

        for &file_id in files {
            let file = sources.file(file_id);
            let Some(ast) = &file.parsed.file else {
                // contributes only its syntax errors
                if file.is_test {
                    package.test.push(file_id);
                } else {
                    package.normal.push(file_id);
                }
                continue;
            };

            let declared = ast.package.value.name.as_str();
            let (name, external) = match declared.strip_suffix("_test") {
                Some(base) if file.is_test && !base.is_empty() && package.name.as_deref() != Some(declared) => {
                    (base, true)
                }
                _ => (declared, false),
            };

            match package.name.clone() {
                None => {
                    package.name = Some(name.to_string());
                    primary_file = Some(file.name.as_str());
                }
                Some(primary) if primary != name && !package.broken => {
                    let first = primary_file.unwrap_or_default();
                    package.structural.push(Diagnostic::unpositioned(
                        DiagnosticKind::Structural,
                        format!(
                            "found packages {} ({}) and {} ({}) in {}",
                            primary,
                            first,
                            name,
                            file.name,
                            dir.display()
                        ),
                    ));
                    package.structural.push(sources.diagnostic(
                        DiagnosticKind::Structural,
                        ast.package_keyword,
                        format!("package {}; expected {}", declared, primary),
                    ));
                    package.broken = true;
                }
                Some(_) => {}
            }

            if external {
                package.xtest.push(file_id);
            } else if file.is_test {
                package.test.push(file_id);
            } else {
                package.normal.push(file_id);
            }
        }

        package
    }

    pub fn has_sources(&self) -> bool {
        !(self.normal.is_empty() && self.test.is_empty() && self.xtest.is_empty())
    }

    pub fn has_non_test_sources(&self) -> bool {
        !self.normal.is_empty()
    }

    pub fn package_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self
                .dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sources(files: &[(&str, &str)]) -> (SourceMap, Vec<usize>) {
        let mut map = SourceMap::new();
        let ids = files
            .iter()
            .map(|(name, text)| map.add(Path::new("/w/foo").join(name), text.to_string()))
            .collect();
        (map, ids)
    }

    #[test]
    fn test_grouping_by_variant() {
        let (map, ids) = sources(&[
            ("foo.tn", "package foo"),
            ("foo_internal_test.tn", "package foo"),
            ("foo_test.tn", "package foo_test"),
        ]);
        let package = DirPackage::group(Path::new("/w/foo"), &ids, &map);

        assert_eq!(package.name.as_deref(), Some("foo"));
        assert_eq!(package.normal, vec![ids[0]]);
        assert_eq!(package.test, vec![ids[1]]);
        assert_eq!(package.xtest, vec![ids[2]]);
        assert!(!package.broken);
        assert!(package.structural.is_empty());
    }

    #[test]
    fn test_conflicting_packages() {
        let (map, ids) = sources(&[("bar.tn", "package bar"), ("foo.tn", "package foo"), ("qux.tn", "package qux")]);
        let package = DirPackage::group(Path::new("/w/foo"), &ids, &map);

        assert!(package.broken);
        let lines: Vec<String> = package.structural.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "-: found packages bar (bar.tn) and foo (foo.tn) in /w/foo",
                "/w/foo/foo.tn:1:1: package foo; expected bar",
            ]
        );
    }

    #[test]
    fn test_test_suffix_matching_primary_is_in_package() {
        let (map, ids) = sources(&[("a.tn", "package foo_test"), ("b_test.tn", "package foo_test")]);
        let package = DirPackage::group(Path::new("/w/foo"), &ids, &map);

        assert_eq!(package.name.as_deref(), Some("foo_test"));
        assert!(!package.broken);
        assert_eq!(package.normal, vec![ids[0]]);
        assert_eq!(package.test, vec![ids[1]]);
        assert!(package.xtest.is_empty());
    }

    #[test]
    fn test_file_without_package_clause() {
        let (map, ids) = sources(&[("a.tn", "fn f() {}"), ("b.tn", "package foo")]);
        let package = DirPackage::group(Path::new("/w/foo"), &ids, &map);

        assert_eq!(package.name.as_deref(), Some("foo"));
        assert_eq!(package.normal, ids);
        assert!(map.file(ids[0]).has_syntax_errors());
    }

    #[test]
    fn test_list_sources_skips_ignored_names() {
        let temp = tempfile::tempdir().unwrap();
        for name in ["b.tn", "a.tn", "_skip.tn", ".hidden.tn", "notes.txt"] {
            fs::write(temp.path().join(name), "package p").unwrap();
        }
        fs::create_dir(temp.path().join("dir.tn")).unwrap();

        assert_eq!(list_sources(temp.path()).unwrap(), vec!["a.tn", "b.tn"]);
    }
}

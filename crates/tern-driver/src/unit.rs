//! Compilation units and their diagnostics

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tern_ast::Span;
use tern_typeck::PackageInterface;

/// Which files of a directory a unit is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variant {
    /// Non-test files
    Normal,
    /// Non-test files plus in-package test files
    Test,
    /// Test files declaring `<name>_test`
    XTest,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Normal => write!(f, "normal"),
            Variant::Test => write!(f, "test"),
            Variant::XTest => write!(f, "external test"),
        }
    }
}

/// Identity of a compilation unit: clean absolute directory plus variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId {
    pub dir: PathBuf,
    pub variant: Variant,
}

impl UnitId {
    pub fn new(dir: impl Into<PathBuf>, variant: Variant) -> Self {
        Self {
            dir: dir.into(),
            variant,
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.dir.display(), self.variant)
    }
}

/// Rendered source position; line and column are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub path: PathBuf,
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path.display(), self.line, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Conflicting package names in one directory
    Structural,
    Syntax,
    /// Unresolvable import or import cycle
    Import,
    Type,
    /// Failure reading sources
    Io,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// `None` for graph-level problems
    pub position: Option<Position>,
    /// Source span, kept for excerpt rendering
    pub span: Option<Span>,
    pub message: String,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn positioned(kind: DiagnosticKind, position: Position, span: Span, message: impl Into<String>) -> Self {
        Self {
            position: Some(position),
            span: Some(span),
            message: message.into(),
            kind,
        }
    }

    pub fn unpositioned(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            position: None,
            span: None,
            message: message.into(),
            kind,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.position {
            Some(position) => write!(f, "{}: {}", position, self.message),
            None => write!(f, "-: {}", self.message),
        }
    }
}

/// What an import path of a unit is bound to
#[derive(Debug, Clone)]
pub enum Binding {
    /// Index of another unit in the graph
    Unit(usize),
    Standard(Arc<PackageInterface>),
}

/// One package variant, checked as a whole
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub id: UnitId,
    pub import_path: String,
    pub name: String,
    /// Indices into the session's source map, sorted by file name
    pub files: Vec<usize>,
    /// Units this one imports, in first-import order
    pub imports: Vec<usize>,
    /// Successfully resolved imports by import path
    pub bindings: Vec<(String, Binding)>,
    pub diagnostics: Vec<Diagnostic>,
    /// Set once the unit has been checked
    pub interface: Option<Arc<PackageInterface>>,
    /// Not type-checked: structural error or unreadable directory
    pub broken: bool,
}

impl CompilationUnit {
    pub fn new(id: UnitId, import_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            import_path: import_path.into(),
            name: name.into(),
            files: Vec::new(),
            imports: Vec::new(),
            bindings: Vec::new(),
            diagnostics: Vec::new(),
            interface: None,
            broken: false,
        }
    }

    pub fn add_import(&mut self, unit: usize) {
        if !self.imports.contains(&unit) {
            self.imports.push(unit);
        }
    }
}

//! Dependency graph loader
//!
//! Builds every compilation unit reachable from the targets depth-first,
//! drops the import edges that close a cycle, then checks the units wave by
//! wave so that a unit is only checked once the interfaces of its imports
//! are known.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tern_ast::Span;
use tern_typeck::PackageInterface;
use tracing::{debug, trace, warn};

use crate::checker::{CheckFile, CheckRequest, Checker};
use crate::config::Config;
use crate::dep_graph::UnitGraph;
use crate::resolver::{ImportResolver, ResolvedImport};
use crate::source::{DirPackage, SourceMap};
use crate::target::Target;
use crate::unit::{Binding, CompilationUnit, Diagnostic, DiagnosticKind, UnitId, Variant};

/// Everything loaded for one invocation
#[derive(Debug)]
pub struct LoadSession {
    pub sources: SourceMap,
    pub graph: UnitGraph,
    /// Target units in request order; for each target its normal unit, then
    /// its test and external test units when built.
    pub roots: Vec<usize>,
}

impl LoadSession {
    /// Load and check the full graph of `targets`.
    pub fn load<C: Checker>(config: &Config, resolver: &ImportResolver, checker: &C, targets: &[Target]) -> LoadSession {
        let mut loader = Loader {
            resolver,
            checker,
            include_tests: config.include_tests,
            sources: SourceMap::new(),
            graph: UnitGraph::new(),
            packages: FxHashMap::default(),
            sites: Vec::new(),
        };

        let mut roots = Vec::new();
        for target in targets {
            loader.load_target(target, &mut roots);
        }
        loader.break_cycles();
        debug!(units = loader.graph.len(), files = loader.sources.len(), "loaded graph");

        let mut session = LoadSession {
            sources: loader.sources,
            graph: loader.graph,
            roots,
        };
        session.check_all(checker, config.jobs);
        session
    }

    fn check_all<C: Checker>(&mut self, checker: &C, jobs: usize) {
        let pool = if jobs == 1 {
            None
        } else {
            match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
                Ok(pool) => Some(pool),
                Err(err) => {
                    warn!(error = %err, "failed to build thread pool, checking sequentially");
                    None
                }
            }
        };

        for (depth, wave) in self.graph.waves().iter().enumerate() {
            debug!(depth, units = wave.len(), "checking wave");
            let session = &*self;
            let checked: Vec<(usize, PackageInterface, Vec<Diagnostic>)> = match &pool {
                Some(pool) => pool.install(|| {
                    wave.par_iter()
                        .map(|&idx| session.check_unit(checker, idx))
                        .collect()
                }),
                None => wave.iter().map(|&idx| session.check_unit(checker, idx)).collect(),
            };

            for (idx, interface, diagnostics) in checked {
                let unit = self.graph.get_mut(idx);
                unit.diagnostics.extend(diagnostics);
                unit.interface = Some(Arc::new(interface));
            }
        }
    }

    fn check_unit<C: Checker>(&self, checker: &C, idx: usize) -> (usize, PackageInterface, Vec<Diagnostic>) {
        let unit = self.graph.get(idx);
        if unit.broken {
            // importers refer to an unloadable package by its last path element
            let name = unit.import_path.rsplit('/').next().unwrap_or_default();
            return (idx, PackageInterface::incomplete(&unit.import_path, name), Vec::new());
        }

        let mut imports = FxHashMap::default();
        for (path, binding) in &unit.bindings {
            let interface = match binding {
                Binding::Unit(dep) => self.graph.get(*dep).interface.clone(),
                Binding::Standard(interface) => Some(Arc::clone(interface)),
            };
            // a unit without an interface is checked as unknown
            if let Some(interface) = interface {
                imports.insert(path.clone(), interface);
            }
        }

        let files: Vec<CheckFile<'_>> = unit
            .files
            .iter()
            .filter_map(|&file_id| {
                let file = self.sources.file(file_id);
                file.parsed.file.as_ref().map(|ast| CheckFile {
                    ast,
                    has_syntax_errors: file.has_syntax_errors(),
                })
            })
            .collect();
        if files.is_empty() {
            return (idx, PackageInterface::incomplete(&unit.import_path, &unit.name), Vec::new());
        }
        let missing_clause = files.len() != unit.files.len();

        let output = checker.check(&CheckRequest {
            import_path: &unit.import_path,
            files,
            imports,
        });
        trace!(unit = %unit.id, diagnostics = output.diagnostics.len(), "checked unit");

        let mut interface = output.interface;
        if missing_clause {
            interface.complete = false;
        }
        let diagnostics = output
            .diagnostics
            .into_iter()
            .map(|diagnostic| self.sources.diagnostic(DiagnosticKind::Type, diagnostic.span, diagnostic.message))
            .collect();

        (idx, interface, diagnostics)
    }
}

struct Loader<'a, C> {
    resolver: &'a ImportResolver,
    checker: &'a C,
    include_tests: bool,
    sources: SourceMap,
    graph: UnitGraph,
    /// Directories read so far; `Err` holds the read failure
    packages: FxHashMap<PathBuf, Result<DirPackage, String>>,
    /// Every import of one unit by another, in load order
    sites: Vec<ImportSite>,
}

struct ImportSite {
    unit: usize,
    dep: usize,
    span: Span,
}

impl<'a, C: Checker> Loader<'a, C> {
    fn load_target(&mut self, target: &Target, roots: &mut Vec<usize>) {
        roots.push(self.unit(&target.dir, Variant::Normal, &target.import_path));
        if !self.include_tests {
            return;
        }

        let (has_test, has_xtest) = match self.package(&target.dir) {
            Ok(package) => (!package.test.is_empty(), !package.xtest.is_empty()),
            Err(_) => (false, false),
        };
        if has_test {
            roots.push(self.unit(&target.dir, Variant::Test, &target.import_path));
        }
        if has_xtest {
            roots.push(self.unit(&target.dir, Variant::XTest, &target.import_path));
        }
    }

    fn package(&mut self, dir: &Path) -> &Result<DirPackage, String> {
        if !self.packages.contains_key(dir) {
            let loaded = DirPackage::load(dir, &mut self.sources)
                .map_err(|err| format!("cannot read {}: {}", dir.display(), err));
            trace!(dir = %dir.display(), ok = loaded.is_ok(), "read package directory");
            self.packages.insert(dir.to_path_buf(), loaded);
        }
        &self.packages[dir]
    }

    /// The unit `(dir, variant)`, built with its dependencies on first use.
    fn unit(&mut self, dir: &Path, variant: Variant, import_path: &str) -> usize {
        let id = UnitId::new(dir, variant);
        if let Some(idx) = self.graph.lookup(&id) {
            return idx;
        }

        let package = match self.package(dir).clone() {
            Ok(package) => package,
            Err(reason) => {
                let name = DirPackage {
                    dir: dir.to_path_buf(),
                    ..DirPackage::default()
                }
                .package_name();
                let mut unit = CompilationUnit::new(id, import_path, name);
                unit.broken = true;
                unit.diagnostics.push(Diagnostic::unpositioned(DiagnosticKind::Io, reason));
                return self.graph.insert(unit);
            }
        };

        let (unit_path, name, files) = match variant {
            Variant::Normal => (import_path.to_string(), package.package_name(), package.normal.clone()),
            Variant::Test => {
                let mut files = [package.normal.as_slice(), package.test.as_slice()].concat();
                files.sort_unstable();
                (import_path.to_string(), package.package_name(), files)
            }
            Variant::XTest => (
                format!("{}_test", import_path),
                format!("{}_test", package.package_name()),
                package.xtest.clone(),
            ),
        };

        let mut unit = CompilationUnit::new(id, unit_path, name);
        if variant == Variant::Normal {
            unit.diagnostics.extend(package.structural.iter().cloned());
        }
        for &file_id in &files {
            for error in &self.sources.file(file_id).parsed.errors {
                unit.diagnostics
                    .push(self.sources.diagnostic(DiagnosticKind::Syntax, error.span, error.message.clone()));
            }
        }
        unit.files = files.clone();
        unit.broken = package.broken;
        let broken = unit.broken;
        let idx = self.graph.insert(unit);
        trace!(dir = %dir.display(), %variant, idx, "new unit");
        if broken {
            return idx;
        }

        let mut resolved: FxHashMap<String, Result<Binding, String>> = FxHashMap::default();
        let mut bindings = Vec::new();
        let mut edges = Vec::new();
        let mut diagnostics = Vec::new();

        for &file_id in &files {
            let imports: Vec<_> = match &self.sources.file(file_id).parsed.file {
                Some(ast) => ast
                    .imports
                    .iter()
                    .map(|import| (import.path.value.clone(), import.path.span))
                    .collect(),
                None => continue,
            };

            for (path, span) in imports {
                let outcome = match resolved.get(&path) {
                    Some(outcome) => outcome.clone(),
                    None => {
                        let outcome = self.bind_import(&path, dir, variant, &package);
                        if let Ok(binding) = &outcome {
                            if let Binding::Unit(dep) = binding {
                                edges.push(*dep);
                            }
                            bindings.push((path.clone(), binding.clone()));
                        }
                        resolved.insert(path.clone(), outcome.clone());
                        outcome
                    }
                };
                match outcome {
                    Ok(Binding::Unit(dep)) => self.sites.push(ImportSite { unit: idx, dep, span }),
                    Ok(Binding::Standard(_)) => {}
                    Err(message) => diagnostics.push(self.sources.diagnostic(DiagnosticKind::Import, span, message)),
                }
            }
        }

        let unit = self.graph.get_mut(idx);
        unit.diagnostics.extend(diagnostics);
        unit.bindings = bindings;
        for dep in edges {
            unit.add_import(dep);
        }
        idx
    }

    fn bind_import(&mut self, path: &str, dir: &Path, variant: Variant, package: &DirPackage) -> Result<Binding, String> {
        let (dep_dir, dep_path) = match self.resolver.resolve(path, dir) {
            Ok(ResolvedImport::Standard(std_path)) => {
                return self
                    .checker
                    .standard_package(&std_path)
                    .map(Binding::Standard)
                    .ok_or_else(|| format!("could not import {} (package {} is not in std)", path, std_path));
            }
            Ok(ResolvedImport::Dir { dir, import_path }) => (dir, import_path),
            Err(reason) => return Err(format!("could not import {} ({})", path, reason)),
        };

        // the package under test, seen from its external tests
        if variant == Variant::XTest && dep_dir == dir {
            let under_test = if package.test.is_empty() {
                Variant::Normal
            } else {
                Variant::Test
            };
            return Ok(Binding::Unit(self.unit(dir, under_test, &dep_path)));
        }

        let no_sources = matches!(self.package(&dep_dir), Ok(dep) if !dep.has_non_test_sources());
        if no_sources {
            return Err(format!(
                "could not import {} (no non-test Tern files in {})",
                path,
                dep_dir.display()
            ));
        }

        Ok(Binding::Unit(self.unit(&dep_dir, Variant::Normal, &dep_path)))
    }

    /// Whether the import at `site` closes a cycle: a normal unit reaching
    /// itself again, or a test unit reaching the normal unit of its own
    /// directory. External tests sit on top of the graph and never do.
    fn closes_cycle(&self, site: &ImportSite) -> bool {
        let unit = self.graph.get(site.unit);
        if unit.id.variant == Variant::XTest {
            return false;
        }
        self.graph
            .lookup(&UnitId::new(unit.id.dir.clone(), Variant::Normal))
            .is_some_and(|own| self.graph.reaches(site.dep, own))
    }

    /// Report every import closing a cycle at its import site and drop its
    /// edge, leaving the graph acyclic.
    fn break_cycles(&mut self) {
        let closing: Vec<bool> = self.sites.iter().map(|site| self.closes_cycle(site)).collect();

        for (site, closes) in self.sites.iter().zip(closing) {
            if !closes {
                continue;
            }
            let unit = self.graph.get_mut(site.unit);
            debug!(unit = %unit.id, dep = site.dep, "import cycle");
            let message = match unit.id.variant {
                Variant::Test => "import cycle not allowed in test",
                _ => "import cycle not allowed",
            };
            unit.diagnostics
                .push(self.sources.diagnostic(DiagnosticKind::Import, site.span, message));
            unit.imports.retain(|&dep| dep != site.dep);
            unit.bindings
                .retain(|(_, binding)| !matches!(binding, Binding::Unit(dep) if *dep == site.dep));
        }
    }
}

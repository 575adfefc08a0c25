//! Tern Compiler Driver Library
//!
//! Batch compilation checker for Tern packages. Resolves the requested
//! targets, loads their full dependency graph (modules, replacements,
//! vendored copies and test variants), type checks every unit and reports
//! each diagnostic once, in a deterministic order.
//!
//! The pipeline runs one way: target strings → resolved targets → loaded
//! graph → collected diagnostics → rendered text and verdict.

pub mod config;
pub mod error;
pub mod manifest;
pub mod vendor;
pub mod resolver;
pub mod target;
pub mod source;
pub mod unit;
pub mod dep_graph;
pub mod checker;
pub mod loader;
pub mod collector;
pub mod reporter;

use std::io::Write;

use tracing::debug;

pub use checker::{CheckDiagnostic, CheckFile, CheckOutput, CheckRequest, Checker, TernChecker};
pub use config::{Config, ModMode};
pub use error::{Failure, ManifestError, ResolutionError};
pub use loader::LoadSession;
pub use reporter::{OutputFormat, Reporter};
pub use resolver::{ImportResolver, ResolvedImport};
pub use target::{resolve_targets, Target};
pub use unit::{CompilationUnit, Diagnostic, DiagnosticKind, Position, UnitId, Variant};

/// Check `targets` with the Tern type checker.
pub fn run<S: AsRef<str>>(targets: &[S], config: &Config, out: &mut dyn Write) -> Result<(), Failure> {
    run_with_checker(&TernChecker, targets, config, out)
}

/// Check `targets`, writing every diagnostic to `out`.
///
/// Succeeds without output iff no diagnostic was found. Resolution
/// failures are written to `out` before `Failure::Resolution` is returned.
pub fn run_with_checker<C: Checker, S: AsRef<str>>(
    checker: &C,
    targets: &[S],
    config: &Config,
    out: &mut dyn Write,
) -> Result<(), Failure> {
    let resolved = ImportResolver::new(config)
        .and_then(|resolver| resolve_targets(targets, &resolver, config.include_tests).map(|t| (resolver, t)));
    let (resolver, targets) = match resolved {
        Ok(resolved) => resolved,
        Err(err) => {
            writeln!(out, "{}", err)?;
            out.flush()?;
            return Err(Failure::Resolution(err));
        }
    };

    let session = LoadSession::load(config, &resolver, checker, &targets);
    let diagnostics = collector::collect(&session);
    let count = Reporter::new(config.format).report(&diagnostics, &session.sources, out)?;
    debug!(count, "done");

    if count > 0 {
        Err(Failure::Diagnostics { count })
    } else {
        Ok(())
    }
}

//! Target resolution
//!
//! A target starting with `.` or `/` names a directory relative to the
//! working directory; anything else is an import path, resolved the way an
//! import of the working directory would be.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ResolutionError;
use crate::resolver::{absolutize, ImportResolver, ResolvedImport};
use crate::source::list_sources;

/// A requested compilation unit location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// As given by the caller
    pub spec: String,
    pub dir: PathBuf,
    pub import_path: String,
}

/// Resolve every target, in order. The first failure aborts resolution.
pub fn resolve_targets<S: AsRef<str>>(
    specs: &[S],
    resolver: &ImportResolver,
    include_tests: bool,
) -> Result<Vec<Target>, ResolutionError> {
    if specs.is_empty() {
        return Err(ResolutionError::NoTargets);
    }

    specs
        .iter()
        .map(|spec| resolve_target(spec.as_ref(), resolver, include_tests))
        .collect()
}

fn resolve_target(spec: &str, resolver: &ImportResolver, include_tests: bool) -> Result<Target, ResolutionError> {
    if spec.contains("...") {
        return Err(ResolutionError::Wildcard(spec.to_string()));
    }

    let working_dir = resolver.working_dir();
    let (dir, import_path) = if is_local_target(spec) {
        let dir = absolutize(working_dir, Path::new(spec));
        if !dir.is_dir() {
            return Err(ResolutionError::NotFound {
                target: spec.to_string(),
                dir,
            });
        }
        let import_path = resolver.import_path_for_dir(&dir);
        (dir, import_path)
    } else {
        match resolver.resolve(spec, working_dir) {
            Ok(ResolvedImport::Standard(path)) => return Err(ResolutionError::Standard(path)),
            Ok(ResolvedImport::Dir { dir, import_path }) => (dir, import_path),
            Err(reason) => {
                return Err(ResolutionError::Import {
                    target: spec.to_string(),
                    reason,
                })
            }
        }
    };

    let names = list_sources(&dir).map_err(|source| ResolutionError::Io {
        path: dir.clone(),
        source,
    })?;
    if names.is_empty() {
        return Err(ResolutionError::NoSources { dir });
    }
    if !include_tests && names.iter().all(|name| name.ends_with("_test.tn")) {
        return Err(ResolutionError::NoNonTestSources { dir });
    }

    debug!(spec, dir = %dir.display(), import_path = %import_path, "resolved target");
    Ok(Target {
        spec: spec.to_string(),
        dir,
        import_path,
    })
}

fn is_local_target(spec: &str) -> bool {
    spec.starts_with('.') || Path::new(spec).is_absolute()
}

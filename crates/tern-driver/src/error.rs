//! Error types of the pipeline

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A malformed `tern.mod` or `vendor/modules.txt`
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("{}:{line}: {reason}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("{}: no module declaration", path.display())]
    MissingModule { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A target that cannot be mapped to an on-disk compilation unit. Fatal:
/// nothing is loaded.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("no packages to check")]
    NoTargets,

    #[error("pattern {0:?}: \"...\" wildcards are not supported")]
    Wildcard(String),

    #[error("{0:?} is a standard package")]
    Standard(String),

    #[error("cannot find package {target:?} in {}", dir.display())]
    NotFound { target: String, dir: PathBuf },

    #[error("no Tern files in {}", dir.display())]
    NoSources { dir: PathBuf },

    #[error("no non-test Tern files in {}", dir.display())]
    NoNonTestSources { dir: PathBuf },

    #[error("{target}: {reason}")]
    Import { target: String, reason: String },

    #[error("inconsistent vendoring in {}: {}", root.display(), problems.join("; "))]
    InconsistentVendoring { root: PathBuf, problems: Vec<String> },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Overall failure of a run.
///
/// Diagnostic and resolution text has already been written to the output
/// sink when one of these is returned, so the messages here only summarize.
#[derive(Debug, Error)]
pub enum Failure {
    #[error("{count} problem(s) found")]
    Diagnostics { count: usize },

    #[error("target resolution failed")]
    Resolution(#[source] ResolutionError),

    #[error("failed to write diagnostics: {0}")]
    Output(#[from] io::Error),
}

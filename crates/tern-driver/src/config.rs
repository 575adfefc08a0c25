//! Session configuration
//!
//! Everything the pipeline needs from its environment is captured here once,
//! before any target is resolved. Nothing below this layer reads process
//! environment.

use std::path::{Path, PathBuf};

use crate::reporter::OutputFormat;

/// Whether vendored copies of dependencies are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModMode {
    /// Vendor mode iff `<module root>/vendor` is a directory
    #[default]
    Auto,
    Vendor,
    Mod,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory for relative targets; the manifest search starts here.
    pub working_dir: PathBuf,
    pub mod_mode: ModMode,
    /// Build test variants for requested targets
    pub include_tests: bool,
    /// Root of the module cache (`<cache>/<module>@<version>`)
    pub module_cache: Option<PathBuf>,
    /// Legacy search roots, each holding a `src/` tree
    pub search_paths: Vec<PathBuf>,
    /// Worker threads for checking; 0 picks the rayon default, 1 checks
    /// sequentially.
    pub jobs: usize,
    pub format: OutputFormat,
}

impl Config {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            mod_mode: ModMode::Auto,
            include_tests: true,
            module_cache: None,
            search_paths: Vec::new(),
            jobs: 0,
            format: OutputFormat::Plain,
        }
    }

    pub fn with_mod_mode(mut self, mode: ModMode) -> Self {
        self.mod_mode = mode;
        self
    }

    pub fn with_tests(mut self, include_tests: bool) -> Self {
        self.include_tests = include_tests;
        self
    }

    pub fn with_module_cache(mut self, cache: impl Into<PathBuf>) -> Self {
        self.module_cache = Some(cache.into());
        self
    }

    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

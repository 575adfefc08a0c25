//! Import path resolution
//!
//! Maps an import path to the directory holding its sources, following the
//! manifest's requirements and replacements, the vendor directory, or the
//! legacy search paths when there is no manifest.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tern_typeck::is_standard_path;
use tracing::{debug, trace};

use crate::config::{Config, ModMode};
use crate::error::ResolutionError;
use crate::manifest::{Manifest, ReplaceTarget};
use crate::vendor::{check_consistency, vendored_dir, ModulesTxt, VENDOR_DIR};

/// Represents a resolved import
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolvedImport {
    /// Standard package, provided by the checker
    Standard(String),
    /// Package directory on disk
    Dir { dir: PathBuf, import_path: String },
}

#[derive(Debug, Clone)]
enum BuildMode {
    Module {
        manifest: Manifest,
        /// `Some` in vendor mode; the listing is empty when there is no
        /// `modules.txt`.
        vendor: Option<Option<ModulesTxt>>,
    },
    Legacy,
}

/// Import resolver for one session
#[derive(Debug, Clone)]
pub struct ImportResolver {
    working_dir: PathBuf,
    mode: BuildMode,
    module_cache: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
}

impl ImportResolver {
    /// Locates the manifest and settles the build mode.
    ///
    /// Symlinks in the working directory are resolved once here; every path
    /// derived from it afterwards is cleaned lexically.
    pub fn new(config: &Config) -> Result<Self, ResolutionError> {
        let working_dir = match fs::canonicalize(config.working_dir()) {
            Ok(dir) => dir,
            Err(err) => {
                trace!(dir = %config.working_dir().display(), error = %err, "working directory not canonicalized");
                clean_path(config.working_dir())
            }
        };
        let mode = match Manifest::find(&working_dir)? {
            Some(manifest) => {
                let vendor_root = manifest.root.join(VENDOR_DIR);
                let vendor_mode = match config.mod_mode {
                    ModMode::Vendor => true,
                    ModMode::Mod => false,
                    ModMode::Auto => vendor_root.is_dir(),
                };
                let vendor = if vendor_mode {
                    let listing = ModulesTxt::load(&vendor_root)?;
                    check_consistency(&manifest, listing.as_ref().unwrap_or(&ModulesTxt::default()))?;
                    Some(listing)
                } else {
                    None
                };
                debug!(
                    module = %manifest.module,
                    root = %manifest.root.display(),
                    vendor = vendor_mode,
                    "module mode"
                );
                BuildMode::Module { manifest, vendor }
            }
            None => {
                debug!("no {} found, legacy mode", crate::manifest::MANIFEST_FILE);
                BuildMode::Legacy
            }
        };

        Ok(Self {
            mode,
            module_cache: config.module_cache.as_ref().map(|dir| absolutize(&working_dir, dir)),
            search_paths: config
                .search_paths
                .iter()
                .map(|dir| absolutize(&working_dir, dir))
                .collect(),
            working_dir,
        })
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        match &self.mode {
            BuildMode::Module { manifest, .. } => Some(manifest),
            BuildMode::Legacy => None,
        }
    }

    pub fn is_vendor_mode(&self) -> bool {
        matches!(self.mode, BuildMode::Module { vendor: Some(_), .. })
    }

    /// Resolve an import path seen in a file of `from_dir`.
    ///
    /// The error is the reason shown in `could not import P (<reason>)`.
    pub fn resolve(&self, import_path: &str, from_dir: &Path) -> Result<ResolvedImport, String> {
        if is_standard_path(import_path) {
            return Ok(ResolvedImport::Standard(import_path.to_string()));
        }

        let dir = match &self.mode {
            BuildMode::Module { manifest, vendor } => self.resolve_module(manifest, vendor.as_ref(), import_path)?,
            BuildMode::Legacy => self.resolve_legacy(import_path, from_dir)?,
        };
        trace!(import = import_path, dir = %dir.display(), "resolved");

        Ok(ResolvedImport::Dir {
            dir,
            import_path: import_path.to_string(),
        })
    }

    fn resolve_module(
        &self,
        manifest: &Manifest,
        vendor: Option<&Option<ModulesTxt>>,
        import_path: &str,
    ) -> Result<PathBuf, String> {
        if manifest.contains(import_path) {
            let rest = import_path[manifest.module.len()..].trim_start_matches('/');
            let dir = join_import(&manifest.root, rest);
            return if dir.is_dir() {
                Ok(dir)
            } else {
                Err(format!("directory {} does not exist", dir.display()))
            };
        }

        if let Some(listing) = vendor {
            let disabled = || {
                format!(
                    "cannot find module providing package {}: import lookup disabled by -mod=vendor",
                    import_path
                )
            };
            if let Some(listing) = listing {
                if !listing.provides(import_path) {
                    return Err(disabled());
                }
            }
            let dir = vendored_dir(&manifest.root, import_path);
            return if dir.is_dir() { Ok(dir) } else { Err(disabled()) };
        }

        let Some(req) = manifest.require_for(import_path) else {
            return Err(format!("no required module provides package {}", import_path));
        };
        let rest = import_path[req.module.len()..].trim_start_matches('/');

        let dir = match manifest.replacement(&req.module, &req.version).map(|r| &r.target) {
            Some(ReplaceTarget::Local(dir)) => join_import(&absolutize(&manifest.root, dir), rest),
            Some(ReplaceTarget::Module { module, version }) => self.cached_module(module, version, rest)?,
            None => self.cached_module(&req.module, &req.version, rest)?,
        };

        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(format!(
                "module {}@{} found, but does not contain package {}",
                req.module, req.version, import_path
            ))
        }
    }

    fn cached_module(&self, module: &str, version: &str, rest: &str) -> Result<PathBuf, String> {
        let cache = self
            .module_cache
            .as_ref()
            .ok_or_else(|| format!("module {}@{} is not in the module cache", module, version))?;
        let module_dir = join_import(cache, module);
        let versioned = module_dir.with_file_name(format!(
            "{}@{}",
            module_dir.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
            version
        ));
        Ok(join_import(&versioned, rest))
    }

    /// Nearest `vendor/<path>` walking up from the importer, then the search
    /// paths.
    fn resolve_legacy(&self, import_path: &str, from_dir: &Path) -> Result<PathBuf, String> {
        let mut current = Some(from_dir);
        while let Some(dir) = current {
            let candidate = vendored_dir(dir, import_path);
            if candidate.is_dir() {
                return Ok(candidate);
            }
            current = dir.parent();
        }

        for search_path in &self.search_paths {
            let candidate = join_import(&search_path.join("src"), import_path);
            if candidate.is_dir() {
                return Ok(candidate);
            }
        }

        Err(format!("cannot find package {:?}", import_path))
    }

    /// Import path identity of a local package directory.
    pub fn import_path_for_dir(&self, dir: &Path) -> String {
        match &self.mode {
            BuildMode::Module { manifest, .. } => {
                if let Ok(rel) = dir.strip_prefix(&manifest.root) {
                    let rel = slash_path(rel);
                    if let Some(vendored) = rel.strip_prefix("vendor/") {
                        return vendored.to_string();
                    }
                    return if rel.is_empty() {
                        manifest.module.clone()
                    } else {
                        format!("{}/{}", manifest.module, rel)
                    };
                }
            }
            BuildMode::Legacy => {
                for search_path in &self.search_paths {
                    if let Ok(rel) = dir.strip_prefix(search_path.join("src")) {
                        let rel = slash_path(rel);
                        if !rel.is_empty() {
                            return rel;
                        }
                    }
                }
            }
        }
        format!("_{}", dir.display())
    }
}

/// `base` joined with each element of a slash-separated import path.
fn join_import(base: &Path, import_path: &str) -> PathBuf {
    import_path
        .split('/')
        .filter(|element| !element.is_empty())
        .fold(base.to_path_buf(), |dir, element| dir.join(element))
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Lexically cleans a path: drops `.`, folds `..` into its parent. Symlinks
/// are not resolved.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => cleaned.push(".."),
            },
            other => cleaned.push(other.as_os_str()),
        }
    }
    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }
    cleaned
}

/// `path` made absolute against `base`, then cleaned.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        clean_path(path)
    } else {
        clean_path(&base.join(path))
    }
}

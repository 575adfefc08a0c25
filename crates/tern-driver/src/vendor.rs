//! Vendored dependencies
//!
//! In vendor mode every non-main-module import is served from
//! `<root>/vendor/<import path>`, as listed by `vendor/modules.txt`:
//!
//! ```text
//! # example.com/inner v1.0.0 => ./inner
//! ## explicit
//! example.com/inner
//! example.com/inner/sub
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ManifestError, ResolutionError};
use crate::manifest::Manifest;

pub const VENDOR_DIR: &str = "vendor";
pub const MODULES_TXT: &str = "modules.txt";

/// Contents of `vendor/modules.txt`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModulesTxt {
    pub modules: Vec<VendoredModule>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendoredModule {
    pub module: String,
    /// `None` for replacement-only entries (`# module => target`)
    pub version: Option<String>,
    pub replacement: Option<String>,
    pub explicit: bool,
    pub packages: Vec<String>,
}

impl ModulesTxt {
    /// Reads `<vendor_dir>/modules.txt`; a missing file is an empty listing.
    pub fn load(vendor_dir: &Path) -> Result<Option<ModulesTxt>, ManifestError> {
        let path = vendor_dir.join(MODULES_TXT);
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|source| ManifestError::Io {
            path: path.clone(),
            source,
        })?;
        parse_modules_txt(&content, &path).map(Some)
    }

    /// Whether some vendored module lists `import_path` as one of its packages.
    pub fn provides(&self, import_path: &str) -> bool {
        self.modules
            .iter()
            .any(|module| module.packages.iter().any(|pkg| pkg == import_path))
    }

    fn versioned(&self, module: &str) -> Option<&VendoredModule> {
        self.modules
            .iter()
            .find(|entry| entry.module == module && entry.version.is_some())
    }
}

/// Parse `modules.txt` content; `path` is used for messages.
pub fn parse_modules_txt(content: &str, path: &Path) -> Result<ModulesTxt, ManifestError> {
    let mut listing = ModulesTxt::default();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(annotation) = line.strip_prefix("##") {
            let explicit = annotation.split(';').any(|part| part.trim() == "explicit");
            if let Some(current) = listing.modules.last_mut() {
                current.explicit |= explicit;
            }
            continue;
        }

        if let Some(header) = line.strip_prefix('#') {
            let fields: Vec<&str> = header.split_whitespace().collect();
            let (spec, replacement) = match fields.iter().position(|f| *f == "=>") {
                Some(arrow) => (&fields[..arrow], Some(fields[arrow + 1..].join(" "))),
                None => (&fields[..], None),
            };
            let (module, version) = match spec {
                [module] => (module.to_string(), None),
                [module, version] => (module.to_string(), Some(version.to_string())),
                _ => {
                    return Err(ManifestError::Syntax {
                        path: path.to_path_buf(),
                        line: index + 1,
                        reason: "malformed module line".to_string(),
                    })
                }
            };
            listing.modules.push(VendoredModule {
                module,
                version,
                replacement,
                explicit: false,
                packages: Vec::new(),
            });
            continue;
        }

        match listing.modules.last_mut() {
            Some(current) => current.packages.push(line.to_string()),
            None => {
                return Err(ManifestError::Syntax {
                    path: path.to_path_buf(),
                    line: index + 1,
                    reason: "package listed before any module".to_string(),
                })
            }
        }
    }

    Ok(listing)
}

/// Verifies that `modules.txt` agrees with the manifest's requirements.
pub fn check_consistency(manifest: &Manifest, listing: &ModulesTxt) -> Result<(), ResolutionError> {
    let mut problems = Vec::new();

    for req in &manifest.requires {
        match listing.versioned(&req.module) {
            Some(entry) if entry.explicit && entry.version.as_deref() == Some(req.version.as_str()) => {}
            Some(entry) if entry.explicit => problems.push(format!(
                "{}@{}: is marked as explicit in vendor/modules.txt, but tern.mod requires {}@{}",
                entry.module,
                entry.version.as_deref().unwrap_or_default(),
                req.module,
                req.version
            )),
            _ => problems.push(format!(
                "{}@{}: is explicitly required in tern.mod, but not marked as explicit in vendor/modules.txt",
                req.module, req.version
            )),
        }
    }

    for entry in listing.modules.iter().filter(|entry| entry.explicit) {
        if !manifest.requires.iter().any(|req| req.module == entry.module) {
            problems.push(format!(
                "{}@{}: is marked as explicit in vendor/modules.txt, but not explicitly required in tern.mod",
                entry.module,
                entry.version.as_deref().unwrap_or_default()
            ));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ResolutionError::InconsistentVendoring {
            root: manifest.root.clone(),
            problems,
        })
    }
}

/// Location of a vendored package.
pub fn vendored_dir(root: &Path, import_path: &str) -> PathBuf {
    import_path
        .split('/')
        .fold(root.join(VENDOR_DIR), |dir, element| dir.join(element))
}

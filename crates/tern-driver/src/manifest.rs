//! `tern.mod` parser
//!
//! Line-oriented manifest naming the main module, its required modules and
//! local or module replacements. `//` starts a comment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ManifestError;

pub const MANIFEST_FILE: &str = "tern.mod";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Path of the manifest file itself
    pub path: PathBuf,
    /// Directory containing the manifest
    pub root: PathBuf,
    pub module: String,
    pub tern_version: Option<String>,
    pub requires: Vec<Require>,
    pub replaces: Vec<Replace>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Require {
    pub module: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    pub module: String,
    /// `None` replaces every version
    pub version: Option<String>,
    pub target: ReplaceTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceTarget {
    /// Directory, relative to the module root unless absolute
    Local(PathBuf),
    Module { module: String, version: String },
}

impl Manifest {
    /// Finds the nearest manifest at or above `start`.
    pub fn find(start: &Path) -> Result<Option<Manifest>, ManifestError> {
        let mut current = Some(start);

        while let Some(dir) = current {
            let candidate = dir.join(MANIFEST_FILE);
            if candidate.is_file() {
                return parse_manifest(&candidate).map(Some);
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Whether `import_path` belongs to the main module.
    pub fn contains(&self, import_path: &str) -> bool {
        path_has_prefix(import_path, &self.module)
    }

    /// The required module with the longest prefix of `import_path`.
    pub fn require_for(&self, import_path: &str) -> Option<&Require> {
        self.requires
            .iter()
            .filter(|req| path_has_prefix(import_path, &req.module))
            .max_by_key(|req| req.module.len())
    }

    /// Replacement for `module@version`; a version-specific one wins over a
    /// wildcard.
    pub fn replacement(&self, module: &str, version: &str) -> Option<&Replace> {
        let mut wildcard = None;
        for replace in self.replaces.iter().filter(|r| r.module == module) {
            match &replace.version {
                Some(v) if v == version => return Some(replace),
                Some(_) => {}
                None => wildcard = Some(replace),
            }
        }
        wildcard
    }
}

/// `path` equals `prefix` or continues it with a `/`.
pub fn path_has_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Parse a `tern.mod` file
pub fn parse_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_manifest_str(&content, path)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    Require,
    Replace,
}

/// Parse manifest content; `path` is used for messages and to locate the root.
pub fn parse_manifest_str(content: &str, path: &Path) -> Result<Manifest, ManifestError> {
    let syntax = |line: usize, reason: &str| ManifestError::Syntax {
        path: path.to_path_buf(),
        line,
        reason: reason.to_string(),
    };

    let mut module = None;
    let mut tern_version = None;
    let mut requires = Vec::new();
    let mut replaces = Vec::new();
    let mut block: Option<(Block, usize)> = None;

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let fields = tokenize(raw);
        if fields.is_empty() {
            continue;
        }

        if let Some((kind, _)) = block {
            if fields == [")"] {
                block = None;
                continue;
            }
            match kind {
                Block::Require => requires.push(parse_require(&fields).map_err(|r| syntax(line_no, r))?),
                Block::Replace => replaces.push(parse_replace(&fields).map_err(|r| syntax(line_no, r))?),
            }
            continue;
        }

        let (directive, args) = (fields[0].as_str(), &fields[1..]);
        match directive {
            "module" => {
                if module.is_some() {
                    return Err(syntax(line_no, "repeated module directive"));
                }
                match args {
                    [name] => module = Some(name.clone()),
                    _ => return Err(syntax(line_no, "usage: module module/path")),
                }
            }
            "tern" => match args {
                [version] => tern_version = Some(version.clone()),
                _ => return Err(syntax(line_no, "usage: tern 1.2")),
            },
            "require" | "replace" => {
                let kind = if directive == "require" {
                    Block::Require
                } else {
                    Block::Replace
                };
                if args.len() == 1 && args[0] == "(" {
                    block = Some((kind, line_no));
                    continue;
                }
                match kind {
                    Block::Require => requires.push(parse_require(args).map_err(|r| syntax(line_no, r))?),
                    Block::Replace => replaces.push(parse_replace(args).map_err(|r| syntax(line_no, r))?),
                }
            }
            other => {
                return Err(syntax(line_no, &format!("unknown directive: {}", other)));
            }
        }
    }

    if let Some((_, line)) = block {
        return Err(syntax(line, "unterminated block"));
    }
    let module = module.ok_or_else(|| ManifestError::MissingModule {
        path: path.to_path_buf(),
    })?;

    Ok(Manifest {
        path: path.to_path_buf(),
        root: path.parent().map(Path::to_path_buf).unwrap_or_default(),
        module,
        tern_version,
        requires,
        replaces,
    })
}

/// Splits a line into fields, dropping `//` comments and surrounding quotes.
fn tokenize(line: &str) -> Vec<String> {
    let line = match line.find("//") {
        Some(comment) => &line[..comment],
        None => line,
    };
    line.split_whitespace()
        .map(|field| field.trim_matches('"').to_string())
        .collect()
}

fn parse_require(args: &[String]) -> Result<Require, &'static str> {
    match args {
        [module, version] => Ok(Require {
            module: module.clone(),
            version: version.clone(),
        }),
        _ => Err("usage: require module/path v1.2.3"),
    }
}

fn parse_replace(args: &[String]) -> Result<Replace, &'static str> {
    const USAGE: &str = "usage: replace module/path [v1.2.3] => other/module v1.4 | ../local/directory";

    let arrow = args.iter().position(|arg| arg == "=>").ok_or(USAGE)?;
    let (module, version) = match &args[..arrow] {
        [module] => (module.clone(), None),
        [module, version] => (module.clone(), Some(version.clone())),
        _ => return Err(USAGE),
    };

    let target = match &args[arrow + 1..] {
        [dir] if is_local_path(dir) => ReplaceTarget::Local(PathBuf::from(dir)),
        [_] => {
            return Err("replacement module without version must be a directory path (rooted or starting with ./ or ../)")
        }
        [dir, _] if is_local_path(dir) => return Err("replacement directory cannot have a version"),
        [target, target_version] => ReplaceTarget::Module {
            module: target.clone(),
            version: target_version.clone(),
        },
        _ => return Err(USAGE),
    };

    Ok(Replace {
        module,
        version,
        target,
    })
}

fn is_local_path(path: &str) -> bool {
    path == "." || path == ".." || path.starts_with("./") || path.starts_with("../") || path.starts_with('/')
}

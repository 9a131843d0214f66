//! Installed package store.
//!
//! The install step leaves one directory per pinned dependency:
//!
//! ```text
//! <store>/<name>/<version>/
//!   package.toml        src-dirs = ["res/bindings"], include-dirs = ["include"]
//!   ...
//! ```
//!
//! Directories listed in `package.toml` are relative to the package directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::core::dependency::DependencyRef;

/// Metadata file name inside each installed package.
pub const PACKAGE_METADATA: &str = "package.toml";

/// Errors while reading the package store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("`{dep}` is not installed (no metadata at {path})")]
    MissingPackage { dep: DependencyRef, path: PathBuf },

    #[error("failed to read package metadata {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid package metadata {path}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("package metadata {path} lists an absolute or escaping directory `{dir}`")]
    InvalidDir { path: PathBuf, dir: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawMetadata {
    src_dirs: Vec<String>,
    include_dirs: Vec<String>,
}

/// A dependency as installed in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub dep: DependencyRef,
    pub root: PathBuf,
    /// Absolute source directories.
    pub src_dirs: Vec<PathBuf>,
    /// Absolute include directories.
    pub include_dirs: Vec<PathBuf>,
}

impl InstalledPackage {
    /// Package with no declared directories, rooted at `root`.
    pub fn bare(dep: DependencyRef, root: impl Into<PathBuf>) -> Self {
        InstalledPackage {
            dep,
            root: root.into(),
            src_dirs: Vec::new(),
            include_dirs: Vec::new(),
        }
    }

    pub fn with_src_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.src_dirs.push(self.root.join(dir));
        self
    }
}

/// Directory of installed packages.
#[derive(Debug, Clone)]
pub struct PackageStore {
    root: PathBuf,
}

impl PackageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        PackageStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a dependency is installed into.
    pub fn package_dir(&self, dep: &DependencyRef) -> PathBuf {
        self.root.join(dep.name()).join(dep.version())
    }

    /// Read the metadata of an installed dependency.
    pub fn lookup(&self, dep: &DependencyRef) -> Result<InstalledPackage, StoreError> {
        let dir = self.package_dir(dep);
        let path = dir.join(PACKAGE_METADATA);
        if !path.is_file() {
            return Err(StoreError::MissingPackage {
                dep: dep.clone(),
                path,
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let raw: RawMetadata = toml::from_str(&content).map_err(|source| StoreError::Metadata {
            path: path.clone(),
            source,
        })?;

        let resolve_dirs = |dirs: Vec<String>| -> Result<Vec<PathBuf>, StoreError> {
            dirs.into_iter()
                .map(|d| {
                    let rel = Path::new(&d);
                    let escapes = rel
                        .components()
                        .any(|c| matches!(c, std::path::Component::ParentDir));
                    if rel.is_absolute() || escapes {
                        return Err(StoreError::InvalidDir {
                            path: path.clone(),
                            dir: d.clone(),
                        });
                    }
                    Ok(dir.join(rel))
                })
                .collect()
        };

        Ok(InstalledPackage {
            dep: dep.clone(),
            src_dirs: resolve_dirs(raw.src_dirs)?,
            include_dirs: resolve_dirs(raw.include_dirs)?,
            root: dir,
        })
    }

    /// Look up every dependency, failing on the first missing one.
    pub fn lookup_all<'a>(
        &self,
        deps: impl IntoIterator<Item = &'a DependencyRef>,
    ) -> Result<Vec<InstalledPackage>, StoreError> {
        deps.into_iter().map(|dep| self.lookup(dep)).collect()
    }
}

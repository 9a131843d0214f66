//! Global context for splot operations.
//!
//! Provides centralized access to the working directory, the project root,
//! the merged configuration and the package store location.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::recipe::{Recipe, MANIFEST_NAME};
use crate::sources::PackageStore;
use crate::util::config::{self, Config};

/// Global context shared by every command.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    cwd: PathBuf,
    project_root: PathBuf,
    manifest_path: Option<PathBuf>,
    config: Config,
}

impl GlobalContext {
    /// Create a context for the current working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a context for a specific working directory.
    ///
    /// The project root is the nearest ancestor holding `Splot.toml`, or the
    /// working directory itself when there is none.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let manifest_path = find_manifest(&cwd);
        let project_root = manifest_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.clone());

        let config = config::load_config(
            config::global_config_path().as_deref(),
            &config::project_config_path(&project_root),
        );

        GlobalContext {
            cwd,
            project_root,
            manifest_path,
            config,
        }
    }

    /// Use an explicit manifest instead of searching for one.
    ///
    /// The project config is reloaded from the manifest's directory; the one
    /// found from the working directory no longer applies.
    pub fn with_manifest(mut self, manifest: PathBuf) -> Self {
        let manifest = if manifest.is_absolute() {
            manifest
        } else {
            self.cwd.join(manifest)
        };
        if let Some(parent) = manifest.parent() {
            self.project_root = parent.to_path_buf();
            self.config = config::load_config(
                config::global_config_path().as_deref(),
                &config::project_config_path(parent),
            );
        }
        self.manifest_path = Some(manifest);
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn manifest_path(&self) -> Option<&Path> {
        self.manifest_path.as_deref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the project recipe, or the built-in one when there is no manifest.
    pub fn load_recipe(&self) -> Result<Recipe> {
        let recipe = match &self.manifest_path {
            Some(path) => {
                tracing::debug!("loading recipe from {}", path.display());
                Recipe::load(path)?
            }
            None => {
                tracing::debug!("no {} found, using built-in recipe", MANIFEST_NAME);
                Recipe::builtin()
            }
        };
        Ok(recipe)
    }

    /// Package store, in order of precedence: explicit path, config, `~/.splot/packages`.
    ///
    /// A relative explicit path is taken from the working directory; a
    /// relative `store.path` from the project root.
    pub fn package_store(&self, explicit: Option<&Path>) -> Result<PackageStore> {
        let root = match (explicit, &self.config.store.path) {
            (Some(path), _) => self.cwd.join(path),
            (None, Some(path)) => self.project_root.join(path),
            (None, None) => config::default_store_path()
                .context("could not determine the package store location; pass --store")?,
        };
        Ok(PackageStore::new(root))
    }
}

/// Find `Splot.toml` starting from `start` and searching upward.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(MANIFEST_NAME))
        .find(|candidate| candidate.is_file())
}

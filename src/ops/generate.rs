//! Implementation of `splot generate`.
//!
//! Resolves the configuration, writes the toolchain and dependency files the
//! build step consumes, then stages dependency bindings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::layout::Layout;
use crate::core::platform::Settings;
use crate::core::recipe::Recipe;
use crate::ops::bindings::{import_bindings, BindingsReport};
use crate::resolver::{self, Configuration, Features};
use crate::sources::{InstalledPackage, PackageStore};
use crate::util::fs::{read_to_string, write_atomic};

/// Toolchain description file name.
pub const TOOLCHAIN_FILE: &str = "splot-toolchain.json";

/// Dependency description file name.
pub const DEPS_FILE: &str = "splot-deps.json";

/// Contents of the toolchain file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolchain {
    pub fingerprint: String,
    pub package: String,
    pub version: String,
    pub settings: Settings,
    pub features: Features,
    /// `package:option=value` assignments
    pub options: Vec<String>,
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub bindings_dir: PathBuf,
}

impl Toolchain {
    fn new(config: &Configuration, layout: &Layout) -> Self {
        Toolchain {
            fingerprint: config.fingerprint.clone(),
            package: config.package.clone(),
            version: config.version.clone(),
            settings: config.settings.clone(),
            features: config.features.clone(),
            options: config.option_assignments(),
            source_dir: layout.source_dir.clone(),
            build_dir: layout.build_dir.clone(),
            bindings_dir: layout.bindings_dir.clone(),
        }
    }

    /// Read an existing toolchain file, `None` if absent or unreadable.
    pub fn read(path: &Path) -> Option<Self> {
        let content = read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(toolchain) => Some(toolchain),
            Err(e) => {
                tracing::debug!("ignoring unreadable {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// One entry of the dependency file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepEntry {
    #[serde(rename = "ref")]
    pub reference: String,
    pub root: PathBuf,
    pub include_dirs: Vec<PathBuf>,
    pub src_dirs: Vec<PathBuf>,
}

impl From<&InstalledPackage> for DepEntry {
    fn from(pkg: &InstalledPackage) -> Self {
        DepEntry {
            reference: pkg.dep.to_string(),
            root: pkg.root.clone(),
            include_dirs: pkg.include_dirs.clone(),
            src_dirs: pkg.src_dirs.clone(),
        }
    }
}

/// Result of a generate run.
#[derive(Debug)]
pub struct GenerateResult {
    pub layout: Layout,
    pub configuration: Configuration,
    /// `false` when an up-to-date toolchain file was kept.
    pub toolchain_written: bool,
    pub bindings: BindingsReport,
}

/// Run the generate step for `recipe` rooted at `root`.
pub fn generate(
    root: &Path,
    recipe: &Recipe,
    settings: &Settings,
    store: &PackageStore,
) -> Result<GenerateResult> {
    let layout = Layout::new(root, settings.build_type, &recipe.bindings);
    let configuration = resolver::resolve(recipe, settings)?;
    tracing::info!(
        "resolved {} {} for {} ({} options)",
        configuration.package,
        configuration.version,
        settings,
        configuration.options.len()
    );

    let packages = store
        .lookup_all(&recipe.requires)
        .with_context(|| format!("package store {}", store.root().display()))?;

    // The fingerprint does not cover the layout paths, so compare the whole file.
    let toolchain_path = layout.generators_dir.join(TOOLCHAIN_FILE);
    let toolchain = Toolchain::new(&configuration, &layout);
    let toolchain_written = match Toolchain::read(&toolchain_path) {
        Some(existing) if existing == toolchain => {
            tracing::debug!("{} is up to date", toolchain_path.display());
            false
        }
        _ => {
            let json = serde_json::to_string_pretty(&toolchain)
                .context("failed to serialize toolchain")?;
            write_atomic(&toolchain_path, &json)?;
            true
        }
    };

    let deps: Vec<DepEntry> = packages.iter().map(DepEntry::from).collect();
    let json = serde_json::to_string_pretty(&deps).context("failed to serialize dependencies")?;
    write_atomic(&layout.generators_dir.join(DEPS_FILE), &json)?;

    let bindings = import_bindings(&packages, &layout.bindings_dir, &recipe.bindings.patterns)?;

    Ok(GenerateResult {
        layout,
        configuration,
        toolchain_written,
        bindings,
    })
}

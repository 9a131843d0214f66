//! `Splot.toml` recipe parsing and schema.
//!
//! The recipe declares the package, the pinned dependencies it requires,
//! extra build options and which dependency files are staged into the
//! bindings directory. When no manifest exists the built-in serial-plotter
//! recipe is used.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::dependency::DependencyRef;
use crate::core::options::{OptionError, OptionKey, OptionSet, OptionValue};
use crate::util::diagnostic::ManifestParseError;

/// Canonical manifest file name.
pub const MANIFEST_NAME: &str = "Splot.toml";

/// Errors while loading a recipe.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("failed to read manifest {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] Box<ManifestParseError>),

    #[error("`{0}` is required more than once")]
    DuplicateRequirement(String),

    #[error("option `{key}` targets `{package}`, which is not required by the recipe")]
    OptionForUnknownPackage { key: OptionKey, package: String },

    #[error("unknown setting `{0}` (expected os, arch, compiler or build_type)")]
    UnknownSetting(String),

    #[error(transparent)]
    Option(#[from] OptionError),
}

/// `[package]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: Version,
    #[serde(default)]
    pub description: Option<String>,
    /// Settings the configuration depends on.
    #[serde(default = "default_settings")]
    pub settings: Vec<String>,
}

fn default_settings() -> Vec<String> {
    ["os", "arch", "compiler", "build_type"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// `[bindings]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingsSpec {
    /// File name patterns copied from dependency source dirs.
    pub patterns: Vec<String>,
    /// Directory name inside the build folder.
    pub dir: String,
}

impl Default for BindingsSpec {
    fn default() -> Self {
        BindingsSpec {
            patterns: vec!["*.h".to_string(), "*.cpp".to_string()],
            dir: "bindings".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRecipe {
    package: PackageInfo,
    #[serde(default)]
    requires: Vec<DependencyRef>,
    #[serde(default)]
    options: BTreeMap<String, OptionValue>,
    #[serde(default)]
    bindings: BindingsSpec,
}

/// A loaded recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub package: PackageInfo,
    pub requires: Vec<DependencyRef>,
    /// Extra options declared in the manifest, applied on top of resolved ones.
    pub options: OptionSet,
    pub bindings: BindingsSpec,
    /// Manifest this recipe was loaded from, `None` for the built-in recipe.
    pub manifest_path: Option<PathBuf>,
}

impl Recipe {
    /// The serial-plotter recipe.
    pub fn builtin() -> Self {
        let requires = [
            "boost/1.75.0",
            "sdl/2.0.14",
            "imgui/1.83",
            "implot/0.11",
            "glad/0.1.34",
        ]
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

        Recipe {
            package: PackageInfo {
                name: "serial-plotter".to_string(),
                version: Version::new(0, 0, 2),
                description: Some(
                    "Interactive tool for plotting data received via a serial port".to_string(),
                ),
                settings: default_settings(),
            },
            requires,
            options: OptionSet::new(),
            bindings: BindingsSpec::default(),
            manifest_path: None,
        }
    }

    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, RecipeError> {
        let content = std::fs::read_to_string(path).map_err(|source| RecipeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut recipe = Self::parse(&content, &path.display().to_string())?;
        recipe.manifest_path = Some(path.to_path_buf());
        Ok(recipe)
    }

    /// Parse manifest content. `name` labels the source in diagnostics.
    pub fn parse(content: &str, name: &str) -> Result<Self, RecipeError> {
        let raw: RawRecipe = toml::from_str(content)
            .map_err(|e| Box::new(ManifestParseError::from_toml(name, content, &e)))?;

        let mut seen = std::collections::HashSet::new();
        for dep in &raw.requires {
            if !seen.insert(dep.name().to_string()) {
                return Err(RecipeError::DuplicateRequirement(dep.name().to_string()));
            }
        }

        for setting in &raw.package.settings {
            if !default_settings().contains(setting) {
                return Err(RecipeError::UnknownSetting(setting.clone()));
            }
        }

        let mut options = OptionSet::new();
        for (key, value) in raw.options {
            let key: OptionKey = key.parse()?;
            if !seen.contains(&key.package) {
                let package = key.package.clone();
                return Err(RecipeError::OptionForUnknownPackage { key, package });
            }
            // "False" in the manifest means the same as `-o pkg:opt=False`.
            let value = match value {
                OptionValue::Str(s) => OptionValue::parse(&s),
                other => other,
            };
            options.set(key, value);
        }

        Ok(Recipe {
            package: raw.package,
            requires: raw.requires,
            options,
            bindings: raw.bindings,
            manifest_path: None,
        })
    }

    /// Find a required dependency by name.
    pub fn requirement(&self, name: &str) -> Option<&DependencyRef> {
        self.requires.iter().find(|d| d.name() == name)
    }

    pub fn requires_package(&self, name: &str) -> bool {
        self.requirement(name).is_some()
    }
}

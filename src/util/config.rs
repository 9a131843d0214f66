//! Configuration file support for splot.
//!
//! Two configuration file locations are read:
//! - Global: `~/.splot/config.toml` - User-wide defaults
//! - Project: `.splot/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// splot configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build driver settings
    pub ci: CiConfig,

    /// Package store settings
    pub store: StoreConfig,
}

/// Build driver settings: working directory and the command line of each step.
///
/// Unset steps fall back to the defaults in [`crate::ops::driver`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CiConfig {
    /// Working directory, relative to the invocation directory
    pub dir: Option<PathBuf>,

    /// Dependency installation command
    pub install: Option<Vec<String>>,

    /// Build command
    pub build: Option<Vec<String>>,

    /// Packaging command
    pub package: Option<Vec<String>>,
}

/// Package store settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root of the installed package store
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.ci.dir.is_some() {
            self.ci.dir = other.ci.dir;
        }
        if other.ci.install.is_some() {
            self.ci.install = other.ci.install;
        }
        if other.ci.build.is_some() {
            self.ci.build = other.ci.build;
        }
        if other.ci.package.is_some() {
            self.ci.package = other.ci.package;
        }

        if other.store.path.is_some() {
            self.store.path = other.store.path;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.splot/config.toml)
/// 2. Global config (~/.splot/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global splot directory (~/.splot).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".splot"))
}

/// Get the global config path (~/.splot/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.splot/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".splot").join("config.toml")
}

/// Default package store (~/.splot/packages).
pub fn default_store_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("packages"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.ci.install.is_none());
        assert!(config.store.path.is_none());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[ci]
dir = "out"
package = ["cpack", "-G", "TGZ"]

[store]
path = "/opt/packages"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.ci.dir, Some(PathBuf::from("out")));
        assert_eq!(
            config.ci.package,
            Some(vec!["cpack".to_string(), "-G".to_string(), "TGZ".to_string()])
        );
        assert!(config.ci.install.is_none());
        assert_eq!(config.store.path, Some(PathBuf::from("/opt/packages")));
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.ci.dir = Some(PathBuf::from("global"));
        base.store.path = Some(PathBuf::from("/global/store"));

        let mut override_cfg = Config::default();
        override_cfg.ci.dir = Some(PathBuf::from("project"));

        base.merge(override_cfg);

        assert_eq!(base.ci.dir, Some(PathBuf::from("project")));
        assert_eq!(base.store.path, Some(PathBuf::from("/global/store")));
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(&global_path, "[ci]\ndir = \"g\"\n[store]\npath = \"/g\"\n").unwrap();
        std::fs::write(&project_path, "[ci]\ndir = \"p\"\n").unwrap();

        let config = load_config(Some(&global_path), &project_path);
        assert_eq!(config.ci.dir, Some(PathBuf::from("p")));
        assert_eq!(config.store.path, Some(PathBuf::from("/g")));
    }

    #[test]
    fn test_invalid_config_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[ci\n").unwrap();
        assert_eq!(Config::load_or_default(&path), Config::default());
        assert!(Config::load(&path).is_err());
    }
}

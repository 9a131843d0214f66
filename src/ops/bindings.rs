//! Bindings import.
//!
//! Copies the header/source files that dependencies ship for the build to
//! compile directly (e.g. imgui's platform backends) into one staging
//! directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::dependency::DependencyRef;
use crate::sources::InstalledPackage;
use crate::util::fs::{compile_patterns, copy_matching, ensure_dir};

/// Outcome of a bindings import.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BindingsReport {
    /// Files written into the bindings directory.
    pub copied: Vec<PathBuf>,
    /// Dependencies that declare no source directories.
    pub skipped: Vec<DependencyRef>,
    /// Declared source directories that do not exist.
    pub missing_dirs: Vec<PathBuf>,
}

/// Copy files matching `patterns` from every package's source dirs into `target_dir`.
///
/// The target directory is created even when nothing is copied. The first
/// copy failure aborts the import; files copied before it are left in place.
pub fn import_bindings(
    packages: &[InstalledPackage],
    target_dir: &Path,
    patterns: &[String],
) -> Result<BindingsReport> {
    ensure_dir(target_dir)?;
    let patterns = compile_patterns(patterns)?;

    let mut report = BindingsReport::default();
    for pkg in packages {
        if pkg.src_dirs.is_empty() {
            report.skipped.push(pkg.dep.clone());
            continue;
        }

        for src_dir in &pkg.src_dirs {
            if !src_dir.is_dir() {
                tracing::debug!(
                    "{}: source directory {} does not exist",
                    pkg.dep,
                    src_dir.display()
                );
                report.missing_dirs.push(src_dir.clone());
                continue;
            }

            tracing::debug!("{}: importing bindings from {}", pkg.dep, src_dir.display());
            let copied = copy_matching(src_dir, target_dir, &patterns)
                .with_context(|| format!("failed to import bindings from `{}`", pkg.dep))?;
            report.copied.extend(copied);
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn pkg(name: &str, root: &Path) -> InstalledPackage {
        InstalledPackage::bare(format!("{}/1.0", name).parse().unwrap(), root)
    }

    fn default_patterns() -> Vec<String> {
        vec!["*.h".to_string(), "*.cpp".to_string()]
    }

    #[test]
    fn test_no_src_dirs_creates_empty_target() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("build/bindings");
        let packages = vec![pkg("boost", tmp.path()), pkg("sdl", tmp.path())];

        let report = import_bindings(&packages, &target, &default_patterns()).unwrap();

        assert!(target.is_dir());
        assert_eq!(fs::read_dir(&target).unwrap().count(), 0);
        assert!(report.copied.is_empty());
        assert_eq!(report.skipped.len(), 2);
    }

    #[test]
    fn test_zero_packages() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("bindings");
        let report = import_bindings(&[], &target, &default_patterns()).unwrap();
        assert!(target.is_dir());
        assert_eq!(report, BindingsReport::default());
    }

    #[test]
    fn test_copies_matching_files() {
        let tmp = TempDir::new().unwrap();
        let imgui = tmp.path().join("imgui");
        let src = imgui.join("res/bindings");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("imgui_impl_sdl.h"), "").unwrap();
        fs::write(src.join("imgui_impl_sdl.cpp"), "").unwrap();
        fs::write(src.join("imgui_impl_sdl.txt"), "").unwrap();

        let packages = vec![pkg("imgui", &imgui).with_src_dir("res/bindings")];
        let target = tmp.path().join("bindings");
        let report = import_bindings(&packages, &target, &default_patterns()).unwrap();

        assert_eq!(report.copied.len(), 2);
        assert!(target.join("imgui_impl_sdl.h").is_file());
        assert!(target.join("imgui_impl_sdl.cpp").is_file());
        assert!(!target.join("imgui_impl_sdl.txt").exists());
    }

    #[test]
    fn test_missing_src_dir_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let packages = vec![pkg("implot", tmp.path()).with_src_dir("gone")];
        let target = tmp.path().join("bindings");
        let report = import_bindings(&packages, &target, &default_patterns()).unwrap();
        assert_eq!(report.missing_dirs, vec![tmp.path().join("gone")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_failure_aborts() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("glad/src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("glad.h"), "").unwrap();

        // A directory where the copied file should go.
        let target = tmp.path().join("bindings");
        fs::create_dir_all(&target).unwrap();
        fs::create_dir_all(target.join("glad.h")).unwrap();

        let packages = vec![pkg("glad", &tmp.path().join("glad")).with_src_dir("src")];
        let err = import_bindings(&packages, &target, &default_patterns()).unwrap_err();
        assert!(format!("{:#}", err).contains("glad/1.0"));
    }
}

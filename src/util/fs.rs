//! Filesystem utilities.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<bool> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
        return Ok(true);
    }
    Ok(false)
}

/// Ensure a directory exists, creating it if necessary.
///
/// Returns `true` when the directory was created by this call.
pub fn ensure_dir(path: &Path) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))?;
    Ok(true)
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a file through a temporary file in the same directory, then rename.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    ensure_dir(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temporary file in {}", parent.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write file: {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to write file: {}", path.display()))?;
    Ok(())
}

/// Compile file-name patterns such as `*.h`.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("invalid file pattern: {}", p)))
        .collect()
}

/// Recursively copy files under `src` whose file name matches any pattern,
/// keeping their path relative to `src`. Returns the destination paths.
pub fn copy_matching(src: &Path, dst: &Path, patterns: &[Pattern]) -> Result<Vec<PathBuf>> {
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    let mut copied = Vec::new();
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("failed to read directory: {}", src.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !patterns.iter().any(|p| p.matches_with(&name, options)) {
            continue;
        }

        let rel = relative_path(src, entry.path());
        let target = dst.join(&rel);
        if let Some(parent) = target.parent() {
            ensure_dir(parent)?;
        }
        fs::copy(entry.path(), &target).with_context(|| {
            format!(
                "failed to copy {} to {}",
                entry.path().display(),
                target.display()
            )
        })?;
        copied.push(target);
    }

    Ok(copied)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

//! Dependency pins.
//!
//! A recipe requires a fixed list of third-party packages, each pinned to an
//! exact version and written as `name/version` (e.g. `boost/1.75.0`).
//! Versions are kept as opaque strings: upstream projects use schemes such as
//! `1.83` or `0.1.34` that are not all valid semver.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing a dependency pin.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DependencyError {
    #[error("dependency `{0}` must be written as `name/version`")]
    MissingVersion(String),

    #[error("invalid package name `{name}`: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("invalid version `{version}` for `{name}`: {reason}")]
    InvalidVersion {
        name: String,
        version: String,
        reason: &'static str,
    },
}

/// A pinned dependency (`name/version`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct DependencyRef {
    name: String,
    version: String,
}

impl DependencyRef {
    /// Create a validated pin.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Result<Self, DependencyError> {
        let name = name.into();
        let version = version.into();
        validate_name(&name)?;
        validate_version(&name, &version)?;
        Ok(DependencyRef { name, version })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

fn validate_name(name: &str) -> Result<(), DependencyError> {
    let invalid = |reason| DependencyError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name cannot be empty"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "_.+-".contains(c))
    {
        return Err(invalid(
            "only lowercase letters, digits, `_`, `.`, `+` and `-` are allowed",
        ));
    }
    if name.starts_with(['.', '-']) {
        return Err(invalid("name must start with a letter or digit"));
    }
    Ok(())
}

fn validate_version(name: &str, version: &str) -> Result<(), DependencyError> {
    let invalid = |reason| DependencyError::InvalidVersion {
        name: name.to_string(),
        version: version.to_string(),
        reason,
    };

    if version.is_empty() {
        return Err(invalid("version cannot be empty"));
    }
    if version.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(invalid("whitespace and `/` are not allowed"));
    }
    Ok(())
}

impl FromStr for DependencyRef {
    type Err = DependencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('/') {
            Some((name, version)) => DependencyRef::new(name, version),
            None => Err(DependencyError::MissingVersion(s.to_string())),
        }
    }
}

impl fmt::Display for DependencyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

impl From<DependencyRef> for String {
    fn from(dep: DependencyRef) -> Self {
        dep.to_string()
    }
}

impl TryFrom<String> for DependencyRef {
    type Error = DependencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pin() {
        let dep: DependencyRef = "boost/1.75.0".parse().unwrap();
        assert_eq!(dep.name(), "boost");
        assert_eq!(dep.version(), "1.75.0");
        assert_eq!(dep.to_string(), "boost/1.75.0");
    }

    #[test]
    fn test_parse_non_semver_version() {
        let dep: DependencyRef = "imgui/1.83".parse().unwrap();
        assert_eq!(dep.version(), "1.83");
    }

    #[test]
    fn test_parse_rejects_missing_version() {
        assert_eq!(
            "sdl".parse::<DependencyRef>(),
            Err(DependencyError::MissingVersion("sdl".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_bad_parts() {
        assert!(matches!(
            "/1.0".parse::<DependencyRef>(),
            Err(DependencyError::InvalidName { .. })
        ));
        assert!(matches!(
            "Boost/1.0".parse::<DependencyRef>(),
            Err(DependencyError::InvalidName { .. })
        ));
        assert!(matches!(
            "glad/".parse::<DependencyRef>(),
            Err(DependencyError::InvalidVersion { .. })
        ));
        assert!(matches!(
            "glad/0.1/34".parse::<DependencyRef>(),
            Err(DependencyError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_serde_as_string() {
        #[derive(Deserialize)]
        struct Wrapper {
            requires: Vec<DependencyRef>,
        }

        let w: Wrapper = toml::from_str(r#"requires = ["sdl/2.0.14", "glad/0.1.34"]"#).unwrap();
        assert_eq!(w.requires[0].name(), "sdl");
        assert_eq!(w.requires[1].version(), "0.1.34");
    }
}

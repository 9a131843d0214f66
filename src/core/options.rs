//! Per-dependency build options.
//!
//! Options are addressed as `package:option` and carry either a boolean or a
//! string value. Their text form is what the dependency manager receives on
//! the command line (`glad:gl_profile=core`, `sdl:pulse=False`).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::platform::Os;

/// Errors for malformed or illegal options.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionError {
    #[error("option `{0}` must be written as `package:option`")]
    MalformedKey(String),

    #[error("option assignment `{0}` must be written as `package:option=value`")]
    MalformedAssignment(String),

    #[error("`{package}` has no option named `{option}`")]
    UnknownOption { package: String, option: String },

    #[error("`{value}` is not a legal value for `{key}` (expected {expected})")]
    IllegalValue {
        key: OptionKey,
        value: String,
        expected: &'static str,
    },

    #[error("`{key}` is not supported on {os}")]
    UnsupportedOnOs { key: OptionKey, os: Os },
}

/// Address of an option: the owning package plus the option name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct OptionKey {
    pub package: String,
    pub option: String,
}

impl OptionKey {
    pub fn new(package: impl Into<String>, option: impl Into<String>) -> Self {
        OptionKey {
            package: package.into(),
            option: option.into(),
        }
    }
}

impl FromStr for OptionKey {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once(':') {
            Some((package, option)) if !package.is_empty() && !option.is_empty() => {
                Ok(OptionKey::new(package, option))
            }
            _ => Err(OptionError::MalformedKey(s.to_string())),
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.package, self.option)
    }
}

impl From<OptionKey> for String {
    fn from(key: OptionKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for OptionKey {
    type Error = OptionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Str(String),
}

impl OptionValue {
    /// Parse a command-line value. `True`/`False` (any case) become booleans.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "true" => OptionValue::Bool(true),
            "false" => OptionValue::Bool(false),
            _ => OptionValue::Str(s.to_string()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Str(_) => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(true) => f.write_str("True"),
            OptionValue::Bool(false) => f.write_str("False"),
            OptionValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

/// Ordered set of option assignments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSet {
    values: BTreeMap<OptionKey, OptionValue>,
}

impl OptionSet {
    pub fn new() -> Self {
        OptionSet::default()
    }

    /// Set an option, replacing any previous value.
    pub fn set(&mut self, key: OptionKey, value: impl Into<OptionValue>) {
        self.values.insert(key, value.into());
    }

    pub fn get(&self, package: &str, option: &str) -> Option<&OptionValue> {
        self.values.get(&OptionKey::new(package, option))
    }

    pub fn contains(&self, package: &str, option: &str) -> bool {
        self.get(package, option).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OptionKey, &OptionValue)> {
        self.values.iter()
    }

    /// Merge another set into this one (other takes precedence).
    pub fn merge(&mut self, other: &OptionSet) {
        for (key, value) in other.iter() {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Render as `package:option=value` assignments.
    pub fn to_assignments(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect()
    }

    /// Parse one `package:option=value` assignment.
    pub fn parse_assignment(s: &str) -> Result<(OptionKey, OptionValue), OptionError> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| OptionError::MalformedAssignment(s.to_string()))?;
        let key: OptionKey = key.parse()?;
        Ok((key, OptionValue::parse(value.trim())))
    }

    /// Check every assignment against the legality table for `os`.
    pub fn validate(&self, os: &Os) -> Result<(), OptionError> {
        for (key, value) in self.iter() {
            check_option(os, key, value)?;
        }
        Ok(())
    }
}

const GLAD_SPECS: &[&str] = &["gl", "gles1", "gles2", "glsc2"];
const GLAD_PROFILES: &[&str] = &["core", "compatibility"];

/// Check one assignment against the options the known dependencies expose.
///
/// Packages without a table here accept any option.
pub fn check_option(os: &Os, key: &OptionKey, value: &OptionValue) -> Result<(), OptionError> {
    let illegal = |expected| OptionError::IllegalValue {
        key: key.clone(),
        value: value.to_string(),
        expected,
    };
    let unknown = || OptionError::UnknownOption {
        package: key.package.clone(),
        option: key.option.clone(),
    };
    let one_of = |allowed: &[&str], expected| match value {
        OptionValue::Str(s) if allowed.contains(&s.as_str()) => Ok(()),
        _ => Err(illegal(expected)),
    };
    let boolean = || match value {
        OptionValue::Bool(_) => Ok(()),
        OptionValue::Str(_) => Err(illegal("True or False")),
    };

    match (key.package.as_str(), key.option.as_str()) {
        ("glad", "spec") => one_of(GLAD_SPECS, "one of gl, gles1, gles2, glsc2"),
        ("glad", "gl_profile") => one_of(GLAD_PROFILES, "core or compatibility"),
        ("glad", "gl_version") => match value {
            OptionValue::Str(s) if is_major_minor(s) => Ok(()),
            _ => Err(illegal("a MAJOR.MINOR version")),
        },
        ("glad", "no_loader") => boolean(),
        ("glad", _) => Err(unknown()),
        ("sdl", "pulse") => {
            if os.is_windows() {
                return Err(OptionError::UnsupportedOnOs {
                    key: key.clone(),
                    os: os.clone(),
                });
            }
            boolean()
        }
        ("sdl", "shared" | "fPIC" | "opengl" | "vulkan" | "alsa" | "x11" | "wayland") => boolean(),
        ("sdl", _) => Err(unknown()),
        ("boost", option) if option.starts_with("with_") || option.starts_with("without_") => {
            boolean()
        }
        ("boost", "shared" | "header_only" | "fPIC") => boolean(),
        ("boost", _) => Err(unknown()),
        _ => Ok(()),
    }
}

fn is_major_minor(s: &str) -> bool {
    match s.split_once('.') {
        Some((major, minor)) => {
            !major.is_empty()
                && !minor.is_empty()
                && major.chars().all(|c| c.is_ascii_digit())
                && minor.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

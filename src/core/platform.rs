//! Host platform and build settings.
//!
//! Settings are the inputs the resolver branches on: operating system,
//! architecture, compiler and build type. Names follow the spelling the
//! dependency ecosystem uses (`Windows`, `Macos`, `Linux`, `x86_64`, ...),
//! parsing is case-insensitive and accepts Rust's `std::env::consts` names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operating system of the build host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Os {
    Windows,
    Macos,
    Linux,
    FreeBsd,
    Android,
    Ios,
    /// Any other OS, stored with its original spelling.
    Other(String),
}

impl Os {
    /// Detect the host operating system.
    pub fn host() -> Self {
        Os::from_str(std::env::consts::OS).unwrap_or_else(|_| Os::Other(std::env::consts::OS.into()))
    }

    /// Canonical settings name.
    pub fn as_str(&self) -> &str {
        match self {
            Os::Windows => "Windows",
            Os::Macos => "Macos",
            Os::Linux => "Linux",
            Os::FreeBsd => "FreeBSD",
            Os::Android => "Android",
            Os::Ios => "iOS",
            Os::Other(name) => name,
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Os::Windows)
    }

    pub fn is_macos(&self) -> bool {
        matches!(self, Os::Macos)
    }

    /// All named variants, used by tests and `--help` text.
    pub fn known() -> &'static [Os] {
        &[
            Os::Windows,
            Os::Macos,
            Os::Linux,
            Os::FreeBsd,
            Os::Android,
            Os::Ios,
        ]
    }
}

impl FromStr for Os {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("operating system name cannot be empty".to_string());
        }

        Ok(match trimmed.to_lowercase().as_str() {
            "windows" | "win32" | "win64" => Os::Windows,
            "macos" | "darwin" | "osx" => Os::Macos,
            "linux" => Os::Linux,
            "freebsd" => Os::FreeBsd,
            "android" => Os::Android,
            "ios" => Os::Ios,
            _ => Os::Other(trimmed.to_string()),
        })
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Os> for String {
    fn from(os: Os) -> Self {
        os.as_str().to_string()
    }
}

impl TryFrom<String> for Os {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// CPU architecture of the build host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Arch {
    X86,
    X86_64,
    Armv7,
    Armv8,
    Other(String),
}

impl Arch {
    /// Detect the host architecture.
    pub fn host() -> Self {
        Arch::from_str(std::env::consts::ARCH)
            .unwrap_or_else(|_| Arch::Other(std::env::consts::ARCH.into()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
            Arch::Armv7 => "armv7",
            Arch::Armv8 => "armv8",
            Arch::Other(name) => name,
        }
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("architecture name cannot be empty".to_string());
        }

        Ok(match trimmed.to_lowercase().as_str() {
            "x86" | "i386" | "i686" => Arch::X86,
            "x86_64" | "amd64" | "x64" => Arch::X86_64,
            "armv7" | "arm" => Arch::Armv7,
            "armv8" | "aarch64" | "arm64" => Arch::Armv8,
            _ => Arch::Other(trimmed.to_string()),
        })
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Arch> for String {
    fn from(arch: Arch) -> Self {
        arch.as_str().to_string()
    }
}

impl TryFrom<String> for Arch {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Build type, which also names the build folder (`build/Release`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }
}

impl FromStr for BuildType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            "relwithdebinfo" => Ok(BuildType::RelWithDebInfo),
            "minsizerel" => Ok(BuildType::MinSizeRel),
            _ => Err(format!(
                "invalid build type '{}'; expected one of Debug, Release, RelWithDebInfo, MinSizeRel",
                s
            )),
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiler family, detected from the environment when not given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compiler {
    pub family: String,
    /// C++ language standard passed to the dependency manager.
    pub cppstd: String,
}

impl Compiler {
    /// Default compiler for an OS.
    pub fn default_for(os: &Os) -> Self {
        let family = match os {
            Os::Windows => "msvc",
            Os::Macos | Os::Ios => "apple-clang",
            Os::FreeBsd => "clang",
            _ => "gcc",
        };
        Compiler {
            family: family.to_string(),
            cppstd: DEFAULT_CPPSTD.to_string(),
        }
    }
}

/// Language standard the project builds with.
pub const DEFAULT_CPPSTD: &str = "17";

/// Resolved settings for a single build invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub os: Os,
    pub arch: Arch,
    pub compiler: Compiler,
    pub build_type: BuildType,
}

impl Settings {
    /// Settings for the current host.
    pub fn host() -> Self {
        Settings::new(Os::host(), Arch::host())
    }

    /// Settings for the given OS/architecture with default compiler and build type.
    pub fn new(os: Os, arch: Arch) -> Self {
        let compiler = Compiler::default_for(&os);
        Settings {
            os,
            arch,
            compiler,
            build_type: BuildType::default(),
        }
    }

    pub fn with_build_type(mut self, build_type: BuildType) -> Self {
        self.build_type = build_type;
        self
    }

    /// Look up a setting by its recipe name.
    pub fn get(&self, name: &str) -> Option<String> {
        match name {
            "os" => Some(self.os.to_string()),
            "arch" => Some(self.arch.to_string()),
            "compiler" => Some(self.compiler.family.clone()),
            "compiler.cppstd" => Some(self.compiler.cppstd.clone()),
            "build_type" => Some(self.build_type.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} ({}, C++{}, {})",
            self.os, self.arch, self.compiler.family, self.compiler.cppstd, self.build_type
        )
    }
}

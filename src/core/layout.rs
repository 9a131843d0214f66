//! Build folder layout.
//!
//! ```text
//! <root>/
//!   Splot.toml
//!   build/<BuildType>/
//!     generators/   toolchain and dependency files
//!     bindings/     staged dependency headers/sources
//! ```

use std::path::{Path, PathBuf};

use crate::core::platform::BuildType;
use crate::core::recipe::BindingsSpec;

/// Name of the top-level build folder.
pub const BUILD_DIR: &str = "build";

/// Name of the folder holding generated files.
pub const GENERATORS_DIR: &str = "generators";

/// Paths used by the recipe's generate/build/package steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub generators_dir: PathBuf,
    pub bindings_dir: PathBuf,
}

impl Layout {
    pub fn new(root: &Path, build_type: BuildType, bindings: &BindingsSpec) -> Self {
        let build_dir = Self::build_root(root).join(build_type.as_str());
        Layout {
            source_dir: root.to_path_buf(),
            generators_dir: build_dir.join(GENERATORS_DIR),
            bindings_dir: build_dir.join(&bindings.dir),
            build_dir,
        }
    }

    /// Root build folder shared by all build types.
    pub fn build_root(root: &Path) -> PathBuf {
        root.join(BUILD_DIR)
    }
}

//! Command implementations

pub mod build;
pub mod ci;
pub mod clean;
pub mod completions;
pub mod generate;
pub mod package;
pub mod resolve;

use std::path::PathBuf;

use anyhow::Result;

use splot::util::GlobalContext;

/// Build the context for a command, honoring `--manifest-path`.
pub fn context(manifest_path: Option<PathBuf>) -> Result<GlobalContext> {
    let ctx = GlobalContext::new()?;
    Ok(match manifest_path {
        Some(path) => ctx.with_manifest(path),
        None => ctx,
    })
}

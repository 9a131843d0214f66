//! CLI definitions using clap.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

use splot::core::options::OptionSet;
use splot::core::platform::{Arch, BuildType, Os, Settings};
use splot::core::recipe::{Recipe, RecipeError};
use splot::util::shell::ColorChoice;

/// splot - recipe resolver and build driver for serial-plotter
///
/// Without a subcommand, runs the CI driver (`splot ci`).
#[derive(Parser)]
#[command(name = "splot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Path to Splot.toml
    #[arg(long, global = true, env = "SPLOT_MANIFEST", value_name = "PATH")]
    pub manifest_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install dependencies, build and package inside `_build`
    Ci(CiArgs),

    /// Print the resolved configuration
    Resolve(ResolveArgs),

    /// Write toolchain files and import dependency bindings
    Generate(GenerateArgs),

    /// Configure and build the project with CMake
    Build(BuildArgs),

    /// Install the built project with CMake
    Package(BuildArgs),

    /// Remove build directories
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Default)]
pub struct CiArgs {
    /// Print the steps without running them
    #[arg(long)]
    pub dry_run: bool,
}

/// Target platform selection; unset values default to the host.
#[derive(Args)]
pub struct PlatformArgs {
    /// Target operating system (e.g. Linux, Windows, Macos)
    #[arg(long)]
    pub os: Option<Os>,

    /// Target architecture (e.g. x86_64, armv8)
    #[arg(long)]
    pub arch: Option<Arch>,

    /// Build type
    #[arg(long, default_value = "Release")]
    pub build_type: BuildType,

    /// Override a dependency option (e.g. `-o sdl:pulse=True`)
    #[arg(short = 'o', long = "option", value_name = "PKG:OPT=VALUE")]
    pub options: Vec<String>,
}

impl PlatformArgs {
    pub fn settings(&self) -> Settings {
        Settings::new(
            self.os.clone().unwrap_or_else(Os::host),
            self.arch.clone().unwrap_or_else(Arch::host),
        )
        .with_build_type(self.build_type)
    }

    /// Apply `--option` overrides on top of the recipe's own options.
    pub fn apply_options(&self, recipe: &mut Recipe) -> Result<()> {
        for assignment in &self.options {
            let (key, value) = OptionSet::parse_assignment(assignment)?;
            if !recipe.requires_package(&key.package) {
                let package = key.package.clone();
                return Err(RecipeError::OptionForUnknownPackage { key, package }.into());
            }
            recipe.options.set(key, value);
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub platform: PlatformArgs,

    /// Print the configuration as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub platform: PlatformArgs,

    /// Package store directory
    #[arg(long, env = "SPLOT_STORE", value_name = "DIR")]
    pub store: Option<PathBuf>,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Build type
    #[arg(long, default_value = "Release")]
    pub build_type: BuildType,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Also remove the CI working directory (`_build`)
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}

//! `splot package` command

use anyhow::Result;

use crate::cli::BuildArgs;
use splot::core::layout::Layout;
use splot::ops::cmake::CMakeSteps;
use splot::util::process::SystemExecutor;
use splot::util::shell::{Shell, Status};
use splot::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: BuildArgs, shell: &Shell) -> Result<()> {
    let recipe = ctx.load_recipe()?;
    let layout = Layout::new(ctx.project_root(), args.build_type, &recipe.bindings);
    if !layout.build_dir.is_dir() {
        anyhow::bail!(
            "{} does not exist\nhelp: Run `splot build --build-type {}` first",
            layout.build_dir.display(),
            args.build_type
        );
    }

    shell.status(
        Status::Packaging,
        format!("{} {}", recipe.package.name, recipe.package.version),
    );
    CMakeSteps::locate(&layout, args.build_type, &SystemExecutor)?.package()?;
    shell.status(Status::Finished, layout.build_dir.display());

    Ok(())
}

//! `splot build` command

use std::time::Instant;

use anyhow::Result;

use crate::cli::BuildArgs;
use splot::core::layout::Layout;
use splot::ops::cmake::CMakeSteps;
use splot::util::process::SystemExecutor;
use splot::util::shell::{format_duration, Shell, Status};
use splot::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: BuildArgs, shell: &Shell) -> Result<()> {
    let recipe = ctx.load_recipe()?;
    let layout = Layout::new(ctx.project_root(), args.build_type, &recipe.bindings);

    let steps = CMakeSteps::locate(&layout, args.build_type, &SystemExecutor)?;
    shell.status(
        Status::Building,
        format!("{} ({})", recipe.package.name, args.build_type),
    );

    let start = Instant::now();
    steps.build()?;
    shell.status(
        Status::Finished,
        format!("{} in {}", args.build_type, format_duration(start.elapsed())),
    );

    Ok(())
}

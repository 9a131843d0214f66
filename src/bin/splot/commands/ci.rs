//! `splot ci` command
//!
//! Also what runs when `splot` is invoked without a subcommand.

use std::time::Instant;

use anyhow::Result;

use crate::cli::CiArgs;
use splot::ops::driver::{run_ci, CiPlan};
use splot::util::process::SystemExecutor;
use splot::util::shell::{format_duration, Shell, Status};
use splot::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: CiArgs, shell: &Shell) -> Result<()> {
    let plan = CiPlan::from_config(ctx.cwd(), &ctx.config().ci)?;

    if args.dry_run {
        shell.note(format!("working directory {}", plan.work_dir.display()));
        for (stage, cmd) in &plan.steps {
            println!("{:<8} {}", stage.as_str(), cmd);
        }
        return Ok(());
    }

    let start = Instant::now();
    let report = run_ci(&plan, &SystemExecutor, shell)?;
    shell.status(
        Status::Finished,
        format!(
            "{} steps in {}",
            report.completed.len(),
            format_duration(start.elapsed())
        ),
    );

    Ok(())
}

//! `splot clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use splot::core::layout::Layout;
use splot::ops::driver::WORK_DIR;
use splot::util::fs::remove_dir_all_if_exists;
use splot::util::shell::{Shell, Status};
use splot::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: CleanArgs, shell: &Shell) -> Result<()> {
    let mut dirs = vec![Layout::build_root(ctx.project_root())];
    if args.all {
        let work_dir = match &ctx.config().ci.dir {
            Some(dir) => ctx.cwd().join(dir),
            None => ctx.cwd().join(WORK_DIR),
        };
        dirs.push(work_dir);
    }

    for dir in dirs {
        if remove_dir_all_if_exists(&dir)? {
            shell.status(Status::Removed, dir.display());
        } else {
            tracing::debug!("{} does not exist", dir.display());
        }
    }

    Ok(())
}

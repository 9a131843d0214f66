//! `splot generate` command

use anyhow::Result;

use crate::cli::GenerateArgs;
use splot::ops::generate::{generate, TOOLCHAIN_FILE};
use splot::util::shell::{Shell, Status};
use splot::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: GenerateArgs, shell: &Shell) -> Result<()> {
    let mut recipe = ctx.load_recipe()?;
    args.platform.apply_options(&mut recipe)?;
    let settings = args.platform.settings();
    let store = ctx.package_store(args.store.as_deref())?;

    shell.status(
        Status::Generating,
        format!("{} {} for {}", recipe.package.name, recipe.package.version, settings),
    );
    let result = generate(ctx.project_root(), &recipe, &settings, &store)?;

    let toolchain = result.layout.generators_dir.join(TOOLCHAIN_FILE);
    if result.toolchain_written {
        shell.status(Status::Created, toolchain.display());
    } else {
        shell.status(Status::Skipped, format!("{} (up to date)", toolchain.display()));
    }

    for dir in &result.bindings.missing_dirs {
        shell.warn(format!(
            "source directory {} does not exist (skipped)",
            dir.display()
        ));
    }
    shell.status(
        Status::Copied,
        format!(
            "{} binding file(s) into {}",
            result.bindings.copied.len(),
            result.layout.bindings_dir.display()
        ),
    );

    Ok(())
}

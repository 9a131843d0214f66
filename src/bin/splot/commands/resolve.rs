//! `splot resolve` command

use anyhow::{Context, Result};

use crate::cli::ResolveArgs;
use splot::resolver::{self, Configuration};
use splot::util::shell::{Shell, Status};
use splot::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: ResolveArgs, shell: &Shell) -> Result<()> {
    let mut recipe = ctx.load_recipe()?;
    args.platform.apply_options(&mut recipe)?;
    let settings = args.platform.settings();

    shell.status(Status::Resolving, format!("{} for {}", recipe.package.name, settings));
    let config = resolver::resolve(&recipe, &settings)?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&config).context("failed to serialize configuration")?;
        println!("{}", json);
    } else {
        print_configuration(&config);
    }

    Ok(())
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

fn print_configuration(config: &Configuration) {
    println!("{} {}", config.package, config.version);
    println!("settings: {}", config.settings);

    println!("requires:");
    for dep in &config.requires {
        println!("  {}", dep);
    }

    println!("options:");
    for assignment in config.option_assignments() {
        println!("  {}", assignment);
    }

    println!("features:");
    match &config.features.graphics {
        Some(graphics) => println!("  graphics backend: {}", graphics),
        None => println!("  graphics backend: none"),
    }
    println!("  audio backend: {}", enabled(config.features.audio_backend));
    println!(
        "  stacktrace backtrace: {}",
        enabled(config.features.stacktrace_backtrace)
    );

    println!("fingerprint: {}", config.fingerprint);
}

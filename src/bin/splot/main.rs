//! splot CLI - recipe resolver and build driver for serial-plotter

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use splot::core::recipe::RecipeError;
use splot::ops::driver::DriverError;
use splot::sources::StoreError;
use splot::util::diagnostic::{emit, suggestions, Diagnostic};
use splot::util::process::ProcessError;
use splot::util::Shell;

fn main() {
    let cli = Cli::parse();

    // Set up logging; RUST_LOG takes precedence.
    let default_filter = if cli.verbose {
        "splot=debug"
    } else if cli.quiet {
        "splot=warn"
    } else {
        "splot=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color);

    if let Err(e) = run(cli, &shell) {
        report(&e, &shell);
        std::process::exit(exit_code(&e));
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    let ctx = commands::context(cli.manifest_path)?;

    match cli.command.unwrap_or(Commands::Ci(Default::default())) {
        Commands::Ci(args) => commands::ci::execute(&ctx, args, shell),
        Commands::Resolve(args) => commands::resolve::execute(&ctx, args, shell),
        Commands::Generate(args) => commands::generate::execute(&ctx, args, shell),
        Commands::Build(args) => commands::build::execute(&ctx, args, shell),
        Commands::Package(args) => commands::package::execute(&ctx, args, shell),
        Commands::Clean(args) => commands::clean::execute(&ctx, args, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// The exit status mirrors a failing external step; everything else is 1.
fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<DriverError>() {
        return e.exit_code();
    }
    if let Some(e) = err.downcast_ref::<ProcessError>() {
        return e.exit_code();
    }
    1
}

fn report(err: &anyhow::Error, shell: &Shell) {
    let color = shell.use_color();

    if let Some(RecipeError::Parse(parse)) = err.downcast_ref::<RecipeError>() {
        eprint!("{}", parse.render());
        return;
    }

    let mut diag = Diagnostic::error(err.to_string());
    for cause in err.chain().skip(1) {
        diag = diag.with_context(cause.to_string());
    }

    if err.downcast_ref::<DriverError>().is_some() || err.downcast_ref::<ProcessError>().is_some()
    {
        diag = diag.with_suggestion(suggestions::STEP_FAILED);
    } else if let Some(StoreError::MissingPackage { .. }) = err.downcast_ref::<StoreError>() {
        diag = diag.with_suggestion(suggestions::MISSING_PACKAGE);
    } else if err.downcast_ref::<RecipeError>().is_some() {
        diag = diag.with_suggestion(suggestions::INVALID_MANIFEST);
    }

    emit(&diag, color);
}

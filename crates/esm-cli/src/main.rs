//! ES module resolver CLI
//!
//! Resolves module references against the configured repositories and
//! manages the repository list.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands, ReposAction};
use context::Context;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let ctx = Context::from_cli(&cli);
    tracing::debug!(config = %ctx.config_display(), "Using repository settings");
    execute_command(&ctx, cli.command)
}

fn execute_command(ctx: &Context, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Resolve {
            reference,
            from,
            json,
        } => commands::run_resolve(ctx, &reference, from.as_deref(), json),
        Commands::Cat { reference, from } => commands::run_cat(ctx, &reference, from.as_deref()),
        Commands::Repos { action } => match action {
            ReposAction::List { json } => commands::run_repos_list(ctx, json),
            ReposAction::Add { location } => commands::run_repos_add(ctx, &location),
            ReposAction::Remove { location } => commands::run_repos_remove(ctx, &location),
        },
    }
}

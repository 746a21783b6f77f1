//! Repository list management

use colored::Colorize;

use crate::context::{self, Context};
use crate::error::{CliError, Result};

/// Run the repos list command
pub fn run_repos_list(ctx: &Context, json: bool) -> Result<()> {
    let settings = ctx.load_settings()?;
    let entries: Vec<(&str, &str)> = settings
        .system
        .iter()
        .map(|uri| ("system", uri.as_str()))
        .chain(settings.repositories.iter().map(|uri| ("user", uri.as_str())))
        .collect();

    if json {
        let values: Vec<_> = entries
            .iter()
            .map(|(role, uri)| match context::build(uri) {
                Ok(_) => serde_json::json!({ "role": role, "uri": uri, "status": "ok" }),
                Err(e) => serde_json::json!({
                    "role": role,
                    "uri": uri,
                    "status": "error",
                    "error": e.to_string(),
                }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!(
            "No repositories configured in {}. Use {} to add one.",
            ctx.config_display(),
            "esm repos add <location>".cyan()
        );
        return Ok(());
    }

    println!("{}", "Module repositories".bold());
    for (role, uri) in entries {
        match context::build(uri) {
            Ok(_) => println!("  {:<7} {} {}", role.cyan(), uri, "ok".green()),
            Err(e) => println!("  {:<7} {} {} ({})", role.cyan(), uri, "error".red(), e),
        }
    }
    Ok(())
}

/// Run the repos add command
pub fn run_repos_add(ctx: &Context, location: &str) -> Result<()> {
    let uri = context::normalize(location)?;
    // Reject locations that can't be loaded before persisting them
    let repository = context::build(&uri)?;
    tracing::debug!(%uri, repository = %repository.identity(), "Validated repository");

    let mut settings = ctx.load_settings()?;
    if !settings.add(uri.clone()) {
        println!("{} Repository {} is already configured", "note:".dimmed(), uri);
        return Ok(());
    }
    ctx.save_settings(&settings)?;
    println!("{} Added repository {}", "OK".green().bold(), uri);
    Ok(())
}

/// Run the repos remove command
pub fn run_repos_remove(ctx: &Context, location: &str) -> Result<()> {
    // A location that no longer exists is still removable by its URI text
    let uri = context::normalize(location).unwrap_or_else(|_| location.to_owned());

    let mut settings = ctx.load_settings()?;
    if !settings.remove(&uri) {
        return Err(CliError::user(format!(
            "Repository '{location}' is not configured in {}",
            ctx.config_display()
        )));
    }
    ctx.save_settings(&settings)?;
    println!("{} Removed repository {}", "OK".green().bold(), uri);
    Ok(())
}

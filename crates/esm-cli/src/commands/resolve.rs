//! resolve and cat commands

use std::io::{self, Write};

use esm_resolver::{ModuleHandle, ModuleResolver};

use crate::context::Context;
use crate::error::{CliError, Result};

/// Resolve `reference`, optionally as imported from `from`.
///
/// The referrer is itself resolved first, so it can be given as a module
/// reference rather than a handle from an earlier run.
fn lookup(resolver: &ModuleResolver, reference: &str, from: Option<&str>) -> Result<ModuleHandle> {
    let found = match from {
        Some(referrer) => {
            let referrer_handle = resolver
                .resolve(referrer)
                .ok_or_else(|| CliError::user(format!("Referrer '{referrer}' not found")))?;
            resolver.resolve_from(&referrer_handle, reference)
        }
        None => resolver.resolve(reference),
    };
    found.ok_or_else(|| CliError::user(format!("Module '{reference}' not found")))
}

/// Run the resolve command
pub fn run_resolve(ctx: &Context, reference: &str, from: Option<&str>, json: bool) -> Result<()> {
    let resolver = ctx.resolver()?;
    let handle = lookup(&resolver, reference, from)?;

    if json {
        let owner = resolver.owner_of(handle.path());
        let value = serde_json::json!({
            "reference": reference,
            "handle": handle.to_string(),
            "repository": owner.as_ref().map(|repo| repo.base_uri().to_string()),
            "path": owner
                .as_ref()
                .and_then(|repo| repo.identity().repo_relative(handle.path()))
                .map(|path| path.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{handle}");
    }
    Ok(())
}

/// Run the cat command
pub fn run_cat(ctx: &Context, reference: &str, from: Option<&str>) -> Result<()> {
    let resolver = ctx.resolver()?;
    let handle = lookup(&resolver, reference, from)?;

    let mut stream = resolver.open(&handle)?;
    let mut stdout = io::stdout().lock();
    io::copy(&mut stream, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

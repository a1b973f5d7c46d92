//! Environment commands and .env import/export.

use dialoguer::Confirm;
use tracing::info;

use crate::cli::context::Context;
use crate::cli::output;
use crate::core::envfile::EnvFile;
use crate::error::Result;

/// List environments of the current project.
pub fn list() -> Result<()> {
    let ctx = Context::open()?;
    let envs = ctx.vault.environments(ctx.project_id())?;

    output::section(&format!("{} environments", ctx.project_name()));
    for env in &envs {
        let count = ctx.vault.list(ctx.project_id(), &env.name)?.len();
        output::list_item(&format!("{} ({} secrets)", env.name, count));
    }
    Ok(())
}

/// Create an environment.
pub fn create(name: &str) -> Result<()> {
    let ctx = Context::open()?;
    ctx.vault.create_environment(ctx.project_id(), name)?;
    output::success(&format!("created environment '{name}'"));
    Ok(())
}

/// Delete an environment and everything in it.
pub fn delete(name: &str, force: bool) -> Result<()> {
    let ctx = Context::open()?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete environment '{name}' and all its secrets?"
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            output::dimmed("aborted");
            return Ok(());
        }
    }

    ctx.vault.delete_environment(ctx.project_id(), name)?;
    output::success(&format!("deleted environment '{name}'"));
    Ok(())
}

/// Copy all secrets from one environment to another.
pub fn copy(from: &str, to: &str) -> Result<()> {
    let ctx = Context::open()?;
    let copied = ctx.vault.copy_environment(ctx.project_id(), from, to)?;
    output::success(&format!("copied {copied} secrets from {from} to {to}"));
    Ok(())
}

/// Import secrets from a .env file.
pub fn import(path: &str, env: &str) -> Result<()> {
    let ctx = Context::open()?;
    let outcome = ctx.vault.import_env_file(ctx.project_id(), env, path)?;

    info!(imported = outcome.imported.len(), "import finished");
    output::success(&format!(
        "imported {} secrets into {env}",
        outcome.imported.len()
    ));
    for key in &outcome.imported {
        output::list_item(&output::key(key));
    }
    for key in &outcome.skipped {
        output::warn(&format!("skipped invalid key '{key}'"));
    }
    Ok(())
}

/// Export an environment in .env format, to stdout or a file.
pub fn export(env: &str, output_path: Option<&str>) -> Result<()> {
    let ctx = Context::open()?;
    let pairs: Vec<(String, String)> = ctx
        .vault
        .reveal(ctx.project_id(), env)?
        .into_iter()
        .map(|s| (s.key, s.value.to_string()))
        .collect();

    match output_path {
        Some(path) => {
            let file = EnvFile::from_pairs(pairs, path.into());
            file.save()?;
            output::success(&format!("wrote {} secrets to {path}", file.len()));
        }
        None => {
            let file = EnvFile::from_pairs(pairs, ".env".into());
            print!("{}", file.to_env_string());
        }
    }
    Ok(())
}

//! Secret commands - set, get, unset, list, history, rollback.

use dialoguer::Password;
use tracing::info;
use zeroize::Zeroizing;

use crate::cli::context::Context;
use crate::cli::output;
use crate::error::Result;

/// Set a secret, prompting for the value when it was not given inline.
pub fn set(key: &str, value: Option<String>, env: &str, description: Option<&str>) -> Result<()> {
    let ctx = Context::open()?;

    let value = match value {
        Some(v) => Zeroizing::new(v),
        None => Zeroizing::new(
            Password::new()
                .with_prompt(format!("Value for {key}"))
                .interact()?,
        ),
    };

    ctx.vault
        .set(ctx.project_id(), env, key, &value, description)?;

    info!(key, env, "secret set");
    output::success(&format!("set {} in {}", output::key(key), env));
    Ok(())
}

/// Print a decrypted secret value to stdout.
///
/// The raw value goes to stdout with nothing else so it can be piped.
pub fn get(key: &str, env: &str) -> Result<()> {
    let ctx = Context::open()?;
    let value = ctx.vault.get(ctx.project_id(), env, key)?;
    println!("{}", value.as_str());
    Ok(())
}

/// Remove a secret.
pub fn unset(key: &str, env: &str) -> Result<()> {
    let ctx = Context::open()?;
    ctx.vault.unset(ctx.project_id(), env, key)?;
    output::success(&format!("removed {} from {}", output::key(key), env));
    Ok(())
}

/// List the secrets of an environment.
pub fn list(env: &str, show: bool, json: bool) -> Result<()> {
    let ctx = Context::open()?;

    if json {
        return list_json(&ctx, env, show);
    }

    let secrets = ctx.vault.list(ctx.project_id(), env)?;
    if secrets.is_empty() {
        output::dimmed(&format!("no secrets in {env}"));
        return Ok(());
    }

    output::section(&format!("{} ({})", ctx.project_name(), env));
    if show {
        for secret in ctx.vault.reveal(ctx.project_id(), env)? {
            println!("  {} = {}", output::key(&secret.key), secret.value.as_str());
        }
    } else {
        for secret in &secrets {
            match &secret.description {
                Some(desc) => println!("  {}  ({desc})", output::key(&secret.key)),
                None => println!("  {}", output::key(&secret.key)),
            }
        }
    }
    println!();
    output::dimmed(&format!("{} secrets", secrets.len()));
    Ok(())
}

fn list_json(ctx: &Context, env: &str, show: bool) -> Result<()> {
    let rendered = if show {
        let map: std::collections::BTreeMap<String, String> = ctx
            .vault
            .reveal(ctx.project_id(), env)?
            .into_iter()
            .map(|s| (s.key, s.value.to_string()))
            .collect();
        serde_json::to_string_pretty(&map)?
    } else {
        let keys: Vec<String> = ctx
            .vault
            .list(ctx.project_id(), env)?
            .into_iter()
            .map(|s| s.key)
            .collect();
        serde_json::to_string_pretty(&keys)?
    };
    println!("{rendered}");
    Ok(())
}

/// Show the version history of a secret.
pub fn history(key: &str, env: &str, limit: usize) -> Result<()> {
    let ctx = Context::open()?;
    let entries = ctx.vault.history(ctx.project_id(), env, key, limit)?;

    if entries.is_empty() {
        output::dimmed(&format!("no history for {key}"));
        return Ok(());
    }

    output::section(&format!("{key} history ({env})"));
    for entry in &entries {
        println!(
            "  v{}  {}  {}",
            entry.version,
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.value.as_str()
        );
    }
    Ok(())
}

/// Restore a secret to a previous version.
pub fn rollback(key: &str, version: i64, env: &str) -> Result<()> {
    let ctx = Context::open()?;
    ctx.vault
        .restore_version(ctx.project_id(), env, key, version)?;
    output::success(&format!("restored {} to v{version}", output::key(key)));
    Ok(())
}

//! Run command.
//!
//! Executes a child command with an environment's decrypted secrets
//! injected as environment variables. The values exist only in the child
//! process environment and are never written to disk.

use tracing::info;

use crate::cli::context::Context;
use crate::cli::output;
use crate::core::vault::Vault;
use crate::error::Result;

/// Run a command with secrets from `env` injected.
///
/// Exits the process with the child's exit code.
pub fn execute(env: &str, command: &[String]) -> Result<()> {
    let ctx = Context::open()?;

    if env == "production" {
        output::warn("running with production environment variables");
    }

    let code = run_with_secrets(&ctx.vault, ctx.project_id(), env, command)?;
    std::process::exit(code);
}

/// Spawn `command` with the environment's decrypted secrets as
/// environment variables, returning the child's exit code.
pub fn run_with_secrets(
    vault: &Vault,
    project_id: &str,
    env: &str,
    command: &[String],
) -> Result<i32> {
    let (program, args) = command.split_first().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "no command specified")
    })?;

    let secrets = vault.reveal(project_id, env)?;
    info!(count = secrets.len(), env, "injecting secrets");

    let mut cmd = std::process::Command::new(program);
    cmd.args(args);
    for secret in &secrets {
        cmd.env(&secret.key, secret.value.as_str());
    }

    let status = cmd.status()?;
    Ok(status.code().unwrap_or(1))
}

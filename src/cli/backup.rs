//! Backup and restore commands.

use chrono::Utc;
use tracing::info;

use crate::cli::context::Context;
use crate::cli::output;
use crate::core::backup::{create_backup, read_backup, restore_backup};
use crate::error::Result;

/// Write an encrypted backup of the whole project.
pub fn create(path: Option<&str>) -> Result<()> {
    let ctx = Context::open()?;

    let path = match path {
        Some(p) => p.to_string(),
        None => format!(
            "cellar-backup-{}-{}.enc",
            ctx.project_name(),
            Utc::now().format("%Y%m%d-%H%M%S")
        ),
    };

    let doc = create_backup(&ctx.vault, ctx.project_id(), ctx.project_name(), &path)?;

    let secrets: usize = doc.environments.values().map(|e| e.len()).sum();
    info!(path, secrets, "backup written");
    output::success(&format!(
        "backed up {} secrets across {} environments to {path}",
        secrets,
        doc.environments.len()
    ));
    output::warn("the backup is encrypted under this machine's master key; losing the key makes it unreadable");
    Ok(())
}

/// Restore a project from a backup file.
pub fn restore(path: &str, merge: bool, force: bool) -> Result<()> {
    let ctx = Context::open()?;
    let doc = read_backup(&ctx.vault, path)?;

    let outcome = restore_backup(&ctx.vault, ctx.project_id(), &doc, merge, force)?;

    output::success(&format!(
        "restored {} secrets ({} new environments)",
        outcome.secrets, outcome.environments
    ));
    Ok(())
}

//! Audit command - show the project audit log.

use crate::cli::context::Context;
use crate::cli::output;
use crate::error::Result;

/// Print recent audit entries, most recent first.
pub fn execute(limit: usize) -> Result<()> {
    let ctx = Context::open()?;
    let entries = ctx.vault.audit_log(ctx.project_id(), limit)?;

    if entries.is_empty() {
        output::dimmed("no audit entries");
        return Ok(());
    }

    output::section(&format!("{} audit log", ctx.project_name()));
    for entry in &entries {
        let when = entry.created_at.format("%Y-%m-%d %H:%M:%S");
        match &entry.metadata {
            Some(meta) => println!("  {when}  {:<20}  {meta}", entry.action),
            None => println!("  {when}  {}", entry.action),
        }
    }
    Ok(())
}

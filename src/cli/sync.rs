//! Sync command - push and pull encrypted blobs.

use tracing::info;

use crate::cli::context::Context;
use crate::cli::output;
use crate::core::api::{HttpRemote, Remote};
use crate::core::domain::SyncDirection;
use crate::core::sync::SyncEngine;
use crate::error::Result;

/// Run a sync against the configured server.
pub fn execute(push: bool, pull: bool, server: &str, token: &str) -> Result<()> {
    let direction = match (push, pull) {
        (true, false) => SyncDirection::PushOnly,
        (false, true) => SyncDirection::PullOnly,
        _ => SyncDirection::Both,
    };

    let ctx = Context::open()?;
    let remote = HttpRemote::new(server, token)?;
    let user_id = remote.validate_token()?;
    info!(user_id = %user_id, "token validated");
    let engine = SyncEngine::new(remote);

    info!(?direction, server, "starting sync");
    let (pulled, pushed) = engine.sync(&ctx.vault, ctx.project_id(), direction)?;

    if let Some(pull) = pulled {
        match pull.version {
            Some(version) => output::success(&format!(
                "pulled v{version} ({} secrets, {} new environments)",
                pull.secrets_imported, pull.environments_created
            )),
            None => output::dimmed("already up to date"),
        }
    }

    if let Some(push) = pushed {
        match push.version {
            Some(version) => output::success(&format!(
                "pushed v{version} ({} secrets in {} environments)",
                push.secrets, push.environments
            )),
            None => output::dimmed("nothing to push"),
        }
    }

    Ok(())
}

//! Reset-key command - remove the master key from the OS keyring.

use dialoguer::Confirm;
use tracing::warn;

use crate::cli::output;
use crate::core::crypto::delete_master_key;
use crate::core::keystore;
use crate::error::Result;

/// Delete the master key after an explicit confirmation.
///
/// Without the key every stored ciphertext becomes unreadable, so this
/// is only useful before a reinstall or when rotating to a new machine
/// after a backup.
pub fn execute(force: bool) -> Result<()> {
    if !keystore::exists()? {
        output::dimmed("no master key in the keyring");
        return Ok(());
    }

    if !force {
        output::warn("deleting the master key makes all encrypted secrets and backups unrecoverable");
        let confirmed = Confirm::new()
            .with_prompt("Delete the master key?")
            .default(false)
            .interact()?;
        if !confirmed {
            output::dimmed("aborted");
            return Ok(());
        }
    }

    warn!("deleting master key from keyring");
    delete_master_key()?;
    output::success("master key deleted");
    output::hint("a new key will be generated on the next command");
    Ok(())
}

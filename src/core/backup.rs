//! Backup and restore.
//!
//! A backup file is the project's decrypted state serialized to JSON,
//! encrypted under the master key with the same scheme as sync blobs,
//! base64-encoded, and written owner-only. Restoring therefore requires
//! the master key that wrote the backup.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::core::constants::BACKUP_VERSION;
use crate::core::domain::AuditAction;
use crate::core::vault::Vault;
use crate::error::{ConfigError, Result, SyncError};

/// Decrypted form of a backup file.
///
/// Environments map to key/value pairs; a BTreeMap keeps the output
/// stable across runs.
#[derive(Debug, Serialize, Deserialize)]
pub struct BackupDocument {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub project_id: String,
    pub project_name: String,
    pub environments: BTreeMap<String, BTreeMap<String, String>>,
}

/// Summary of a restore.
#[derive(Debug)]
pub struct RestoreOutcome {
    pub environments: usize,
    pub secrets: usize,
}

/// Snapshot a project into an encrypted backup file.
pub fn create_backup(
    vault: &Vault,
    project_id: &str,
    project_name: &str,
    path: impl AsRef<Path>,
) -> Result<BackupDocument> {
    let mut environments = BTreeMap::new();
    for env in vault.environments(project_id)? {
        let mut values = BTreeMap::new();
        for secret in vault.reveal(project_id, &env.name)? {
            values.insert(secret.key, secret.value.to_string());
        }
        environments.insert(env.name, values);
    }

    let doc = BackupDocument {
        version: BACKUP_VERSION.to_string(),
        created_at: Utc::now(),
        project_id: project_id.to_string(),
        project_name: project_name.to_string(),
        environments,
    };

    let plaintext = serde_json::to_string_pretty(&doc)?;
    let ciphertext = vault.crypto().encrypt(&plaintext)?;
    write_private(path.as_ref(), BASE64.encode(&ciphertext).as_bytes())?;

    if let Err(e) = vault.store().append_audit(
        project_id,
        AuditAction::BackupCreated,
        Some(&json!({ "path": path.as_ref().display().to_string() }).to_string()),
    ) {
        warn!("failed to record backup audit entry: {e}");
    }

    debug!(path = %path.as_ref().display(), "backup written");
    Ok(doc)
}

/// Decode, decrypt, and parse a backup file.
pub fn read_backup(vault: &Vault, path: impl AsRef<Path>) -> Result<BackupDocument> {
    let encoded = fs::read_to_string(path)?;
    let ciphertext = BASE64
        .decode(encoded.trim())
        .map_err(SyncError::Encoding)?;
    let plaintext = vault.crypto().decrypt(&ciphertext)?;
    let doc: BackupDocument = serde_json::from_str(&plaintext)?;
    Ok(doc)
}

/// Restore a backup into a project.
///
/// Without `merge`, each environment named in the backup is cleared
/// before its values are written back, so the result matches the file
/// exactly for those environments. With `merge`, existing secrets the
/// backup does not name are left alone. Environments absent from the
/// backup are never touched.
///
/// A non-merge restore must come from the current project unless
/// `allow_foreign` is set; merge mode skips the identity check since it
/// only adds to what is already there.
pub fn restore_backup(
    vault: &Vault,
    project_id: &str,
    doc: &BackupDocument,
    merge: bool,
    allow_foreign: bool,
) -> Result<RestoreOutcome> {
    if !merge && doc.project_id != project_id && !allow_foreign {
        let current = vault.store().get_project(project_id)?.name;
        return Err(ConfigError::ProjectMismatch {
            backup: doc.project_name.clone(),
            current,
        }
        .into());
    }

    let existing: Vec<String> = vault
        .environments(project_id)?
        .into_iter()
        .map(|e| e.name)
        .collect();

    let mut environments = 0;
    let mut secrets = 0;

    for (env_name, values) in &doc.environments {
        if !existing.iter().any(|n| n == env_name) {
            vault.create_environment(project_id, env_name)?;
            environments += 1;
        } else if !merge {
            for secret in vault.list(project_id, env_name)? {
                vault.unset(project_id, env_name, &secret.key)?;
            }
        }

        // Values are re-encrypted under the local key on the way in.
        for (key, value) in values {
            vault.set(project_id, env_name, key, value, None)?;
            secrets += 1;
        }
    }

    if let Err(e) = vault.store().append_audit(
        project_id,
        AuditAction::BackupRestored,
        Some(&json!({ "merge": merge, "secrets": secrets }).to_string()),
    ) {
        warn!("failed to record restore audit entry: {e}");
    }

    Ok(RestoreOutcome {
        environments,
        secrets,
    })
}

/// Write a file readable only by the owner.
fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(crate::core::constants::SECURE_FILE_MODE)
            .open(path)?;
        file.write_all(contents)?;
        return Ok(());
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents)?;
        Ok(())
    }
}

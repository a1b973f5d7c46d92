//! Encrypted-blob sync.
//!
//! Push serializes every environment of the project to canonical JSON,
//! encrypts it under the master key, and ships the base64 blob with a
//! SHA-256 checksum computed over the encoded form. Pull verifies the
//! checksum in constant time before touching the ciphertext and merges
//! additively: remote data can create and overwrite, never delete.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::core::api::Remote;
use crate::core::domain::{AuditAction, PullOutcome, PushOutcome, SyncDirection};
use crate::core::secure::constant_time_eq;
use crate::core::vault::Vault;
use crate::error::{Result, SyncError};

/// Plaintext form of a sync blob, before encryption.
///
/// BTreeMaps keep the serialization canonical so identical vault state
/// always produces the same checksum.
#[derive(Debug, Serialize, Deserialize)]
struct SyncPayload {
    environments: BTreeMap<String, BTreeMap<String, String>>,
}

/// Drives push and pull against a [`Remote`].
pub struct SyncEngine<R: Remote> {
    remote: R,
}

impl<R: Remote> SyncEngine<R> {
    pub fn new(remote: R) -> Self {
        Self { remote }
    }

    /// Run a sync in the given direction. Pull happens before push so a
    /// bidirectional sync uploads the merged state.
    pub fn sync(
        &self,
        vault: &Vault,
        project_id: &str,
        direction: SyncDirection,
    ) -> Result<(Option<PullOutcome>, Option<PushOutcome>)> {
        let pulled = if direction.pulls() {
            Some(self.pull(vault, project_id)?)
        } else {
            None
        };
        let pushed = if direction.pushes() {
            Some(self.push(vault, project_id)?)
        } else {
            None
        };
        Ok((pulled, pushed))
    }

    /// Encrypt the project's state and upload it.
    pub fn push(&self, vault: &Vault, project_id: &str) -> Result<PushOutcome> {
        let mut environments = BTreeMap::new();
        let mut secrets = 0;

        for env in vault.environments(project_id)? {
            let mut values = BTreeMap::new();
            for secret in vault.reveal(project_id, &env.name)? {
                values.insert(secret.key, secret.value.to_string());
                secrets += 1;
            }
            environments.insert(env.name, values);
        }

        let payload = SyncPayload { environments };
        let plaintext = serde_json::to_string(&payload)?;
        let ciphertext = vault.crypto().encrypt(&plaintext)?;
        let encoded = BASE64.encode(&ciphertext);
        let checksum = vault.crypto().hash(&encoded);

        debug!(bytes = encoded.len(), "pushing encrypted blob");
        let response = self.remote.push_blob(project_id, &encoded, &checksum)?;

        vault
            .store()
            .record_sync(project_id, response.version, &checksum)?;
        vault.store().set_sync_enabled(project_id, true)?;
        self.audit(
            vault,
            project_id,
            AuditAction::SyncPushed,
            json!({ "version": response.version, "secrets": secrets }),
        );

        info!(version = response.version, "push complete");
        Ok(PushOutcome {
            version: Some(response.version),
            secrets,
            environments: payload.environments.len(),
        })
    }

    /// Fetch the latest remote blob and merge it into the vault.
    pub fn pull(&self, vault: &Vault, project_id: &str) -> Result<PullOutcome> {
        let since = vault
            .store()
            .sync_state(project_id)?
            .map(|state| state.version);

        let response = self.remote.pull_blob(project_id, since)?;
        if !response.has_update {
            debug!("remote has nothing newer");
            return Ok(PullOutcome {
                version: None,
                secrets_imported: 0,
                environments_created: 0,
            });
        }

        let encoded = response
            .encrypted_data
            .ok_or_else(|| SyncError::Remote("update without data".to_string()))?;
        let checksum = response
            .checksum
            .ok_or_else(|| SyncError::Remote("update without checksum".to_string()))?;
        let version = response
            .version
            .ok_or_else(|| SyncError::Remote("update without version".to_string()))?;

        // Integrity first. Nothing gets decoded until the checksum over
        // the encoded blob matches.
        let computed = vault.crypto().hash(&encoded);
        if !constant_time_eq(computed.as_bytes(), checksum.as_bytes()) {
            return Err(SyncError::ChecksumMismatch.into());
        }

        let ciphertext = BASE64.decode(&encoded).map_err(SyncError::Encoding)?;
        let plaintext = vault.crypto().decrypt(&ciphertext)?;
        let payload: SyncPayload = serde_json::from_str(&plaintext)?;

        let existing: Vec<String> = vault
            .environments(project_id)?
            .into_iter()
            .map(|e| e.name)
            .collect();

        let mut secrets_imported = 0;
        let mut environments_created = 0;

        for (env_name, values) in &payload.environments {
            if !existing.iter().any(|n| n == env_name) {
                vault.create_environment(project_id, env_name)?;
                environments_created += 1;
            }
            for (key, value) in values {
                // Re-encrypt under the local key with a fresh nonce.
                vault.set(project_id, env_name, key, value, None)?;
                secrets_imported += 1;
            }
        }

        vault.store().record_sync(project_id, version, &checksum)?;
        vault.store().set_sync_enabled(project_id, true)?;
        self.audit(
            vault,
            project_id,
            AuditAction::SyncPulled,
            json!({ "version": version, "secrets": secrets_imported }),
        );

        info!(version, secrets_imported, "pull complete");
        Ok(PullOutcome {
            version: Some(version),
            secrets_imported,
            environments_created,
        })
    }

    fn audit(
        &self,
        vault: &Vault,
        project_id: &str,
        action: AuditAction,
        metadata: serde_json::Value,
    ) {
        if let Err(e) = vault
            .store()
            .append_audit(project_id, action, Some(&metadata.to_string()))
        {
            warn!(action = %action, "failed to record sync audit entry: {e}");
        }
    }
}

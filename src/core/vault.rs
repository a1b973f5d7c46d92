//! Vault engine.
//!
//! The primary interface for all secret operations. Binds the crypto
//! service and the storage engine; every mutating operation records
//! history (on overwrite) and an audit entry as best-effort side effects.

use serde_json::json;
use tracing::warn;
use zeroize::Zeroizing;

use crate::core::crypto::CryptoService;
use crate::core::domain::{
    AuditAction, AuditEntry, Environment, Project, Secret, SecretWrite,
};
use crate::core::envfile::EnvFile;
use crate::core::store::Store;
use crate::error::{Result, StoreError};

/// A decrypted secret value with its metadata.
pub struct DecryptedSecret {
    pub key: String,
    pub value: Zeroizing<String>,
    pub description: Option<String>,
}

/// A decrypted history entry.
pub struct HistoryEntry {
    pub version: i64,
    pub value: Zeroizing<String>,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Summary of an .env import.
pub struct ImportOutcome {
    pub imported: Vec<String>,
    pub skipped: Vec<String>,
}

/// The vault engine.
///
/// Owns the single store connection and the master-key service for the
/// duration of one invocation.
pub struct Vault {
    store: Store,
    crypto: CryptoService,
}

impl Vault {
    /// Assemble a vault from an open store and crypto service.
    pub fn new(store: Store, crypto: CryptoService) -> Self {
        Self { store, crypto }
    }

    /// Storage engine handle.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Crypto service handle.
    pub fn crypto(&self) -> &CryptoService {
        &self.crypto
    }

    // --- Projects ---

    /// Create a project along with its named environments.
    pub fn init_project(
        &self,
        name: &str,
        description: Option<&str>,
        owner_id: &str,
        environments: &[&str],
    ) -> Result<Project> {
        let project = self.store.create_project(name, description, owner_id)?;

        for env_name in environments {
            self.store.create_environment(&project.id, env_name)?;
        }

        self.audit(
            &project.id,
            AuditAction::ProjectCreated,
            json!({ "name": name, "environments": environments }),
        );

        Ok(project)
    }

    /// Delete a project and everything it owns.
    pub fn delete_project(&self, project_id: &str) -> Result<()> {
        self.store.delete_project(project_id)
    }

    // --- Environments ---

    /// Create an environment.
    pub fn create_environment(&self, project_id: &str, name: &str) -> Result<Environment> {
        let env = self.store.create_environment(project_id, name)?;
        self.audit(
            project_id,
            AuditAction::EnvironmentCreated,
            json!({ "environment": name }),
        );
        Ok(env)
    }

    /// Delete an environment by name; its secrets and history go with it.
    pub fn delete_environment(&self, project_id: &str, name: &str) -> Result<()> {
        let env = self.store.get_environment(project_id, name)?;
        self.store.delete_environment(&env.id)?;
        self.audit(
            project_id,
            AuditAction::EnvironmentDeleted,
            json!({ "environment": name }),
        );
        Ok(())
    }

    /// All environments of a project, by name.
    pub fn environments(&self, project_id: &str) -> Result<Vec<Environment>> {
        self.store.list_environments(project_id)
    }

    // --- Secrets ---

    /// Set a secret in an environment, encrypting the value under the
    /// local master key.
    ///
    /// Overwrites snapshot the previous ciphertext into history first.
    pub fn set(
        &self,
        project_id: &str,
        env_name: &str,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> Result<Secret> {
        validate_key(key)?;

        let env = self.store.get_environment(project_id, env_name)?;
        let ciphertext = self.crypto.encrypt(value)?;
        let write = self.write_ciphertext(&env, key, &ciphertext, description)?;

        let action = if write.created {
            AuditAction::SecretCreated
        } else {
            AuditAction::SecretUpdated
        };
        self.audit(
            project_id,
            action,
            json!({ "environment": env_name, "key": key }),
        );

        Ok(write.secret)
    }

    /// Get a decrypted secret value.
    pub fn get(&self, project_id: &str, env_name: &str, key: &str) -> Result<Zeroizing<String>> {
        let env = self.store.get_environment(project_id, env_name)?;
        let secret = self.store.get_secret(&env.id, key)?;
        self.crypto.decrypt(&secret.encrypted_value)
    }

    /// Remove a secret.
    pub fn unset(&self, project_id: &str, env_name: &str, key: &str) -> Result<()> {
        let env = self.store.get_environment(project_id, env_name)?;
        self.store.delete_secret(&env.id, key)?;
        self.audit(
            project_id,
            AuditAction::SecretDeleted,
            json!({ "environment": env_name, "key": key }),
        );
        Ok(())
    }

    /// Encrypted secret rows of an environment, by key.
    pub fn list(&self, project_id: &str, env_name: &str) -> Result<Vec<Secret>> {
        let env = self.store.get_environment(project_id, env_name)?;
        self.store.list_secrets(&env.id)
    }

    /// Decrypt every secret of an environment (for export/run/sync).
    pub fn reveal(&self, project_id: &str, env_name: &str) -> Result<Vec<DecryptedSecret>> {
        let env = self.store.get_environment(project_id, env_name)?;
        let mut out = Vec::new();
        for secret in self.store.list_secrets(&env.id)? {
            out.push(DecryptedSecret {
                value: self.crypto.decrypt(&secret.encrypted_value)?,
                key: secret.key,
                description: secret.description,
            });
        }
        Ok(out)
    }

    /// Import key/value pairs from an .env file.
    ///
    /// Invalid keys are skipped with a warning rather than failing the
    /// whole import.
    pub fn import_env_file(
        &self,
        project_id: &str,
        env_name: &str,
        path: impl AsRef<std::path::Path>,
    ) -> Result<ImportOutcome> {
        let env = self.store.get_environment(project_id, env_name)?;
        let file = EnvFile::load(path)?;

        let mut imported = Vec::new();
        let mut skipped = Vec::new();

        for (key, value) in file.entries() {
            if validate_key(key).is_err() || value.is_empty() {
                warn!(key = %key, "skipping invalid entry during import");
                skipped.push(key.clone());
                continue;
            }

            let ciphertext = self.crypto.encrypt(value)?;
            self.write_ciphertext(&env, key, &ciphertext, None)?;
            imported.push(key.clone());
        }

        self.audit(
            project_id,
            AuditAction::SecretsImported,
            json!({ "environment": env_name, "count": imported.len() }),
        );

        Ok(ImportOutcome { imported, skipped })
    }

    /// Copy every secret of one environment into another.
    ///
    /// Ciphertext is copied as-is; both environments live under the same
    /// master key, so no round trip through plaintext is needed.
    pub fn copy_environment(&self, project_id: &str, src: &str, dst: &str) -> Result<usize> {
        let src_env = self.store.get_environment(project_id, src)?;
        let dst_env = self.store.get_environment(project_id, dst)?;

        let secrets = self.store.list_secrets(&src_env.id)?;
        for secret in &secrets {
            self.write_ciphertext(
                &dst_env,
                &secret.key,
                &secret.encrypted_value,
                secret.description.as_deref(),
            )?;
        }

        self.audit(
            project_id,
            AuditAction::EnvironmentCopied,
            json!({ "from": src, "to": dst, "count": secrets.len() }),
        );

        Ok(secrets.len())
    }

    // --- History & audit ---

    /// Decrypted history of a secret, newest version first.
    pub fn history(
        &self,
        project_id: &str,
        env_name: &str,
        key: &str,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>> {
        let env = self.store.get_environment(project_id, env_name)?;
        let secret = self.store.get_secret(&env.id, key)?;

        let mut out = Vec::new();
        for entry in self.store.list_history(&secret.id, limit)? {
            out.push(HistoryEntry {
                version: entry.version,
                value: self.crypto.decrypt(&entry.encrypted_value)?,
                description: entry.description,
                created_at: entry.created_at,
            });
        }
        Ok(out)
    }

    /// Write a historical value back as the current value.
    pub fn restore_version(
        &self,
        project_id: &str,
        env_name: &str,
        key: &str,
        version: i64,
    ) -> Result<()> {
        let env = self.store.get_environment(project_id, env_name)?;
        let secret = self.store.get_secret(&env.id, key)?;

        let entry = self
            .store
            .find_history_version(&secret.id, version)?
            .ok_or_else(|| StoreError::SecretNotFound(format!("{key} v{version}")))?;

        self.write_ciphertext(&env, key, &entry.encrypted_value, entry.description.as_deref())?;
        self.audit(
            project_id,
            AuditAction::SecretRestored,
            json!({ "environment": env_name, "key": key, "version": version }),
        );
        Ok(())
    }

    /// Audit entries of a project, most recent first.
    pub fn audit_log(&self, project_id: &str, limit: usize) -> Result<Vec<AuditEntry>> {
        self.store.list_audit(project_id, limit)
    }

    // --- Internal ---

    /// Upsert ciphertext, snapshotting the previous value into history.
    ///
    /// A failed history write degrades to a warning; the mutation stands.
    pub(crate) fn write_ciphertext(
        &self,
        env: &Environment,
        key: &str,
        ciphertext: &[u8],
        description: Option<&str>,
    ) -> Result<SecretWrite> {
        let previous = self.store.find_secret(&env.id, key)?;
        let write = self.store.upsert_secret(&env.id, key, ciphertext, description)?;

        if let Some(prev) = previous {
            let result = self
                .store
                .max_history_version(&prev.id)
                .and_then(|max| {
                    self.store.append_history(
                        &prev.id,
                        &prev.environment_id,
                        &prev.key,
                        &prev.encrypted_value,
                        prev.description.as_deref(),
                        max + 1,
                    )
                });
            if let Err(e) = result {
                warn!(key = %key, "failed to record secret history: {e}");
            }
        }

        Ok(write)
    }

    /// Best-effort audit write.
    fn audit(&self, project_id: &str, action: AuditAction, metadata: serde_json::Value) {
        if let Err(e) = self
            .store
            .append_audit(project_id, action, Some(&metadata.to_string()))
        {
            warn!(action = %action, "failed to record audit entry: {e}");
        }
    }
}

/// Validate a secret key name.
///
/// Keys must be valid environment variable names: A-Z, 0-9, underscore,
/// not starting with a digit, not empty.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey {
            key: key.to_string(),
            reason: "cannot be empty".to_string(),
        }
        .into());
    }

    if key.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return Err(StoreError::InvalidKey {
            key: key.to_string(),
            reason: "cannot start with a digit".to_string(),
        }
        .into());
    }

    for (i, ch) in key.chars().enumerate() {
        if !ch.is_ascii_alphanumeric() && ch != '_' {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
                reason: format!(
                    "invalid character '{}' at position {}. Only A-Z, 0-9, and underscore are allowed",
                    ch,
                    i + 1
                ),
            }
            .into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key_accepts_env_names() {
        assert!(validate_key("DATABASE_URL").is_ok());
        assert!(validate_key("API_KEY_2").is_ok());
        assert!(validate_key("x").is_ok());
    }

    #[test]
    fn test_validate_key_rejects_bad_names() {
        assert!(validate_key("").is_err());
        assert!(validate_key("2FAST").is_err());
        assert!(validate_key("WITH-DASH").is_err());
        assert!(validate_key("WITH SPACE").is_err());
    }
}

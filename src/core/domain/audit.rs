//! Audit log types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed vocabulary of auditable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    ProjectCreated,
    EnvironmentCreated,
    EnvironmentDeleted,
    SecretCreated,
    SecretUpdated,
    SecretDeleted,
    SecretRestored,
    SecretsImported,
    EnvironmentCopied,
    BackupCreated,
    BackupRestored,
    SyncPushed,
    SyncPulled,
}

impl AuditAction {
    /// Stable string form stored in the audit table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectCreated => "project_created",
            Self::EnvironmentCreated => "environment_created",
            Self::EnvironmentDeleted => "environment_deleted",
            Self::SecretCreated => "secret_created",
            Self::SecretUpdated => "secret_updated",
            Self::SecretDeleted => "secret_deleted",
            Self::SecretRestored => "secret_restored",
            Self::SecretsImported => "secrets_imported",
            Self::EnvironmentCopied => "environment_copied",
            Self::BackupCreated => "backup_created",
            Self::BackupRestored => "backup_restored",
            Self::SyncPushed => "sync_pushed",
            Self::SyncPulled => "sync_pulled",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only record of a mutating action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub project_id: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_strings() {
        assert_eq!(AuditAction::SecretCreated.as_str(), "secret_created");
        assert_eq!(AuditAction::SyncPulled.to_string(), "sync_pulled");
    }
}

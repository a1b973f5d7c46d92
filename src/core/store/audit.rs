//! History, audit, and sync-state persistence.
//!
//! History and audit tables are append-only: nothing here mutates or
//! deletes rows, only cascade rules in the schema do.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::core::domain::{AuditAction, AuditEntry, SecretHistory, SyncState};
use crate::error::{Result, StoreError};

use super::Store;

fn history_from_row(row: &Row<'_>) -> rusqlite::Result<SecretHistory> {
    Ok(SecretHistory {
        id: row.get(0)?,
        secret_id: row.get(1)?,
        environment_id: row.get(2)?,
        key: row.get(3)?,
        encrypted_value: row.get(4)?,
        description: row.get(5)?,
        version: row.get(6)?,
        created_at: row.get(7)?,
    })
}

impl Store {
    /// Append a history snapshot of a secret's previous value.
    pub fn append_history(
        &self,
        secret_id: &str,
        environment_id: &str,
        key: &str,
        encrypted_value: &[u8],
        description: Option<&str>,
        version: i64,
    ) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO secret_history
                 (id, secret_id, environment_id, key, encrypted_value, description, version, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    Uuid::new_v4().to_string(),
                    secret_id,
                    environment_id,
                    key,
                    encrypted_value,
                    description,
                    version,
                    Utc::now(),
                ],
            )
            .map_err(StoreError::Sql)?;
        Ok(())
    }

    /// Highest history version recorded for a secret (0 when none).
    pub fn max_history_version(&self, secret_id: &str) -> Result<i64> {
        let max: Option<i64> = self
            .conn()
            .query_row(
                "SELECT MAX(version) FROM secret_history WHERE secret_id = ?1",
                params![secret_id],
                |row| row.get(0),
            )
            .map_err(StoreError::Sql)?;
        Ok(max.unwrap_or(0))
    }

    /// History entries for a secret, newest version first.
    pub fn list_history(&self, secret_id: &str, limit: usize) -> Result<Vec<SecretHistory>> {
        let mut stmt = self
            .conn()
            .prepare(
                "SELECT id, secret_id, environment_id, key, encrypted_value, description, version, created_at
                 FROM secret_history WHERE secret_id = ?1
                 ORDER BY version DESC LIMIT ?2",
            )
            .map_err(StoreError::Sql)?;

        let rows = stmt
            .query_map(params![secret_id, limit as i64], history_from_row)
            .map_err(StoreError::Sql)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::Sql)?;
        Ok(rows)
    }

    /// Look up one history entry of a secret by version number.
    pub fn find_history_version(
        &self,
        secret_id: &str,
        version: i64,
    ) -> Result<Option<SecretHistory>> {
        let entry = self
            .conn()
            .query_row(
                "SELECT id, secret_id, environment_id, key, encrypted_value, description, version, created_at
                 FROM secret_history WHERE secret_id = ?1 AND version = ?2",
                params![secret_id, version],
                history_from_row,
            )
            .optional()
            .map_err(StoreError::Sql)?;
        Ok(entry)
    }

    /// Append an audit entry for a project.
    pub fn append_audit(
        &self,
        project_id: &str,
        action: AuditAction,
        metadata: Option<&str>,
    ) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO audit_logs (id, project_id, action, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    Uuid::new_v4().to_string(),
                    project_id,
                    action.as_str(),
                    metadata,
                    Utc::now(),
                ],
            )
            .map_err(StoreError::Sql)?;
        Ok(())
    }

    /// Audit entries for a project, most recent first.
    pub fn list_audit(&self, project_id: &str, limit: usize) -> Result<Vec<AuditEntry>> {
        let mut stmt = self
            .conn()
            .prepare(
                "SELECT id, project_id, action, metadata, created_at
                 FROM audit_logs WHERE project_id = ?1
                 ORDER BY created_at DESC, id LIMIT ?2",
            )
            .map_err(StoreError::Sql)?;

        let rows = stmt
            .query_map(params![project_id, limit as i64], |row| {
                Ok(AuditEntry {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    action: row.get(2)?,
                    metadata: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })
            .map_err(StoreError::Sql)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::Sql)?;
        Ok(rows)
    }

    /// Record the blob version and checksum a project last observed.
    pub fn record_sync(&self, project_id: &str, version: i64, checksum: &str) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO sync_metadata (id, project_id, last_sync_at, version, checksum)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(project_id) DO UPDATE SET
                     last_sync_at = excluded.last_sync_at,
                     version = excluded.version,
                     checksum = excluded.checksum",
                params![
                    Uuid::new_v4().to_string(),
                    project_id,
                    Utc::now(),
                    version,
                    checksum,
                ],
            )
            .map_err(StoreError::Sql)?;
        Ok(())
    }

    /// Last recorded sync state for a project, if any.
    pub fn sync_state(&self, project_id: &str) -> Result<Option<SyncState>> {
        let state = self
            .conn()
            .query_row(
                "SELECT project_id, last_sync_at, version, checksum
                 FROM sync_metadata WHERE project_id = ?1",
                params![project_id],
                |row| {
                    Ok(SyncState {
                        project_id: row.get(0)?,
                        last_sync_at: row.get(1)?,
                        version: row.get(2)?,
                        checksum: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(StoreError::Sql)?;
        Ok(state)
    }
}

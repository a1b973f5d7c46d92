//! Secret persistence.
//!
//! Writes are upserts keyed on `(environment_id, key)`: exactly one live
//! row per pair, with a stable row id across overwrites.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::core::domain::{Secret, SecretWrite};
use crate::error::{Result, StoreError};

use super::Store;

fn secret_from_row(row: &Row<'_>) -> rusqlite::Result<Secret> {
    Ok(Secret {
        id: row.get(0)?,
        environment_id: row.get(1)?,
        key: row.get(2)?,
        encrypted_value: row.get(3)?,
        description: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

const SECRET_COLUMNS: &str =
    "id, environment_id, key, encrypted_value, description, created_at, updated_at";

impl Store {
    /// Set a secret: insert when the `(environment_id, key)` pair is new,
    /// update in place otherwise.
    ///
    /// Returns the resulting row and whether it was a fresh insert, which
    /// the vault engine uses to decide whether a history row is due.
    pub fn upsert_secret(
        &self,
        environment_id: &str,
        key: &str,
        encrypted_value: &[u8],
        description: Option<&str>,
    ) -> Result<SecretWrite> {
        let now = Utc::now();

        // Single-writer engine: no race between the lookup and the write.
        if let Some(existing) = self.find_secret(environment_id, key)? {
            self.conn()
                .execute(
                    "UPDATE secrets
                     SET encrypted_value = ?1, description = ?2, updated_at = ?3
                     WHERE id = ?4",
                    params![encrypted_value, description, now, existing.id],
                )
                .map_err(StoreError::Sql)?;

            return Ok(SecretWrite {
                secret: Secret {
                    encrypted_value: encrypted_value.to_vec(),
                    description: description.map(str::to_string),
                    updated_at: now,
                    ..existing
                },
                created: false,
            });
        }

        let secret = Secret {
            id: Uuid::new_v4().to_string(),
            environment_id: environment_id.to_string(),
            key: key.to_string(),
            encrypted_value: encrypted_value.to_vec(),
            description: description.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        self.conn()
            .execute(
                "INSERT INTO secrets (id, environment_id, key, encrypted_value, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    secret.id,
                    secret.environment_id,
                    secret.key,
                    secret.encrypted_value,
                    secret.description,
                    secret.created_at,
                    secret.updated_at,
                ],
            )
            .map_err(StoreError::Sql)?;

        Ok(SecretWrite {
            secret,
            created: true,
        })
    }

    /// Fetch a secret by environment and key.
    ///
    /// # Errors
    ///
    /// `StoreError::SecretNotFound` when no such row exists.
    pub fn get_secret(&self, environment_id: &str, key: &str) -> Result<Secret> {
        self.find_secret(environment_id, key)?
            .ok_or_else(|| StoreError::SecretNotFound(key.to_string()).into())
    }

    /// Fetch a secret by environment and key, if present.
    pub fn find_secret(&self, environment_id: &str, key: &str) -> Result<Option<Secret>> {
        let found = self
            .conn()
            .query_row(
                &format!(
                    "SELECT {SECRET_COLUMNS} FROM secrets
                     WHERE environment_id = ?1 AND key = ?2"
                ),
                params![environment_id, key],
                secret_from_row,
            )
            .optional()
            .map_err(StoreError::Sql)?;
        Ok(found)
    }

    /// All secrets of an environment, ordered by key.
    pub fn list_secrets(&self, environment_id: &str) -> Result<Vec<Secret>> {
        let mut stmt = self
            .conn()
            .prepare(&format!(
                "SELECT {SECRET_COLUMNS} FROM secrets
                 WHERE environment_id = ?1 ORDER BY key"
            ))
            .map_err(StoreError::Sql)?;

        let rows = stmt
            .query_map(params![environment_id], secret_from_row)
            .map_err(StoreError::Sql)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::Sql)?;
        Ok(rows)
    }

    /// Delete a secret by environment and key; history rows go with it.
    pub fn delete_secret(&self, environment_id: &str, key: &str) -> Result<()> {
        let affected = self
            .conn()
            .execute(
                "DELETE FROM secrets WHERE environment_id = ?1 AND key = ?2",
                params![environment_id, key],
            )
            .map_err(StoreError::Sql)?;

        if affected == 0 {
            return Err(StoreError::SecretNotFound(key.to_string()).into());
        }
        Ok(())
    }
}

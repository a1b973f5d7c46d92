//! Environment persistence.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::core::domain::Environment;
use crate::error::{Result, StoreError};

use super::Store;

fn environment_from_row(row: &Row<'_>) -> rusqlite::Result<Environment> {
    Ok(Environment {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

impl Store {
    /// Create a new environment within a project.
    ///
    /// # Errors
    ///
    /// `StoreError::EnvironmentExists` when the name is already taken in
    /// this project.
    pub fn create_environment(&self, project_id: &str, name: &str) -> Result<Environment> {
        let now = Utc::now();
        let env = Environment {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };

        let inserted = self.conn().execute(
            "INSERT INTO environments (id, project_id, name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![env.id, env.project_id, env.name, env.created_at, env.updated_at],
        );

        match inserted {
            Ok(_) => Ok(env),
            // Only the UNIQUE(project_id, name) constraint means a duplicate;
            // other constraint failures (FK on project_id) stay SQL errors.
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(StoreError::EnvironmentExists(name.to_string()).into())
            }
            Err(e) => Err(StoreError::Sql(e).into()),
        }
    }

    /// Fetch an environment by project and name.
    ///
    /// # Errors
    ///
    /// `StoreError::EnvironmentNotFound` when no such row exists.
    pub fn get_environment(&self, project_id: &str, name: &str) -> Result<Environment> {
        self.find_environment(project_id, name)?
            .ok_or_else(|| StoreError::EnvironmentNotFound(name.to_string()).into())
    }

    /// Fetch an environment by project and name, if present.
    pub fn find_environment(&self, project_id: &str, name: &str) -> Result<Option<Environment>> {
        let found = self
            .conn()
            .query_row(
                "SELECT id, project_id, name, created_at, updated_at
                 FROM environments WHERE project_id = ?1 AND name = ?2",
                params![project_id, name],
                environment_from_row,
            )
            .optional()
            .map_err(StoreError::Sql)?;
        Ok(found)
    }

    /// All environments of a project, ordered by name.
    pub fn list_environments(&self, project_id: &str) -> Result<Vec<Environment>> {
        let mut stmt = self
            .conn()
            .prepare(
                "SELECT id, project_id, name, created_at, updated_at
                 FROM environments WHERE project_id = ?1 ORDER BY name",
            )
            .map_err(StoreError::Sql)?;

        let rows = stmt
            .query_map(params![project_id], environment_from_row)
            .map_err(StoreError::Sql)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::Sql)?;
        Ok(rows)
    }

    /// Delete an environment; cascades to its secrets and their history.
    pub fn delete_environment(&self, id: &str) -> Result<()> {
        let affected = self
            .conn()
            .execute("DELETE FROM environments WHERE id = ?1", params![id])
            .map_err(StoreError::Sql)?;

        if affected == 0 {
            return Err(StoreError::EnvironmentNotFound(id.to_string()).into());
        }
        Ok(())
    }
}

//! Project persistence.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::core::domain::Project;
use crate::error::{Result, StoreError};

use super::Store;

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        team_id: row.get(3)?,
        owner_id: row.get(4)?,
        sync_enabled: row.get::<_, i64>(5)? != 0,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

const PROJECT_COLUMNS: &str =
    "id, name, description, team_id, owner_id, sync_enabled, created_at, updated_at";

impl Store {
    /// Create a new project.
    pub fn create_project(
        &self,
        name: &str,
        description: Option<&str>,
        owner_id: &str,
    ) -> Result<Project> {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            team_id: None,
            owner_id: owner_id.to_string(),
            sync_enabled: false,
            created_at: now,
            updated_at: now,
        };

        self.conn()
            .execute(
                "INSERT INTO projects (id, name, description, owner_id, sync_enabled, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    project.id,
                    project.name,
                    project.description,
                    project.owner_id,
                    project.sync_enabled as i64,
                    project.created_at,
                    project.updated_at,
                ],
            )
            .map_err(StoreError::Sql)?;

        Ok(project)
    }

    /// Fetch a project by id.
    ///
    /// # Errors
    ///
    /// `StoreError::ProjectNotFound` when no such row exists.
    pub fn get_project(&self, id: &str) -> Result<Project> {
        self.conn()
            .query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
                params![id],
                project_from_row,
            )
            .optional()
            .map_err(StoreError::Sql)?
            .ok_or_else(|| StoreError::ProjectNotFound(id.to_string()).into())
    }

    /// Fetch a project by name, if present.
    pub fn find_project_by_name(&self, name: &str) -> Result<Option<Project>> {
        let found = self
            .conn()
            .query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE name = ?1"),
                params![name],
                project_from_row,
            )
            .optional()
            .map_err(StoreError::Sql)?;
        Ok(found)
    }

    /// All projects, most recently updated first.
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let mut stmt = self
            .conn()
            .prepare(&format!(
                "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY updated_at DESC"
            ))
            .map_err(StoreError::Sql)?;

        let rows = stmt
            .query_map([], project_from_row)
            .map_err(StoreError::Sql)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::Sql)?;
        Ok(rows)
    }

    /// Delete a project; cascades to everything it owns.
    pub fn delete_project(&self, id: &str) -> Result<()> {
        let affected = self
            .conn()
            .execute("DELETE FROM projects WHERE id = ?1", params![id])
            .map_err(StoreError::Sql)?;

        if affected == 0 {
            return Err(StoreError::ProjectNotFound(id.to_string()).into());
        }
        Ok(())
    }

    /// Flip the sync-enabled flag.
    pub fn set_sync_enabled(&self, id: &str, enabled: bool) -> Result<()> {
        let affected = self
            .conn()
            .execute(
                "UPDATE projects SET sync_enabled = ?1, updated_at = ?2 WHERE id = ?3",
                params![enabled as i64, Utc::now(), id],
            )
            .map_err(StoreError::Sql)?;

        if affected == 0 {
            return Err(StoreError::ProjectNotFound(id.to_string()).into());
        }
        Ok(())
    }
}

//! Projects commands - cross-project management on this machine.

use dialoguer::Confirm;

use crate::cli::context::open_vault;
use crate::cli::output;
use crate::error::{Result, StoreError};

/// List every project in the local database.
pub fn list() -> Result<()> {
    let vault = open_vault()?;
    let projects = vault.store().list_projects()?;

    if projects.is_empty() {
        output::dimmed("no projects");
        return Ok(());
    }

    output::section("Projects");
    for project in &projects {
        let sync = if project.sync_enabled { " [sync]" } else { "" };
        match &project.description {
            Some(desc) => output::list_item(&format!("{}{sync}  {desc}", project.name)),
            None => output::list_item(&format!("{}{sync}", project.name)),
        }
    }
    Ok(())
}

/// Delete a project by name, with confirmation.
pub fn delete(name: &str, force: bool) -> Result<()> {
    let vault = open_vault()?;
    let project = vault
        .store()
        .find_project_by_name(name)?
        .ok_or_else(|| StoreError::ProjectNotFound(name.to_string()))?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete project '{name}' and all its environments and secrets?"
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            output::dimmed("aborted");
            return Ok(());
        }
    }

    vault.delete_project(&project.id)?;
    output::success(&format!("deleted project '{name}'"));
    Ok(())
}

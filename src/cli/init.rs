//! Init command - create a project and its environments.

use tracing::info;

use crate::cli::context::open_vault;
use crate::cli::output;
use crate::core::config::ProjectConfig;
use crate::error::{ConfigError, Result};

/// Initialize a project in the current directory.
pub fn execute(name: Option<String>, description: Option<String>, environments: &str) -> Result<()> {
    if ProjectConfig::exists() {
        return Err(ConfigError::AlreadyInitialized.into());
    }

    let name = match name {
        Some(n) => n,
        None => directory_name()?,
    };
    let mut envs: Vec<&str> = environments
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if envs.is_empty() {
        envs = crate::core::constants::DEFAULT_ENVIRONMENTS.to_vec();
    }

    info!(project = %name, "initializing");

    let vault = open_vault()?;
    let project = vault.init_project(&name, description.as_deref(), &whoami::username(), &envs)?;

    ProjectConfig::new(&project.id, &project.name).save()?;

    output::success(&format!("initialized project '{}'", project.name));
    output::kv("id", &project.id);
    output::kv("environments", envs.join(", "));
    Ok(())
}

/// Current directory name, as the default project name.
fn directory_name() -> Result<String> {
    let cwd = std::env::current_dir()?;
    Ok(cwd
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string()))
}

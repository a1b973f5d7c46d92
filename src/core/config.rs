//! Configuration and project context.
//!
//! Two layers of configuration exist: the per-machine application
//! directory (`~/.cellar`, holding the SQLite database) and the per-project
//! marker file (`.cellar.toml`, committed alongside the code it belongs
//! to) that binds a working directory to a project id.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::constants::{APP_DIR, CONFIG_FILE, DB_FILE};
use crate::error::{ConfigError, Result};

/// Machine-level directory layout.
#[derive(Debug, Clone)]
pub struct Paths {
    /// `~/.cellar`
    pub config_dir: PathBuf,
    /// `~/.cellar/data`
    pub data_dir: PathBuf,
    /// `~/.cellar/data/vault.db`
    pub db_path: PathBuf,
}

impl Paths {
    /// Resolve the default layout under the user's home directory.
    ///
    /// `CELLAR_HOME` overrides the base directory.
    pub fn resolve() -> Result<Self> {
        let base = match std::env::var_os("CELLAR_HOME") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .ok_or(ConfigError::NoHomeDir)?
                .join(APP_DIR),
        };

        let data_dir = base.join("data");
        let db_path = data_dir.join(DB_FILE);
        Ok(Self {
            config_dir: base,
            data_dir,
            db_path,
        })
    }

    /// Create all directories with owner-only permissions.
    pub fn ensure(&self) -> Result<()> {
        for dir in [&self.config_dir, &self.data_dir] {
            std::fs::create_dir_all(dir)?;
            restrict_dir(dir)?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_dir(dir: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(dir, std::fs::Permissions::from_mode(
        crate::core::constants::SECURE_DIR_MODE,
    ))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

/// Project marker stored in `.cellar.toml`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub cellar: Meta,
    pub project: ProjectRef,
}

/// Metadata section of the marker file.
#[derive(Debug, Serialize, Deserialize)]
pub struct Meta {
    /// Version of cellar that wrote the file.
    pub version: String,
}

/// Reference to the project this directory belongs to.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    pub name: String,
}

impl ProjectConfig {
    /// Create a marker for a freshly initialized project.
    pub fn new(project_id: &str, project_name: &str) -> Self {
        Self {
            cellar: Meta {
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            project: ProjectRef {
                id: project_id.to_string(),
                name: project_name.to_string(),
            },
        }
    }

    /// Path to the marker file in the current directory.
    pub fn path() -> PathBuf {
        PathBuf::from(CONFIG_FILE)
    }

    /// Whether a marker exists in the current directory.
    pub fn exists() -> bool {
        Self::path().exists()
    }

    /// Load the marker from the current directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotInitialized` if the file is absent.
    pub fn load() -> Result<Self> {
        let path = Self::path();
        if !path.exists() {
            return Err(ConfigError::NotInitialized.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&contents).map_err(ConfigError::TomlParse)?;
        debug!(project = %config.project.name, "loaded project context");
        Ok(config)
    }

    /// Write the marker to the current directory.
    pub fn save(&self) -> Result<()> {
        let contents = toml::to_string_pretty(self).map_err(ConfigError::TomlSerialize)?;
        std::fs::write(Self::path(), contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_config_roundtrip() {
        let config = ProjectConfig::new("abc-123", "my-app");
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: ProjectConfig = toml::from_str(&text).unwrap();

        assert_eq!(parsed.project.id, "abc-123");
        assert_eq!(parsed.project.name, "my-app");
    }
}

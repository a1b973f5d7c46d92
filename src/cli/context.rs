//! Shared command context.
//!
//! Most commands need the same three things: the project marker from the
//! current directory, an open store, and a crypto service with the master
//! key loaded. `Context::open` bundles that one-time setup.

use crate::core::config::{Paths, ProjectConfig};
use crate::core::crypto::CryptoService;
use crate::core::store::Store;
use crate::core::vault::Vault;
use crate::error::Result;

/// Everything a command needs to act on the current project.
pub struct Context {
    pub config: ProjectConfig,
    pub vault: Vault,
}

impl Context {
    /// Load the project marker and open the vault.
    pub fn open() -> Result<Self> {
        let config = ProjectConfig::load()?;
        let vault = open_vault()?;
        Ok(Self { config, vault })
    }

    /// Project id from the marker.
    pub fn project_id(&self) -> &str {
        &self.config.project.id
    }

    /// Project name from the marker.
    pub fn project_name(&self) -> &str {
        &self.config.project.name
    }
}

/// Open the vault without requiring a project marker (init, projects).
pub fn open_vault() -> Result<Vault> {
    let paths = Paths::resolve()?;
    paths.ensure()?;

    let store = Store::open(&paths.db_path)?;
    let crypto = CryptoService::new()?;
    Ok(Vault::new(store, crypto))
}

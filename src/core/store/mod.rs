//! Embedded storage engine.
//!
//! A single-writer wrapper around one `rusqlite::Connection`. SQLite does
//! not arbitrate concurrent writers, so one `Store` per process holds the
//! only connection and callers serialize mutations through it.
//!
//! The engine never sees plaintext: every `encrypted_value` is an opaque
//! blob produced by the crypto service.

mod audit;
mod environments;
mod projects;
mod schema;
mod secrets;

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::error::Result;

/// Handle to the vault database.
pub struct Store {
    conn: Connection,
    path: PathBuf,
}

impl Store {
    /// Open (creating if necessary) the database at `path`.
    ///
    /// Parent directories are created owner-only, the schema is applied
    /// idempotently, and foreign-key cascades are enabled. A pre-existing
    /// file with loose permissions is tightened with a warning, never
    /// refused.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
            restrict_dir(parent)?;
        }

        let existed = path.exists();
        let conn = Connection::open(&path).map_err(crate::error::StoreError::Sql)?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(crate::error::StoreError::Sql)?;
        conn.execute_batch(schema::SCHEMA)
            .map_err(crate::error::StoreError::Sql)?;

        tighten_file_permissions(&path, existed)?;

        debug!(path = %path.display(), "opened vault store");
        Ok(Self { conn, path })
    }

    /// Open an in-memory database (tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(crate::error::StoreError::Sql)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(crate::error::StoreError::Sql)?;
        conn.execute_batch(schema::SCHEMA)
            .map_err(crate::error::StoreError::Sql)?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    /// Database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(unix)]
fn restrict_dir(dir: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(
        dir,
        std::fs::Permissions::from_mode(crate::core::constants::SECURE_DIR_MODE),
    )?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn tighten_file_permissions(path: &Path, existed: bool) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = crate::core::constants::SECURE_FILE_MODE;
    let meta = std::fs::metadata(path)?;
    let current = meta.permissions().mode() & 0o777;

    if current != mode {
        if existed && current & 0o077 != 0 {
            warn!(
                path = %path.display(),
                mode = format_args!("{current:o}"),
                "database file had insecure permissions (fixed automatically)"
            );
        }
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).map_err(|e| {
            crate::error::StoreError::PermissionDenied(format!("{}: {e}", path.display()))
        })?;
    }

    Ok(())
}

#[cfg(not(unix))]
fn tighten_file_permissions(_path: &Path, _existed: bool) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_schema() {
        let store = Store::open_in_memory().unwrap();
        let count: i64 = store
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(count >= 6);
    }

    #[test]
    fn test_open_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let db = tmp.path().join("data").join("vault.db");

        let first = Store::open(&db).unwrap();
        drop(first);
        let second = Store::open(&db).unwrap();
        assert_eq!(second.path(), db.as_path());
    }

    #[cfg(unix)]
    #[test]
    fn test_open_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let db = tmp.path().join("vault.db");
        let store = Store::open(&db).unwrap();
        drop(store);

        let mode = std::fs::metadata(&db).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_open_tightens_preexisting_loose_file() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let db = tmp.path().join("vault.db");

        drop(Store::open(&db).unwrap());
        std::fs::set_permissions(&db, std::fs::Permissions::from_mode(0o644)).unwrap();

        drop(Store::open(&db).unwrap());
        let mode = std::fs::metadata(&db).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}

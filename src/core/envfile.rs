//! .env file parsing and serialization.
//!
//! Supports comments, blank lines, and single- or double-quoted values.
//! Written files are restricted to owner-only access.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// A parsed .env file.
#[derive(Debug, Clone)]
pub struct EnvFile {
    entries: Vec<(String, String)>,
    path: PathBuf,
}

impl EnvFile {
    /// Parse an .env file from disk.
    ///
    /// Skips empty lines and comments (lines starting with `#`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut entries = Vec::new();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                entries.push((key.trim().to_string(), unquote(value.trim())));
            }
        }

        Ok(Self {
            entries,
            path: path.to_path_buf(),
        })
    }

    /// Build from key/value pairs.
    pub fn from_pairs(pairs: Vec<(String, String)>, path: PathBuf) -> Self {
        Self {
            entries: pairs,
            path,
        }
    }

    /// Write all entries in `KEY=value` form, owner-only.
    pub fn save(&self) -> Result<()> {
        let content = self.to_env_string();

        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .mode(crate::core::constants::SECURE_FILE_MODE)
                .open(&self.path)?;
            file.write_all(content.as_bytes())?;
            file.flush()?;

            // Tighten even when overwriting an existing file.
            std::fs::set_permissions(
                &self.path,
                std::fs::Permissions::from_mode(crate::core::constants::SECURE_FILE_MODE),
            )?;
        }

        #[cfg(not(unix))]
        {
            std::fs::write(&self.path, content)?;
        }

        Ok(())
    }

    /// All entries as key/value pairs.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to .env format, quoting values with spaces or `#`/`=`.
    pub fn to_env_string(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            if value.contains(' ') || value.contains('#') || value.contains('=') {
                out.push_str(&format!("{key}=\"{value}\"\n"));
            } else {
                out.push_str(&format!("{key}={value}\n"));
            }
        }
        out
    }
}

/// Strip one layer of matching single or double quotes.
fn unquote(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return value[1..value.len() - 1].to_string();
        }
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_skips_comments_and_blanks() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(".env");
        std::fs::write(&path, "# comment\n\nFOO=bar\nBAZ=\"quoted value\"\n").unwrap();

        let env = EnvFile::load(&path).unwrap();
        assert_eq!(env.len(), 2);
        assert_eq!(env.entries()[0], ("FOO".to_string(), "bar".to_string()));
        assert_eq!(
            env.entries()[1],
            ("BAZ".to_string(), "quoted value".to_string())
        );
    }

    #[test]
    fn test_save_quotes_special_values() {
        let env = EnvFile::from_pairs(
            vec![
                ("A".to_string(), "plain".to_string()),
                ("B".to_string(), "has space".to_string()),
            ],
            PathBuf::from(".env"),
        );
        let text = env.to_env_string();
        assert!(text.contains("A=plain\n"));
        assert!(text.contains("B=\"has space\"\n"));
    }

    #[test]
    fn test_unquote_single_quotes() {
        assert_eq!(unquote("'hello'"), "hello");
        assert_eq!(unquote("plain"), "plain");
        assert_eq!(unquote("\"x\""), "x");
    }
}

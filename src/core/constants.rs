//! Constants used throughout cellar.
//!
//! Centralizes magic strings and cryptographic parameters.

/// Project marker file name (.cellar.toml).
pub const CONFIG_FILE: &str = ".cellar.toml";

/// Application directory relative to HOME (~/.cellar).
pub const APP_DIR: &str = ".cellar";

/// Database file name inside the data directory.
pub const DB_FILE: &str = "vault.db";

/// OS keyring service name for the master key.
pub const KEYRING_SERVICE: &str = "cellar";

/// OS keyring account name for the master key.
pub const KEYRING_ACCOUNT: &str = "master-key";

/// Master key size in bytes (256 bits).
pub const KEY_SIZE: usize = 32;

/// AES-GCM nonce size in bytes (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Salt size for password-based key derivation.
pub const SALT_SIZE: usize = 32;

/// PBKDF2 iteration count for password-based key derivation.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Environments created by `cellar init` when none are specified.
pub const DEFAULT_ENVIRONMENTS: &[&str] = &["development", "staging", "production"];

/// Backup document format version.
pub const BACKUP_VERSION: &str = "1.0";

/// Owner-only file mode for sensitive files.
#[cfg(unix)]
pub const SECURE_FILE_MODE: u32 = 0o600;

/// Owner-only mode for sensitive directories.
#[cfg(unix)]
pub const SECURE_DIR_MODE: u32 = 0o700;

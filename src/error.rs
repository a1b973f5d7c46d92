//! Error types.
//!
//! Errors are layered: each core area has its own enum, and the top-level
//! [`Error`] wraps them with `#[from]` conversions so `?` works across
//! module boundaries.

use thiserror::Error;

/// Top-level error type for all cellar operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// Configuration and project-context errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("not initialized: no .cellar.toml in this directory")]
    NotInitialized,

    #[error("already initialized: .cellar.toml exists")]
    AlreadyInitialized,

    #[error("could not determine home directory")]
    NoHomeDir,

    #[error("backup belongs to project '{backup}', not '{current}'")]
    ProjectMismatch { backup: String, current: String },

    #[error("toml parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("toml serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Cryptographic and key-custody errors.
///
/// Decryption failures are deliberately undifferentiated: wrong master key,
/// tampered ciphertext, and truncation all surface the same message so the
/// error is not an oracle for which check failed.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("plaintext cannot be empty")]
    EmptyPlaintext,

    #[error("encryption failed")]
    EncryptionFailed,

    #[error("decryption failed")]
    DecryptionFailed,

    #[error("crypto service is closed")]
    ServiceClosed,

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("invalid master key material: {0}")]
    InvalidKey(String),
}

/// Storage-engine errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("environment not found: {0}")]
    EnvironmentNotFound(String),

    #[error("secret not found: {0}")]
    SecretNotFound(String),

    #[error("environment already exists: {0}")]
    EnvironmentExists(String),

    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("could not correct insecure permissions on {0}")]
    PermissionDenied(String),

    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),
}

/// Sync-protocol errors.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("checksum mismatch: data may be corrupted")]
    ChecksumMismatch,

    #[error("sync payload is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("sync payload is not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("remote error: {0}")]
    Remote(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

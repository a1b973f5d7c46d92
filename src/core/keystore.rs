//! OS keyring custody of the master key.
//!
//! The 32-byte master key is stored base64-encoded in the platform
//! credential store (Secret Service on Linux, Keychain on macOS, Credential
//! Manager on Windows) under a fixed service/account pair. Cellar never
//! writes the key to disk itself.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use tracing::{debug, info};

use crate::core::constants::{KEYRING_ACCOUNT, KEYRING_SERVICE, KEY_SIZE};
use crate::error::{CryptoError, Result};

fn entry() -> std::result::Result<keyring::Entry, CryptoError> {
    keyring::Entry::new(KEYRING_SERVICE, KEYRING_ACCOUNT)
        .map_err(|e| CryptoError::Keyring(format!("failed to create keyring entry: {e}")))
}

/// Load the master key from the keyring, or generate and persist a new one.
///
/// # Errors
///
/// Returns `CryptoError::Keyring` if the credential store cannot be
/// reached, or `CryptoError::InvalidKey` if stored material is malformed.
pub fn load_or_generate() -> Result<Vec<u8>> {
    let entry = entry()?;

    match entry.get_password() {
        Ok(encoded) => {
            let key = BASE64
                .decode(encoded.trim())
                .map_err(|e| CryptoError::InvalidKey(format!("base64 decode failed: {e}")))?;
            if key.len() != KEY_SIZE {
                return Err(CryptoError::InvalidKey(format!(
                    "expected {} bytes, found {}",
                    KEY_SIZE,
                    key.len()
                ))
                .into());
            }
            debug!("loaded master key from OS keyring");
            Ok(key)
        }
        Err(keyring::Error::NoEntry) => {
            let mut key = vec![0u8; KEY_SIZE];
            rand::rngs::OsRng.fill_bytes(&mut key);

            entry
                .set_password(&BASE64.encode(&key))
                .map_err(|e| CryptoError::Keyring(format!("failed to store master key: {e}")))?;

            info!("generated new master key and stored it in the OS keyring");
            Ok(key)
        }
        Err(e) => Err(CryptoError::Keyring(format!("failed to read master key: {e}")).into()),
    }
}

/// Whether a master key already exists in the keyring.
pub fn exists() -> Result<bool> {
    let entry = entry()?;
    match entry.get_password() {
        Ok(_) => Ok(true),
        Err(keyring::Error::NoEntry) => Ok(false),
        Err(e) => Err(CryptoError::Keyring(format!("failed to read master key: {e}")).into()),
    }
}

/// Irreversibly remove the master key from the keyring.
///
/// All data encrypted under it becomes unrecoverable. Confirmation is the
/// caller's responsibility; deleting a key that does not exist is not an
/// error.
pub fn delete() -> Result<()> {
    let entry = entry()?;
    match entry.delete_credential() {
        Ok(()) => {
            info!("deleted master key from OS keyring");
            Ok(())
        }
        Err(keyring::Error::NoEntry) => {
            debug!("master key not present in keyring; nothing to delete");
            Ok(())
        }
        Err(e) => Err(CryptoError::Keyring(format!("failed to delete master key: {e}")).into()),
    }
}

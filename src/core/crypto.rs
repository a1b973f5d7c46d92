//! Authenticated encryption around the master key.
//!
//! [`CryptoService`] is the sole holder of the master key and the only
//! component permitted to see plaintext secret values. Every secret value
//! and every sync/backup blob passes through it.
//!
//! Wire format: `nonce (12 bytes) || ciphertext+tag` from AES-256-GCM with
//! a fresh random nonce per call.

use std::sync::Mutex;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use crate::core::constants::{KEY_SIZE, NONCE_SIZE, PBKDF2_ITERATIONS, SALT_SIZE};
use crate::core::keystore;
use crate::core::secure::SecureBytes;
use crate::error::{CryptoError, Result};

/// Authenticated encryption service bound to the machine's master key.
///
/// The key lives in a [`SecureBytes`] buffer behind a mutex: a concurrent
/// [`close`](Self::close) can never wipe the key out from under an
/// in-flight encrypt or decrypt call. After `close()` every operation
/// fails with [`CryptoError::ServiceClosed`].
pub struct CryptoService {
    master_key: Mutex<Option<SecureBytes>>,
}

impl CryptoService {
    /// Construct the service from the OS keyring, generating and
    /// persisting a fresh 256-bit key if none exists yet.
    ///
    /// # Errors
    ///
    /// Keyring failures are fatal to construction and are not retried.
    pub fn new() -> Result<Self> {
        let mut raw = keystore::load_or_generate()?;
        let service = Self::from_raw(&raw);
        raw.zeroize();
        Ok(service)
    }

    /// Construct the service from caller-provided key material.
    ///
    /// Used by tests and by alternative custody schemes built on
    /// [`derive_key`]. The caller's copy should be discarded afterwards.
    pub fn with_key(key: &[u8; KEY_SIZE]) -> Self {
        Self::from_raw(key)
    }

    fn from_raw(raw: &[u8]) -> Self {
        let mut key = SecureBytes::from_bytes(raw);
        if let Err(e) = key.lock() {
            // Best effort: some systems cap RLIMIT_MEMLOCK.
            debug!("could not lock master key pages: {e}");
        }
        Self {
            master_key: Mutex::new(Some(key)),
        }
    }

    /// Encrypt plaintext, returning `nonce || ciphertext+tag`.
    ///
    /// Empty plaintext is rejected. Each call draws an independent random
    /// 96-bit nonce; nonce reuse under one key would silently break GCM.
    ///
    /// # Errors
    ///
    /// Returns `EmptyPlaintext`, `ServiceClosed`, or `EncryptionFailed`.
    pub fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>> {
        if plaintext.is_empty() {
            return Err(CryptoError::EmptyPlaintext.into());
        }

        let guard = self.master_key.lock().unwrap_or_else(|e| e.into_inner());
        let key = guard.as_ref().ok_or(CryptoError::ServiceClosed)?;
        let cipher = Aes256Gcm::new_from_slice(key.bytes())
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Decrypt `nonce || ciphertext+tag` produced by [`encrypt`](Self::encrypt).
    ///
    /// # Errors
    ///
    /// Any tamper, truncation, or wrong-key condition returns the single
    /// undifferentiated `DecryptionFailed`; partial output is never
    /// produced.
    pub fn decrypt(&self, data: &[u8]) -> Result<Zeroizing<String>> {
        if data.len() < NONCE_SIZE {
            return Err(CryptoError::DecryptionFailed.into());
        }

        let guard = self.master_key.lock().unwrap_or_else(|e| e.into_inner());
        let key = guard.as_ref().ok_or(CryptoError::ServiceClosed)?;
        let cipher = Aes256Gcm::new_from_slice(key.bytes())
            .map_err(|_| CryptoError::DecryptionFailed)?;

        let (nonce_bytes, body) = data.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = Zeroizing::new(
            cipher
                .decrypt(nonce, body)
                .map_err(|_| CryptoError::DecryptionFailed)?,
        );

        String::from_utf8(plaintext.to_vec())
            .map(Zeroizing::new)
            .map_err(|_| CryptoError::DecryptionFailed.into())
    }

    /// SHA-256 hex digest, used for integrity checksums only.
    pub fn hash(&self, input: &str) -> String {
        let digest = Sha256::digest(input.as_bytes());
        hex::encode(digest)
    }

    /// Wipe the master key and transition to the closed state.
    ///
    /// Idempotent; any crypto call afterwards fails with `ServiceClosed`.
    pub fn close(&self) {
        let mut guard = self.master_key.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(mut key) = guard.take() {
            key.wipe();
        }
    }

    /// Whether the service has been closed.
    pub fn is_closed(&self) -> bool {
        self.master_key
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }
}

impl Drop for CryptoService {
    fn drop(&mut self) {
        self.close();
    }
}

/// Derive a 256-bit key from a password with PBKDF2-HMAC-SHA256.
///
/// Fixed high iteration count; exposed for alternative key-custody schemes
/// and not used by the default keyring-backed path.
pub fn derive_key(password: &[u8], salt: &[u8]) -> [u8; KEY_SIZE] {
    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(password, salt, PBKDF2_ITERATIONS, &mut key);
    key
}

/// Generate a random salt for key derivation.
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Irreversibly remove the master key from the OS keyring.
///
/// Destroys access to all previously encrypted data. Callers must obtain
/// explicit confirmation before invoking this.
pub fn delete_master_key() -> Result<()> {
    keystore::delete()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CryptoService {
        CryptoService::with_key(&[7u8; KEY_SIZE])
    }

    #[test]
    fn test_encrypt_rejects_empty_plaintext() {
        let svc = service();
        assert!(svc.encrypt("").is_err());
    }

    #[test]
    fn test_roundtrip() {
        let svc = service();
        let ct = svc.encrypt("hello world").unwrap();
        assert_eq!(svc.decrypt(&ct).unwrap().as_str(), "hello world");
    }

    #[test]
    fn test_nonces_are_unique() {
        let svc = service();
        let a = svc.encrypt("same input").unwrap();
        let b = svc.encrypt("same input").unwrap();
        assert_ne!(a, b);
        assert_ne!(&a[..NONCE_SIZE], &b[..NONCE_SIZE]);
    }

    #[test]
    fn test_decrypt_rejects_tampered_ciphertext() {
        let svc = service();
        let mut ct = svc.encrypt("payload").unwrap();
        let last = ct.len() - 1;
        ct[last] ^= 0x01;
        assert!(matches!(
            svc.decrypt(&ct),
            Err(crate::error::Error::Crypto(CryptoError::DecryptionFailed))
        ));
    }

    #[test]
    fn test_decrypt_too_short() {
        let svc = service();
        assert!(svc.decrypt(&[0u8; NONCE_SIZE - 1]).is_err());
    }

    #[test]
    fn test_closed_service_refuses_calls() {
        let svc = service();
        svc.close();
        assert!(svc.is_closed());
        assert!(matches!(
            svc.encrypt("x"),
            Err(crate::error::Error::Crypto(CryptoError::ServiceClosed))
        ));
    }

    #[test]
    fn test_close_is_idempotent() {
        let svc = service();
        svc.close();
        svc.close();
        assert!(svc.is_closed());
    }

    #[test]
    fn test_derive_key_is_deterministic() {
        let salt = [1u8; SALT_SIZE];
        let a = derive_key(b"password", &salt);
        let b = derive_key(b"password", &salt);
        assert_eq!(a, b);
        assert_ne!(a, derive_key(b"other", &salt));
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let svc = service();
        let digest = svc.hash("abc");
        assert_eq!(digest.len(), 64);
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}

//! Secret type.
//!
//! The storage engine only ever sees the ciphertext; decryption happens in
//! the crypto service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An encrypted key/value pair. Exactly one live row exists per
/// `(environment_id, key)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Secret {
    pub id: String,
    pub environment_id: String,
    pub key: String,
    #[serde(skip)]
    pub encrypted_value: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of an upsert: the resulting row plus whether it was a fresh
/// insert. Callers use `created` to decide whether a history row is due.
#[derive(Debug, Clone)]
pub struct SecretWrite {
    pub secret: Secret,
    pub created: bool,
}

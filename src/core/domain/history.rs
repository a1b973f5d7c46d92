//! Secret history type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of a secret's previous value, written at the moment
/// of an overwrite. Versions count up from 1 per secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretHistory {
    pub id: String,
    pub secret_id: String,
    pub environment_id: String,
    pub key: String,
    #[serde(skip)]
    pub encrypted_value: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

//! Environment type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named environment (development, staging, production, ...) within a
/// project. Names are unique per project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

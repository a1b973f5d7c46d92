//! Sync domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last observed sync state for a project, one row per project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncState {
    pub project_id: String,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub version: i64,
    pub checksum: Option<String>,
}

/// Which directions a sync invocation should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    /// Pull then push (the default).
    Both,
    PushOnly,
    PullOnly,
}

impl SyncDirection {
    pub fn pulls(&self) -> bool {
        matches!(self, Self::Both | Self::PullOnly)
    }

    pub fn pushes(&self) -> bool {
        matches!(self, Self::Both | Self::PushOnly)
    }
}

/// Result of a push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    /// New remote blob version, or `None` when there was nothing to push.
    pub version: Option<i64>,
    pub secrets: usize,
    pub environments: usize,
}

/// Result of a pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullOutcome {
    /// Remote blob version applied, or `None` when already up to date.
    pub version: Option<i64>,
    pub secrets_imported: usize,
    pub environments_created: usize,
}
